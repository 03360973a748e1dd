//! Shared plumbing for the capture-driven subcommands.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use campana_analysis::Pattern;
use campana_engine::{Analyzer, AnalyzerConfig, AnalyzerEvent};
use campana_io::{CaptureConfig, MicCapture};
use clap::Args;

/// Arguments shared by `record` and `monitor`.
#[derive(Args)]
pub struct SessionArgs {
    /// Pattern file path
    #[arg(short, long, default_value = "campana-pattern.json")]
    pub pattern: PathBuf,

    /// Analyzer configuration file (TOML); defaults apply when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input device name (substring match, case-insensitive)
    #[arg(long)]
    pub device: Option<String>,
}

impl SessionArgs {
    /// Load the analyzer configuration, or defaults when no file is
    /// given.
    pub fn load_config(&self) -> anyhow::Result<AnalyzerConfig> {
        match &self.config {
            Some(path) => Ok(AnalyzerConfig::load(path)?),
            None => Ok(AnalyzerConfig::default()),
        }
    }
}

/// Run the capture loop until Ctrl+C or until `on_event` returns false.
///
/// The analyzer must already be in its target mode (monitoring or
/// recording); it moves onto the capture thread, and its events are
/// bridged back over an mpsc channel.
pub fn run_pipeline<F>(
    mut analyzer: Analyzer,
    device: Option<String>,
    window_size: usize,
    mut on_event: F,
) -> anyhow::Result<()>
where
    F: FnMut(&AnalyzerEvent) -> bool,
{
    let (tx, rx) = mpsc::channel();
    analyzer.set_observer(Box::new(move |event| {
        let _ = tx.send(event);
    }));

    let capture_config = CaptureConfig {
        device,
        window_size,
    };
    let mut capture = MicCapture::new(&capture_config)?;
    capture.start(move |window, sample_rate| {
        analyzer.process_window(&mut window.left, sample_rate);
    })?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if !on_event(&event) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    capture.stop();
    Ok(())
}

/// Print a pattern slice by slice, one `time -- freq (mag), ...` line
/// each.
pub fn print_pattern(pattern: &Pattern) {
    if pattern.is_empty() {
        println!("(no recorded pattern)");
        return;
    }

    for set in pattern.sets() {
        let peaks: Vec<String> = set
            .peaks()
            .iter()
            .map(|p| format!("{:.1} Hz ({:.1})", p.frequency_hz, p.magnitude))
            .collect();
        println!("  {:8.4} s -- {}", set.time(), peaks.join(", "));
    }

    match pattern.duration() {
        Some(duration) => println!("Duration: {:.2} s over {} slices", duration, pattern.len()),
        None => println!("Duration: undefined ({} slice(s))", pattern.len()),
    }
}
