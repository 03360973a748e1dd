//! Reference-pattern recording command.

use campana_engine::{
    Analyzer, AnalyzerEvent, AnalyzerState, JsonFileStore, LogNotifier, PatternStore,
};
use clap::Args;

use super::common::{SessionArgs, print_pattern, run_pipeline};

#[derive(Args)]
pub struct RecordArgs {
    #[command(flatten)]
    session: SessionArgs,
}

pub fn run(args: RecordArgs) -> anyhow::Result<()> {
    let config = args.session.load_config()?;
    let store = JsonFileStore::new(&args.session.pattern);

    let mut analyzer = Analyzer::new(config, store.clone(), Box::new(LogNotifier));
    analyzer.start_recording();

    println!("Recording a new reference pattern.");
    println!("Play the sound to detect; recording finalizes after {:.1} s of silence.", config.silence_timeout);
    println!("Press Ctrl+C to abort.\n");

    run_pipeline(
        analyzer,
        args.session.device.clone(),
        config.window_size,
        |event| {
            // NoReference -> NotMatch marks the silence-finalized recording
            !matches!(event, AnalyzerEvent::StateChanged(AnalyzerState::NotMatch))
        },
    )?;

    let recorded = store.load()?;
    if recorded.is_empty() {
        println!("Nothing recorded.");
    } else {
        println!("Recorded pattern ({}):", args.session.pattern.display());
        print_pattern(&recorded);
    }

    Ok(())
}
