//! Live monitoring command.

use campana_engine::{
    Analyzer, AnalyzerEvent, AnalyzerState, JsonFileStore, NotificationSink, PatternStore,
};
use clap::Args;

use super::common::{SessionArgs, run_pipeline};

#[derive(Args)]
pub struct MonitorArgs {
    #[command(flatten)]
    session: SessionArgs,
}

pub fn run(args: MonitorArgs) -> anyhow::Result<()> {
    let config = args.session.load_config()?;
    let store = JsonFileStore::new(&args.session.pattern);

    let reference = store.load()?;
    if reference.is_empty() {
        anyhow::bail!(
            "no reference pattern at '{}'; run `campana record` first",
            args.session.pattern.display()
        );
    }

    let notifier = Box::new(|message: &str| {
        println!("\x07>>> {message}");
    }) as Box<dyn NotificationSink + Send>;

    let mut analyzer = Analyzer::new(config, store, notifier);
    analyzer.start_monitoring();

    println!(
        "Monitoring for the pattern in '{}' ({} slices).",
        args.session.pattern.display(),
        reference.len()
    );
    println!("Press Ctrl+C to stop.\n");

    run_pipeline(
        analyzer,
        args.session.device.clone(),
        config.window_size,
        |event| {
            if let AnalyzerEvent::StateChanged(state) = event {
                match state {
                    AnalyzerState::Match => println!("state: MATCH"),
                    AnalyzerState::NotMatch => println!("state: listening"),
                    AnalyzerState::NoReference => println!("state: no reference"),
                    AnalyzerState::Idle => {}
                }
            }
            true
        },
    )
}
