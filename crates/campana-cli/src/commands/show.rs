//! Stored-pattern inspection command.

use std::path::PathBuf;

use campana_engine::{JsonFileStore, PatternStore};
use clap::Args;

use super::common::print_pattern;

#[derive(Args)]
pub struct ShowArgs {
    /// Pattern file path
    #[arg(short, long, default_value = "campana-pattern.json")]
    pattern: PathBuf,
}

pub fn run(args: ShowArgs) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&args.pattern);
    let pattern = store.load()?;

    println!("Reference pattern ({}):", args.pattern.display());
    print_pattern(&pattern);

    if !pattern.is_empty() {
        let aggregate = pattern.aggregate();
        let largest = aggregate.largest_excluding(&[]);
        let second = aggregate.largest_excluding(&[largest.frequency_hz]);

        println!(
            "Match frequencies: {:.0} Hz and {:.0} Hz",
            largest.frequency_hz, second.frequency_hz
        );
    }

    Ok(())
}
