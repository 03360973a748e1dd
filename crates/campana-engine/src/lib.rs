//! Analysis orchestration for campana.
//!
//! This crate wires the signal-level pieces of `campana-analysis` into
//! the detection state machine:
//!
//! - **Analyzer**: [`Analyzer`] runs the per-window pipeline, accumulates
//!   candidate patterns, and drives the two-stage match against the
//!   stored reference
//! - **Stores**: [`PatternStore`] / [`DisplayParamsStore`] persistence
//!   contracts with a JSON file implementation and an in-memory one
//! - **Notification**: the [`NotificationSink`] boundary invoked once per
//!   match transition
//! - **Configuration**: [`AnalyzerConfig`] with TOML round-trip
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campana_engine::{Analyzer, AnalyzerConfig, JsonFileStore, LogNotifier};
//!
//! let store = JsonFileStore::new("pattern.json");
//! let mut analyzer = Analyzer::new(AnalyzerConfig::default(), store, Box::new(LogNotifier));
//! analyzer.start_monitoring();
//!
//! // per capture window, on the capture thread:
//! let mut window = vec![0.0f32; 8192];
//! analyzer.process_window(&mut window, 48000.0);
//! ```

mod analyzer;
mod config;
mod notify;
mod store;

pub use analyzer::{Analyzer, AnalyzerEvent, AnalyzerState, Observer};
pub use config::{AnalyzerConfig, ConfigError};
pub use notify::{LogNotifier, NotificationSink};
pub use store::{DisplayParamsStore, JsonFileStore, MemoryStore, PatternStore, StoreError};
