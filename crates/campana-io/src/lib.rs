//! Audio capture layer for campana.
//!
//! This crate provides:
//!
//! - **Window buffering**: [`SampleWindow`] and [`WindowAccumulator`],
//!   double-buffered fixed-size windows filled from interleaved device
//!   frames
//! - **Microphone capture**: [`MicCapture`], a cpal input stream that
//!   hands one completed window at a time to a consumer callback
//!
//! Device permissions, sample-rate negotiation, and interruption recovery
//! are the platform's concern; on resume the consumer simply calls
//! [`MicCapture::start`] again.

mod capture;
mod window;

pub use capture::{AudioDevice, CaptureConfig, MicCapture, list_input_devices};
pub use window::{DEFAULT_WINDOW_SIZE, SampleWindow, WindowAccumulator};

/// Error types for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio input device available on the system.
    #[error("No audio input device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
}

/// Convenience result type for capture operations.
pub type Result<T> = std::result::Result<T, Error>;
