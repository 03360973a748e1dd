//! Spectral analysis and the sound-pattern model for campana.
//!
//! This crate provides the signal-level building blocks of the detection
//! pipeline:
//!
//! - **Windowing and FFT**: [`Window`] and [`Fft`], a rustfft wrapper with
//!   a cached plan reused across capture windows
//! - **Spectrum frames**: [`Spectrum`], a reusable magnitude/frequency
//!   frame with display clipping via [`DisplayParams`]
//! - **Peak model**: [`Peak`] and the bounded [`PeakSet`] holding the
//!   strongest bins of one time slice
//! - **Patterns**: [`Pattern`], the time-ordered peak-set sequence, and
//!   [`AggregatePeaks`], its per-frequency magnitude union used for
//!   matching
//!
//! ## Quick Start
//!
//! ```rust
//! use campana_analysis::{Fft, Spectrum, Window, extract_peaks};
//!
//! let mut samples: Vec<f32> = (0..8192)
//!     .map(|i| (2.0 * std::f32::consts::PI * 110.0 * i as f32 / 8192.0).sin())
//!     .collect();
//!
//! Window::Hamming.apply(&mut samples);
//!
//! let mut fft = Fft::new(samples.len());
//! let mut spectrum = Spectrum::new();
//! spectrum.update(fft.forward(&samples), 8192.0);
//!
//! let peaks = extract_peaks(&spectrum, 0.0, 30.0, 3);
//! assert!(peaks.magnitude_at(110.0).is_some());
//! ```

mod fft;
mod pattern;
mod peaks;
mod spectrum;

pub use fft::{Fft, Window};
pub use pattern::{AggregatePeaks, Pattern};
pub use peaks::{Peak, PeakSet};
pub use spectrum::{DisplayParams, SpectralBin, Spectrum, extract_peaks};
