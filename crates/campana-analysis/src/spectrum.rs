//! Magnitude spectrum frame and display clipping.

use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::peaks::PeakSet;

/// One discrete frequency slot of a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectralBin {
    /// Bin center frequency, rounded to the nearest Hz.
    pub frequency_hz: f32,
    /// Unnormalized magnitude (Euclidean norm of the complex bin).
    pub magnitude: f32,
}

/// Clipping parameters for presenting a spectrum.
///
/// Display-only: matching always runs on the full, unclipped spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayParams {
    /// Magnitudes above this value are clamped to it.
    pub max_magnitude: f32,
    /// Bins above this frequency are dropped.
    pub max_frequency_hz: f32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            max_magnitude: 200.0,
            max_frequency_hz: 2000.0,
        }
    }
}

/// Reusable magnitude-spectrum frame.
///
/// Holds one bin per positive frequency of the most recent transform.
/// The backing storage is reused across windows so the per-window update
/// does not allocate once the frame has reached its working size.
#[derive(Debug, Default)]
pub struct Spectrum {
    bins: Vec<SpectralBin>,
    sample_rate: f32,
}

impl Spectrum {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the frame from a positive-frequency complex spectrum.
    ///
    /// `spectrum` is the `fft_size/2 + 1` bins from DC to Nyquist; the
    /// full transform length is recovered from that to derive bin width.
    pub fn update(&mut self, spectrum: &[Complex<f32>], sample_rate: f32) {
        let fft_size = (spectrum.len().saturating_sub(1)) * 2;
        if fft_size == 0 {
            self.bins.clear();
            return;
        }

        let bin_width = sample_rate / fft_size as f32;
        self.sample_rate = sample_rate;
        self.bins.resize(spectrum.len(), SpectralBin::default());

        for (i, c) in spectrum.iter().enumerate() {
            self.bins[i] = SpectralBin {
                frequency_hz: (i as f32 * bin_width).round(),
                magnitude: c.norm(),
            };
        }
    }

    /// Bins from DC to Nyquist, ascending frequency.
    pub fn bins(&self) -> &[SpectralBin] {
        &self.bins
    }

    /// Sample rate of the signal the frame was computed from.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Copy of the frame clipped for display.
    ///
    /// Stops at the first bin past `max_frequency_hz` and clamps
    /// magnitudes to `max_magnitude`.
    pub fn clipped(&self, params: DisplayParams) -> Vec<SpectralBin> {
        let mut out = Vec::new();
        for bin in &self.bins {
            if bin.frequency_hz > params.max_frequency_hz {
                break;
            }
            out.push(SpectralBin {
                frequency_hz: bin.frequency_hz,
                magnitude: bin.magnitude.min(params.max_magnitude),
            });
        }
        out
    }
}

/// Extract the strongest peaks of a spectrum frame into a bounded set.
///
/// Offers every bin in increasing frequency order, so the bounded-replace
/// rule of [`PeakSet`] decides what survives. `time` is the slice offset
/// in seconds from the start of the detection episode.
pub fn extract_peaks(spectrum: &Spectrum, time: f64, threshold: f32, capacity: usize) -> PeakSet {
    let mut set = PeakSet::new(time, threshold, capacity);
    for bin in spectrum.bins() {
        set.offer(bin.frequency_hz, bin.magnitude);
    }
    set
}
