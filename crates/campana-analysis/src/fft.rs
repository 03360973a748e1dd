//! FFT wrapper with windowing functions

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hamming window
    Hamming,
    /// Hann window (raised cosine)
    Hann,
}

impl Window {
    /// Apply window to a buffer.
    ///
    /// Must be applied to raw (unwindowed) samples; applying twice is not
    /// a supported use.
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hamming => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.54 - 0.46 * (2.0 * PI * i as f32 / n as f32).cos();
                    *sample *= w;
                }
            }
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }
}

/// Forward FFT processor with a cached plan.
///
/// Planning a transform is expensive; one `Fft` is created per window size
/// and reused for every capture window, keeping the per-window hot path
/// allocation-light.
pub struct Fft {
    planner: FftPlanner<f32>,
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
    scratch: Vec<Complex<f32>>,
}

impl Fft {
    /// Create a new FFT processor for the given size.
    ///
    /// Sizes that are not a power of two are rounded up to the next one.
    pub fn new(size: usize) -> Self {
        let size = size.next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Self {
            planner,
            fft,
            size,
            scratch: Vec::new(),
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Resize the FFT (creates new plan if needed)
    pub fn resize(&mut self, size: usize) {
        let size = size.next_power_of_two();
        if size != self.size {
            self.fft = self.planner.plan_fft_forward(size);
            self.size = size;
        }
    }

    /// Perform forward FFT on real input.
    ///
    /// Returns the complex spectrum, truncated to the `size/2 + 1` bins
    /// from DC to Nyquist. Input shorter than the FFT size is zero-padded;
    /// longer input is truncated. No normalization is applied, so
    /// magnitudes are raw transform output.
    pub fn forward(&mut self, input: &[f32]) -> &[Complex<f32>] {
        self.scratch.clear();
        self.scratch
            .extend(input.iter().take(self.size).map(|&x| Complex::new(x, 0.0)));
        self.scratch.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut self.scratch);

        &self.scratch[..self.size / 2 + 1]
    }
}
