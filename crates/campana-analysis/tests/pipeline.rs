//! Integration tests for the window → FFT → peak-extraction path.
//!
//! Uses synthetic tones with bin-aligned frequencies so expected peak
//! locations are exact.

use std::f32::consts::PI;

use campana_analysis::{Fft, Pattern, PeakSet, Spectrum, Window, extract_peaks};

/// Sample rate equal to the window length gives exactly 1 Hz per bin.
const SAMPLE_RATE: f32 = 8192.0;
const WINDOW_SIZE: usize = 8192;

fn tone(freqs: &[f32], amplitude: f32) -> Vec<f32> {
    (0..WINDOW_SIZE)
        .map(|i| {
            freqs
                .iter()
                .map(|f| amplitude * (2.0 * PI * f * i as f32 / SAMPLE_RATE).sin())
                .sum()
        })
        .collect()
}

fn analyze(samples: &mut [f32], time: f64) -> PeakSet {
    Window::Hamming.apply(samples);
    let mut fft = Fft::new(WINDOW_SIZE);
    let mut spectrum = Spectrum::new();
    spectrum.update(fft.forward(samples), SAMPLE_RATE);
    extract_peaks(&spectrum, time, 30.0, 3)
}

#[test]
fn two_tone_window_yields_both_frequencies() {
    let mut samples = tone(&[110.0, 220.0], 1.0);
    let peaks = analyze(&mut samples, 0.0);

    // A Hamming-windowed bin-aligned tone lands 0.54*N/2 of its amplitude
    // on its own bin, far above the 30.0 threshold.
    assert!(peaks.magnitude_at(110.0).unwrap() > 1000.0);
    assert!(peaks.magnitude_at(220.0).unwrap() > 1000.0);
}

#[test]
fn silent_window_yields_no_peaks() {
    let mut samples = vec![0.0f32; WINDOW_SIZE];
    let peaks = analyze(&mut samples, 0.0);
    assert!(peaks.is_empty());
}

#[test]
fn quiet_tone_stays_below_threshold() {
    // Peak magnitude ~0.54 * 4096 * 1e-3 ≈ 2.2, under the 30.0 threshold
    let mut samples = tone(&[440.0], 1e-3);
    let peaks = analyze(&mut samples, 0.0);
    assert!(peaks.is_empty());
}

#[test]
fn pattern_round_trips_through_json() {
    let mut pattern = Pattern::new();
    for (i, freq) in [110.0f32, 220.0, 110.0].iter().enumerate() {
        let mut samples = tone(&[*freq], 1.0);
        pattern.push(analyze(&mut samples, i as f64 * 0.2));
    }

    let encoded = serde_json::to_string(&pattern).unwrap();
    let decoded: Pattern = serde_json::from_str(&encoded).unwrap();

    assert_eq!(pattern, decoded);
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.duration(), Some(0.4));
}
