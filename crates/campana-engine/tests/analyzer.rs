//! Integration tests for the analyzer state machine.
//!
//! Windows are synthesized at a sample rate equal to the window length so
//! every bin is exactly 1 Hz wide, and timestamps are injected through
//! `process_window_at` to keep episode timing deterministic.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use campana_analysis::{DisplayParams, Pattern, PeakSet};
use campana_engine::{
    Analyzer, AnalyzerConfig, AnalyzerEvent, AnalyzerState, MemoryStore, NotificationSink,
};

const SAMPLE_RATE: f32 = 8192.0;
const WINDOW_SIZE: usize = 8192;

fn tone(freqs: &[f32]) -> Vec<f32> {
    (0..WINDOW_SIZE)
        .map(|i| {
            freqs
                .iter()
                .map(|f| (2.0 * PI * f * i as f32 / SAMPLE_RATE).sin())
                .sum()
        })
        .collect()
}

fn silence() -> Vec<f32> {
    vec![0.0; WINDOW_SIZE]
}

/// Reference with strongest frequencies 110 Hz (mag 50) and 220 Hz
/// (mag 40), spanning 3.0 seconds.
fn reference_pattern() -> Pattern {
    let mut first = PeakSet::new(0.0, 0.0, 3);
    first.offer(110.0, 25.0);
    first.offer(220.0, 20.0);

    let mut last = PeakSet::new(3.0, 0.0, 3);
    last.offer(110.0, 25.0);
    last.offer(220.0, 20.0);

    [first, last].into_iter().collect()
}

struct Harness {
    analyzer: Analyzer,
    store: MemoryStore,
    notifications: Arc<AtomicUsize>,
    states: Arc<Mutex<Vec<AnalyzerState>>>,
    t0: Instant,
}

impl Harness {
    fn new(reference: Pattern) -> Self {
        let store = MemoryStore::with_pattern(reference);
        let notifications = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&notifications);
        let sink = move |_msg: &str| {
            count.fetch_add(1, Ordering::SeqCst);
        };

        let mut analyzer = Analyzer::new(
            AnalyzerConfig::default(),
            store.clone(),
            Box::new(sink) as Box<dyn NotificationSink + Send>,
        );

        let states = Arc::new(Mutex::new(Vec::new()));
        let observed = Arc::clone(&states);
        analyzer.set_observer(Box::new(move |event| {
            if let AnalyzerEvent::StateChanged(state) = event {
                observed.lock().unwrap().push(state);
            }
        }));

        Self {
            analyzer,
            store,
            notifications,
            states,
            t0: Instant::now(),
        }
    }

    fn feed(&mut self, mut samples: Vec<f32>, at_seconds: f64) {
        let now = self.t0 + Duration::from_secs_f64(at_seconds);
        self.analyzer
            .process_window_at(&mut samples, SAMPLE_RATE, now);
    }

    fn notified(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }
}

#[test]
fn starts_idle_then_monitoring_picks_initial_state() {
    let mut harness = Harness::new(reference_pattern());
    assert_eq!(harness.analyzer.state(), AnalyzerState::Idle);

    harness.analyzer.start_monitoring();
    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);

    let mut empty = Harness::new(Pattern::new());
    empty.analyzer.start_monitoring();
    assert_eq!(empty.analyzer.state(), AnalyzerState::NoReference);
}

#[test]
fn two_tone_candidate_matches_at_rapid_stage() {
    let mut harness = Harness::new(reference_pattern());
    harness.analyzer.start_monitoring();

    // Rapid checkpoint for a 3.0 s reference: min(2.0, 1.5) = 1.5 s
    harness.feed(tone(&[110.0, 220.0]), 0.0);
    harness.feed(tone(&[110.0, 220.0]), 1.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);

    harness.feed(tone(&[110.0, 220.0]), 2.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);
    assert_eq!(harness.notified(), 1);
}

#[test]
fn complete_stage_does_not_renotify() {
    let mut harness = Harness::new(reference_pattern());
    harness.analyzer.start_monitoring();

    harness.feed(tone(&[110.0, 220.0]), 0.0);
    harness.feed(tone(&[110.0, 220.0]), 2.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);

    // Past the complete checkpoint (0.8 * 3.0 = 2.4 s): still one
    // notification, one Match transition
    harness.feed(tone(&[110.0, 220.0]), 2.5);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);
    assert_eq!(harness.notified(), 1);

    let states = harness.states.lock().unwrap();
    let matches = states
        .iter()
        .filter(|s| **s == AnalyzerState::Match)
        .count();
    assert_eq!(matches, 1);
}

#[test]
fn single_frequency_candidate_stays_not_match() {
    let mut harness = Harness::new(reference_pattern());
    harness.analyzer.start_monitoring();

    harness.feed(tone(&[110.0]), 0.0);
    harness.feed(tone(&[110.0]), 1.0);
    harness.feed(tone(&[110.0]), 2.0);
    harness.feed(tone(&[110.0]), 2.5);

    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);
    assert_eq!(harness.notified(), 0);
}

#[test]
fn single_frequency_reference_ignores_dc_energy() {
    // Reference whose aggregate holds one frequency only: there is no
    // second checkpoint, so nothing the candidate carries at 0 Hz may
    // stand in for it
    let mut first = PeakSet::new(0.0, 0.0, 3);
    first.offer(110.0, 25.0);
    let mut last = PeakSet::new(3.0, 0.0, 3);
    last.offer(110.0, 25.0);
    let reference: Pattern = [first, last].into_iter().collect();

    let mut harness = Harness::new(reference);
    harness.analyzer.start_monitoring();

    // 110 Hz plus a DC offset: the candidate records 0 Hz well above
    // threshold
    let offset_tone: Vec<f32> = tone(&[110.0]).into_iter().map(|s| s + 0.5).collect();
    harness.feed(offset_tone.clone(), 0.0);
    harness.feed(offset_tone.clone(), 2.0);
    harness.feed(offset_tone, 2.6);

    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);
    assert_eq!(harness.notified(), 0);
}

#[test]
fn set_display_params_persists_and_clips_published_spectrum() {
    let mut harness = Harness::new(reference_pattern());

    let spectra = Arc::new(Mutex::new(Vec::new()));
    let observed = Arc::clone(&spectra);
    harness.analyzer.set_observer(Box::new(move |event| {
        if let AnalyzerEvent::DisplaySpectrum(bins) = event {
            observed.lock().unwrap().push(bins);
        }
    }));

    let params = DisplayParams {
        max_magnitude: 10.0,
        max_frequency_hz: 500.0,
    };
    harness.analyzer.set_display_params(params);
    assert_eq!(harness.analyzer.display_params(), params);
    assert_eq!(harness.store.display_params(), params);

    harness.feed(tone(&[110.0, 220.0]), 0.0);

    let spectra = spectra.lock().unwrap();
    let bins = spectra.last().expect("one spectrum per window");
    assert!(!bins.is_empty());
    assert!(bins.iter().all(|b| b.frequency_hz <= 500.0));
    assert!(bins.iter().all(|b| b.magnitude <= 10.0));
}

#[test]
fn silence_timeout_resets_episode() {
    let mut harness = Harness::new(reference_pattern());
    harness.analyzer.start_monitoring();

    harness.feed(tone(&[110.0]), 0.0);
    assert_eq!(harness.analyzer.candidate().len(), 1);

    // Inside the 2.0 s timeout: nothing resets
    harness.feed(silence(), 1.0);
    assert_eq!(harness.analyzer.candidate().len(), 1);

    // Just past it: episode ends, candidate cleared immediately
    harness.feed(silence(), 2.05);
    assert!(harness.analyzer.candidate().is_empty());
    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);
}

#[test]
fn silence_timeout_after_match_returns_to_not_match() {
    let mut harness = Harness::new(reference_pattern());
    harness.analyzer.start_monitoring();

    harness.feed(tone(&[110.0, 220.0]), 0.0);
    harness.feed(tone(&[110.0, 220.0]), 2.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);

    harness.feed(silence(), 4.5);
    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);
    assert!(harness.analyzer.candidate().is_empty());

    // A later matching episode can fire again
    harness.feed(tone(&[110.0, 220.0]), 5.0);
    harness.feed(tone(&[110.0, 220.0]), 7.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);
    assert_eq!(harness.notified(), 2);
}

#[test]
fn delete_reference_while_matched_forces_no_reference() {
    let mut harness = Harness::new(reference_pattern());
    harness.analyzer.start_monitoring();

    harness.feed(tone(&[110.0, 220.0]), 0.0);
    harness.feed(tone(&[110.0, 220.0]), 2.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);

    harness.analyzer.delete_reference();
    assert_eq!(harness.analyzer.state(), AnalyzerState::NoReference);
    assert!(harness.store.pattern().is_empty());

    // Monitoring restart without re-recording stays NoReference, and
    // further windows contribute nothing
    harness.analyzer.start_monitoring();
    assert_eq!(harness.analyzer.state(), AnalyzerState::NoReference);

    harness.feed(tone(&[110.0, 220.0]), 3.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::NoReference);
}

#[test]
fn recording_captures_and_persists_reference() {
    let mut harness = Harness::new(Pattern::new());

    harness.analyzer.start_recording();
    assert_eq!(harness.analyzer.state(), AnalyzerState::NoReference);
    assert!(harness.analyzer.is_recording());

    harness.feed(tone(&[110.0, 220.0]), 0.0);
    harness.feed(tone(&[110.0, 220.0]), 1.2);
    assert_eq!(harness.analyzer.reference().len(), 2);

    // Silence finalizes the recording
    harness.feed(silence(), 4.0);
    assert!(!harness.analyzer.is_recording());
    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);
    assert_eq!(harness.analyzer.reference().duration(), Some(1.2));
    assert_eq!(harness.store.pattern().len(), 2);
}

#[test]
fn start_recording_clears_persisted_reference_immediately() {
    let mut harness = Harness::new(reference_pattern());
    assert!(!harness.store.pattern().is_empty());

    harness.analyzer.start_recording();
    assert!(harness.store.pattern().is_empty());
    assert_eq!(harness.analyzer.state(), AnalyzerState::NoReference);
}

#[test]
fn recorded_reference_matches_a_replayed_sound() {
    let mut harness = Harness::new(Pattern::new());

    // Record a two-tone chime spanning 2.0 s
    harness.analyzer.start_recording();
    harness.feed(tone(&[110.0, 220.0]), 0.0);
    harness.feed(tone(&[110.0, 220.0]), 1.0);
    harness.feed(tone(&[110.0, 220.0]), 2.0);
    harness.feed(silence(), 5.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::NotMatch);

    // Replay it while monitoring; rapid checkpoint is min(2.0, 1.0) = 1.0
    harness.analyzer.start_monitoring();
    harness.feed(tone(&[110.0, 220.0]), 6.0);
    harness.feed(tone(&[110.0, 220.0]), 7.5);

    assert_eq!(harness.analyzer.state(), AnalyzerState::Match);
    assert_eq!(harness.notified(), 1);
}

#[test]
fn monitoring_disabled_ignores_windows() {
    let mut harness = Harness::new(reference_pattern());

    // Never started: stays Idle, nothing accumulates
    harness.feed(tone(&[110.0, 220.0]), 0.0);
    assert_eq!(harness.analyzer.state(), AnalyzerState::Idle);
    assert!(harness.analyzer.candidate().is_empty());

    harness.analyzer.start_monitoring();
    harness.analyzer.stop_monitoring();
    harness.feed(tone(&[110.0, 220.0]), 1.0);
    assert!(harness.analyzer.candidate().is_empty());
}
