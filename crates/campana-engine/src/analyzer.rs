//! The analysis orchestrator: per-window pipeline, two-stage matching,
//! and the monitoring/recording state machine.

use std::time::Instant;

use campana_analysis::{
    DisplayParams, Fft, Pattern, Spectrum, SpectralBin, Window, extract_peaks,
};

use crate::config::AnalyzerConfig;
use crate::notify::NotificationSink;
use crate::store::{DisplayParamsStore, PatternStore};

/// Discrete analyzer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerState {
    /// Pipeline not started yet.
    Idle,
    /// No reference pattern exists; recording is required before
    /// monitoring can match anything.
    NoReference,
    /// Steady monitoring state: listening, no match declared.
    NotMatch,
    /// The candidate matched the reference. One-shot; resets to
    /// [`NotMatch`](AnalyzerState::NotMatch) when the detection episode
    /// ends.
    Match,
}

/// Events published to the registered observer, on the producer thread.
#[derive(Debug, Clone)]
pub enum AnalyzerEvent {
    /// The state machine transitioned.
    StateChanged(AnalyzerState),
    /// A fresh display spectrum, already clipped by the display
    /// parameters.
    DisplaySpectrum(Vec<SpectralBin>),
}

/// Observer callback for [`AnalyzerEvent`]s.
pub type Observer = Box<dyn FnMut(AnalyzerEvent) + Send>;

#[derive(Debug, Clone, Copy)]
enum MatchStage {
    Rapid,
    Complete,
}

/// Drives the per-window pipeline and the match state machine.
///
/// Constructed with its dependencies at the composition root; there is no
/// ambient instance. All methods run on the capture thread; presentation
/// consumers attach through [`set_observer`](Self::set_observer) and
/// bridge to their own thread.
pub struct Analyzer {
    config: AnalyzerConfig,
    fft: Fft,
    spectrum: Spectrum,
    display_params: DisplayParams,

    reference: Pattern,
    reference_duration: Option<f64>,
    candidate: Pattern,

    state: AnalyzerState,
    recording: bool,
    monitoring: bool,

    episode_start: Option<Instant>,
    last_detect: Option<Instant>,
    rapid_pending: bool,
    complete_pending: bool,

    store: Box<dyn PatternStore + Send>,
    display_store: Box<dyn DisplayParamsStore + Send>,
    notifier: Box<dyn NotificationSink + Send>,
    observer: Option<Observer>,
}

impl Analyzer {
    /// Create an analyzer with its injected dependencies.
    ///
    /// The reference pattern and display parameters are loaded once, up
    /// front; a store that fails to load yields an empty reference (and
    /// the `NoReference` path) rather than an error.
    pub fn new<S>(config: AnalyzerConfig, store: S, notifier: Box<dyn NotificationSink + Send>) -> Self
    where
        S: PatternStore + DisplayParamsStore + Clone + Send + 'static,
    {
        let reference = store.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "reference pattern unavailable, starting empty");
            Pattern::new()
        });
        let display_params = store.load_display_params().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "display params unavailable, using defaults");
            DisplayParams::default()
        });
        let reference_duration = reference.duration();

        tracing::info!(
            slices = reference.len(),
            duration = ?reference_duration,
            "analyzer initialized"
        );

        Self {
            fft: Fft::new(config.window_size),
            spectrum: Spectrum::new(),
            display_params,
            config,
            reference,
            reference_duration,
            candidate: Pattern::new(),
            state: AnalyzerState::Idle,
            recording: false,
            monitoring: false,
            episode_start: None,
            last_detect: None,
            rapid_pending: true,
            complete_pending: true,
            store: Box::new(store.clone()),
            display_store: Box::new(store),
            notifier,
            observer: None,
        }
    }

    /// Register the event observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    /// Current state.
    pub fn state(&self) -> AnalyzerState {
        self.state
    }

    /// The loaded reference pattern.
    pub fn reference(&self) -> &Pattern {
        &self.reference
    }

    /// The candidate pattern of the current monitoring episode.
    pub fn candidate(&self) -> &Pattern {
        &self.candidate
    }

    /// Display clipping parameters in effect.
    pub fn display_params(&self) -> DisplayParams {
        self.display_params
    }

    /// Whether windows are currently contributing to the candidate.
    pub fn is_analyzing(&self) -> bool {
        self.monitoring
            && matches!(self.state, AnalyzerState::NotMatch | AnalyzerState::Match)
    }

    /// Whether a recording session is in progress.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Enable monitoring. Takes effect at the next window boundary.
    pub fn start_monitoring(&mut self) {
        self.monitoring = true;

        if self.reference.is_empty() {
            self.change_state(AnalyzerState::NoReference);
        } else {
            self.change_state(AnalyzerState::NotMatch);
        }
    }

    /// Disable monitoring. Takes effect at the next window boundary.
    pub fn stop_monitoring(&mut self) {
        self.monitoring = false;
    }

    /// Begin recording a new reference pattern.
    ///
    /// The existing reference is cleared immediately, with no undo, and
    /// the cleared value is persisted. Recording and monitoring are
    /// mutually exclusive on the same stream.
    pub fn start_recording(&mut self) {
        self.reference.clear();
        self.reference_duration = None;
        self.persist_reference();

        self.change_state(AnalyzerState::NoReference);
        self.recording = true;
        self.reset_episode();
    }

    /// Finish recording and persist whatever was captured.
    ///
    /// Also invoked internally when the silence timeout ends a recording
    /// episode.
    pub fn end_recording(&mut self) {
        self.recording = false;

        if self.reference.is_empty() {
            self.change_state(AnalyzerState::NoReference);
        } else {
            self.change_state(AnalyzerState::NotMatch);
        }

        self.persist_reference();
        self.reference_duration = self.reference.duration();

        tracing::info!(
            slices = self.reference.len(),
            duration = ?self.reference_duration,
            "reference pattern recorded"
        );
    }

    /// Delete the reference pattern and persist the empty value.
    pub fn delete_reference(&mut self) {
        self.reference.clear();
        self.reference_duration = None;
        self.persist_reference();

        self.change_state(AnalyzerState::NoReference);
    }

    /// Replace the display clipping parameters and persist them.
    pub fn set_display_params(&mut self, params: DisplayParams) {
        self.display_params = params;
        if let Err(err) = self.display_store.save_display_params(&params) {
            tracing::warn!(error = %err, "failed to persist display params");
        }
    }

    /// Run the pipeline over one captured window (left channel).
    ///
    /// The buffer is windowed in place. Runs synchronously on the caller,
    /// which is expected to be the capture thread.
    pub fn process_window(&mut self, left: &mut [f32], sample_rate: f32) {
        self.process_window_at(left, sample_rate, Instant::now());
    }

    /// [`process_window`](Self::process_window) with an explicit
    /// timestamp, for deterministic callers.
    pub fn process_window_at(&mut self, left: &mut [f32], sample_rate: f32, now: Instant) {
        Window::Hamming.apply(left);

        self.fft.resize(left.len());
        let spectrum = self.fft.forward(left);
        self.spectrum.update(spectrum, sample_rate);

        let time = self
            .episode_start
            .map_or(0.0, |start| now.duration_since(start).as_secs_f64());
        let peaks = extract_peaks(
            &self.spectrum,
            time,
            self.config.peak_threshold,
            self.config.max_peaks,
        );

        if !peaks.is_empty() {
            self.last_detect = Some(now);

            if self.recording {
                if self.reference.is_empty() {
                    self.episode_start = Some(now);
                }
                self.reference.push(peaks);
            } else if self.is_analyzing() {
                if self.candidate.is_empty() {
                    self.episode_start = Some(now);
                }
                self.candidate.push(peaks);
            }
        }

        self.run_match_stages();
        self.check_silence_timeout(now);
        self.publish_display_spectrum();
    }

    /// Two-stage matching: a rapid checkpoint for low latency, then a
    /// complete one near the reference duration, each at most once per
    /// episode.
    fn run_match_stages(&mut self) {
        if self.recording || !self.is_analyzing() {
            return;
        }

        let (Some(candidate_duration), Some(reference_duration)) =
            (self.candidate.duration(), self.reference_duration)
        else {
            return;
        };

        let rapid_threshold = self
            .config
            .rapid_analyze_duration
            .min(reference_duration * 0.5);
        let complete_threshold = reference_duration * 0.8;

        if self.rapid_pending && candidate_duration > rapid_threshold {
            self.rapid_pending = false;
            self.compare(MatchStage::Rapid);
        }

        // The complete checkpoint only exists when it is meaningfully
        // later than the rapid one; very short references get a single
        // checkpoint.
        if self.complete_pending
            && candidate_duration > complete_threshold
            && complete_threshold > rapid_threshold
        {
            self.complete_pending = false;
            self.compare(MatchStage::Complete);
        }
    }

    /// Compare aggregates: the candidate matches when it has recorded any
    /// magnitude at both of the reference's two strongest frequencies.
    fn compare(&mut self, stage: MatchStage) {
        if self.candidate.is_empty() || self.reference.is_empty() {
            return;
        }

        let reference = self.reference.aggregate();
        let candidate = self.candidate.aggregate();

        let largest = reference.largest_excluding(&[]);
        let second = reference.largest_excluding(&[largest.frequency_hz]);

        // A single-frequency reference yields the zero sentinel here;
        // looking frequency 0 up in the candidate would let any DC
        // energy stand in for the missing second checkpoint.
        if second.magnitude == 0.0 {
            tracing::debug!(?stage, "reference aggregate has one frequency, skipping");
            return;
        }

        let found = candidate.magnitude_at(largest.frequency_hz);
        let second_found = candidate.magnitude_at(second.frequency_hz);

        tracing::debug!(
            ?stage,
            largest = largest.frequency_hz,
            second = second.frequency_hz,
            found = found.is_some(),
            second_found = second_found.is_some(),
            "match comparison"
        );

        if found.is_some() && second_found.is_some() {
            self.change_state(AnalyzerState::Match);
        }
    }

    /// End the detection episode after the configured stretch of silence.
    fn check_silence_timeout(&mut self, now: Instant) {
        let (Some(last_detect), Some(_)) = (self.last_detect, self.episode_start) else {
            return;
        };

        if now.duration_since(last_detect).as_secs_f64() <= self.config.silence_timeout {
            return;
        }

        if self.recording {
            self.end_recording();
            self.reset_episode();
        } else if self.is_analyzing() {
            self.reset_episode();
            self.change_state(AnalyzerState::NotMatch);
        }
    }

    fn reset_episode(&mut self) {
        self.last_detect = None;
        self.episode_start = None;
        self.candidate.clear();

        self.rapid_pending = true;
        self.complete_pending = true;
    }

    fn change_state(&mut self, state: AnalyzerState) {
        if self.state == state {
            return;
        }

        tracing::debug!(from = ?self.state, to = ?state, "state transition");
        self.state = state;

        if state == AnalyzerState::Match {
            self.notifier.notify("sound pattern matched");
        }

        if let Some(observer) = &mut self.observer {
            observer(AnalyzerEvent::StateChanged(state));
        }
    }

    fn persist_reference(&mut self) {
        if let Err(err) = self.store.save(&self.reference) {
            tracing::warn!(error = %err, "failed to persist reference pattern");
        }
    }

    fn publish_display_spectrum(&mut self) {
        if let Some(observer) = &mut self.observer {
            observer(AnalyzerEvent::DisplaySpectrum(
                self.spectrum.clipped(self.display_params),
            ));
        }
    }
}
