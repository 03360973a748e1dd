//! Bounded per-window peak sets.

use serde::{Deserialize, Serialize};

/// A (frequency, magnitude) pair exceeding the extraction threshold
/// within one capture window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Frequency in Hz, rounded to the nearest integer at extraction.
    pub frequency_hz: f32,
    /// Unnormalized spectral magnitude.
    pub magnitude: f32,
}

impl Peak {
    /// Zero-magnitude sentinel returned by queries that find nothing.
    /// Callers treat magnitude 0 at frequency 0 as "not found".
    pub const NONE: Peak = Peak {
        frequency_hz: 0.0,
        magnitude: 0.0,
    };
}

/// Index of the strictly largest peak not in `excluded`, ties to the
/// earliest index. `None` when the slice is empty or fully excluded.
pub(crate) fn largest_index(peaks: &[Peak], excluded: &[f32]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_magnitude = 0.0f32;

    for (index, peak) in peaks.iter().enumerate() {
        if excluded.contains(&peak.frequency_hz) {
            continue;
        }
        if peak.magnitude > best_magnitude {
            best_magnitude = peak.magnitude;
            best = Some(index);
        }
    }
    best
}

/// The strongest peaks of one time slice.
///
/// Holds at most `capacity` peaks, every one strictly above `threshold`
/// and unique by frequency. Only [`PeakSet::offer`] mutates the
/// collection, so the bounds cannot be violated from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    time: f64,
    threshold: f32,
    capacity: usize,
    peaks: Vec<Peak>,
}

impl PeakSet {
    /// Create an empty set for the time slice at `time` seconds from the
    /// start of the current detection episode.
    pub fn new(time: f64, threshold: f32, capacity: usize) -> Self {
        Self {
            time,
            threshold,
            capacity,
            peaks: Vec::with_capacity(capacity),
        }
    }

    /// Offer a candidate peak to the set.
    ///
    /// Candidates at or below the threshold are ignored. A candidate at
    /// an already-present frequency updates that entry in place, keeping
    /// the larger magnitude. When the set is full, the candidate replaces
    /// the current minimum-magnitude peak only if strictly larger than
    /// it. Returns whether the set changed.
    pub fn offer(&mut self, frequency_hz: f32, magnitude: f32) -> bool {
        if magnitude <= self.threshold {
            return false;
        }

        if let Some(existing) = self
            .peaks
            .iter_mut()
            .find(|p| p.frequency_hz == frequency_hz)
        {
            if magnitude > existing.magnitude {
                existing.magnitude = magnitude;
                return true;
            }
            return false;
        }

        if self.peaks.len() < self.capacity {
            self.peaks.push(Peak {
                frequency_hz,
                magnitude,
            });
            return true;
        }

        match self.smallest_index() {
            Some(smallest) if magnitude > self.peaks[smallest].magnitude => {
                self.peaks[smallest] = Peak {
                    frequency_hz,
                    magnitude,
                };
                true
            }
            _ => false,
        }
    }

    /// Time offset of this slice, seconds relative to episode start.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Extraction threshold the set was built with.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Maximum number of peaks the set will hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The recorded peaks, in insertion order.
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Number of recorded peaks.
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Whether no peak cleared the threshold.
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Magnitude recorded at an exact frequency, if any.
    pub fn magnitude_at(&self, frequency_hz: f32) -> Option<f32> {
        self.peaks
            .iter()
            .find(|p| p.frequency_hz == frequency_hz)
            .map(|p| p.magnitude)
    }

    /// The strictly largest peak whose frequency is not in `excluded`.
    ///
    /// Ties resolve to the earliest index. Returns [`Peak::NONE`] when
    /// the set is empty or every candidate is excluded.
    pub fn largest_excluding(&self, excluded: &[f32]) -> Peak {
        largest_index(&self.peaks, excluded)
            .map(|i| self.peaks[i])
            .unwrap_or(Peak::NONE)
    }

    fn smallest_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_magnitude = f32::INFINITY;

        for (index, peak) in self.peaks.iter().enumerate() {
            if peak.magnitude < best_magnitude {
                best_magnitude = peak.magnitude;
                best = Some(index);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_set() -> PeakSet {
        let mut set = PeakSet::new(0.0, 30.0, 3);
        set.offer(110.0, 50.0);
        set.offer(220.0, 40.0);
        set.offer(330.0, 60.0);
        set
    }

    #[test]
    fn ignores_at_or_below_threshold() {
        let mut set = PeakSet::new(0.0, 30.0, 3);

        assert!(!set.offer(110.0, 30.0));
        assert!(!set.offer(110.0, 10.0));
        assert!(set.is_empty());
    }

    #[test]
    fn updates_existing_frequency_in_place() {
        let mut set = PeakSet::new(0.0, 30.0, 3);
        set.offer(110.0, 50.0);
        set.offer(110.0, 70.0);

        assert_eq!(set.len(), 1);
        assert_eq!(set.magnitude_at(110.0), Some(70.0));
    }

    #[test]
    fn full_set_replaces_minimum_only_if_strictly_larger() {
        let mut set = filled_set();

        // Equal to the current minimum (40.0): unchanged
        assert!(!set.offer(440.0, 40.0));
        assert_eq!(set.magnitude_at(440.0), None);

        // Strictly larger: evicts the 220 Hz minimum
        assert!(set.offer(440.0, 45.0));
        assert_eq!(set.len(), 3);
        assert_eq!(set.magnitude_at(220.0), None);
        assert_eq!(set.magnitude_at(440.0), Some(45.0));
    }

    #[test]
    fn largest_excluding_walks_down() {
        let set = filled_set();

        let first = set.largest_excluding(&[]);
        assert_eq!(first.frequency_hz, 330.0);

        let second = set.largest_excluding(&[first.frequency_hz]);
        assert_eq!(second.frequency_hz, 110.0);
    }

    #[test]
    fn largest_of_empty_is_sentinel() {
        let set = PeakSet::new(0.0, 30.0, 3);
        assert_eq!(set.largest_excluding(&[]), Peak::NONE);
    }

    #[test]
    fn largest_tie_resolves_to_earliest() {
        let mut set = PeakSet::new(0.0, 0.0, 3);
        set.offer(100.0, 50.0);
        set.offer(200.0, 50.0);

        assert_eq!(set.largest_excluding(&[]).frequency_hz, 100.0);
    }
}
