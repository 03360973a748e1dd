//! Sound patterns: ordered peak-set sequences and their aggregation.

use serde::{Deserialize, Serialize};

use crate::peaks::{Peak, PeakSet, largest_index};

/// An ordered sequence of [`PeakSet`]s spanning one detection episode.
///
/// Insertion order is capture order is time order. A persisted pattern is
/// the reference sound to detect; an ephemeral one is the candidate being
/// accumulated during monitoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    sets: Vec<PeakSet>,
}

impl Pattern {
    /// Create an empty pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next time slice.
    pub fn push(&mut self, set: PeakSet) {
        self.sets.push(set);
    }

    /// Discard all slices.
    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the pattern holds no slices.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The slices in time order.
    pub fn sets(&self) -> &[PeakSet] {
        &self.sets
    }

    /// Time spanned by the pattern: `last.time - first.time`.
    ///
    /// `None` when there are fewer than two time-distinct slices, in
    /// which case the duration is undefined.
    pub fn duration(&self) -> Option<f64> {
        let first = self.sets.first()?.time();
        let last = self.sets.last()?.time();
        if first == last {
            return None;
        }
        Some(last - first)
    }

    /// Collapse the pattern into one union peak set, summing magnitudes
    /// of peaks sharing a frequency across all slices.
    ///
    /// The aggregate is a comparison artifact only; it is never
    /// persisted.
    pub fn aggregate(&self) -> AggregatePeaks {
        let mut aggregate = AggregatePeaks::default();
        for set in &self.sets {
            for peak in set.peaks() {
                aggregate.add(peak.frequency_hz, peak.magnitude);
            }
        }
        aggregate
    }
}

impl FromIterator<PeakSet> for Pattern {
    fn from_iter<T: IntoIterator<Item = PeakSet>>(iter: T) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

/// Union of a pattern's peaks with per-frequency magnitude sums.
///
/// Unbounded, unlike [`PeakSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatePeaks {
    peaks: Vec<Peak>,
}

impl AggregatePeaks {
    /// Add a contribution, summing into an existing frequency entry.
    pub fn add(&mut self, frequency_hz: f32, magnitude: f32) {
        if let Some(existing) = self
            .peaks
            .iter_mut()
            .find(|p| p.frequency_hz == frequency_hz)
        {
            existing.magnitude += magnitude;
        } else {
            self.peaks.push(Peak {
                frequency_hz,
                magnitude,
            });
        }
    }

    /// Summed magnitude recorded at a frequency, if the frequency ever
    /// produced a peak.
    pub fn magnitude_at(&self, frequency_hz: f32) -> Option<f32> {
        self.peaks
            .iter()
            .find(|p| p.frequency_hz == frequency_hz)
            .map(|p| p.magnitude)
    }

    /// The strictly largest entry outside `excluded`, ties to the
    /// earliest; [`Peak::NONE`] when nothing qualifies.
    pub fn largest_excluding(&self, excluded: &[f32]) -> Peak {
        largest_index(&self.peaks, excluded)
            .map(|i| self.peaks[i])
            .unwrap_or(Peak::NONE)
    }

    /// All entries, in first-seen frequency order.
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Whether the aggregate is empty.
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}
