use crate::types::Sample;
use std::collections::VecDeque;

/// Bounded rolling series of price samples for charting.
///
/// Appends are constant time; once the capacity is exceeded the oldest
/// samples are evicted from the front. Eviction is silent: older
/// history is discardable.
#[derive(Debug)]
pub struct PriceSeries {
    points: VecDeque<Sample>,
    max_points: usize,
}

impl PriceSeries {
    /// Create a series retaining at most `max_points` samples.
    pub fn new(max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            points: VecDeque::with_capacity(max_points),
            max_points,
        }
    }

    /// Append a sample, evicting from the front past capacity.
    ///
    /// Timestamps are clamped to be non-decreasing so a clock step
    /// backwards cannot produce an out-of-order chart.
    pub fn push(&mut self, mut sample: Sample) {
        if let Some(last) = self.points.back() {
            if sample.timestamp < last.timestamp {
                sample.timestamp = last.timestamp;
            }
        }
        self.points.push_back(sample);

        while self.points.len() > self.max_points {
            self.points.pop_front();
        }
    }

    /// Ordered copy of the current samples, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.points.iter().copied().collect()
    }

    /// Most recent sample, if any.
    pub fn last(&self) -> Option<Sample> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
