use std::collections::VecDeque;
use std::time::Duration;

use crate::shared::constants::LATENCY_WINDOW;

/// Smoothed detection timings for the on-screen stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatencyStats {
    /// Mean detection time, rounded to whole milliseconds.
    pub duration_ms: u64,
    /// Estimated throughput, rounded to two decimals.
    pub fps: f64,
}

/// Rolling window of the most recent detection durations, newest first.
#[derive(Clone, Debug)]
pub struct LatencyTracker {
    window: VecDeque<f64>,
    capacity: usize,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::with_capacity(LATENCY_WINDOW)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.record_ms(elapsed.as_secs_f64() * 1000.0);
    }

    /// Pushes a sample in milliseconds, evicting the oldest beyond capacity.
    pub fn record_ms(&mut self, elapsed_ms: f64) {
        self.window.push_front(elapsed_ms);
        self.window.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Samples in newest-first order.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }

    fn mean_ms(&self) -> Option<f64> {
        if self.window.is_empty() {
            return None;
        }
        Some(self.window.iter().sum::<f64>() / self.window.len() as f64)
    }

    pub fn smoothed_duration_ms(&self) -> Option<u64> {
        self.mean_ms().map(|mean| mean.round() as u64)
    }

    /// 1000 / mean, computed from the unrounded mean.
    pub fn smoothed_fps(&self) -> Option<f64> {
        let mean = self.mean_ms()?;
        if mean <= 0.0 {
            return None;
        }
        Some((1000.0 / mean * 100.0).round() / 100.0)
    }

    pub fn stats(&self) -> Option<LatencyStats> {
        Some(LatencyStats {
            duration_ms: self.smoothed_duration_ms()?,
            fps: self.smoothed_fps()?,
        })
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}
