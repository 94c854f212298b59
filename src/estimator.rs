use std::collections::VecDeque;

use crate::sample::Sample;

/// Minimum logical-time spacing between two emitted samples, in seconds.
/// Transport chunks can arrive far more often than this.
const TICK_INTERVAL: f64 = 0.01;

/// Width of the trailing window used for the short-term rate estimate.
const WINDOW_SECS: f64 = 1.0;

/// Raw observations older than this are dropped from the buffer.
const RETENTION_SECS: f64 = 20.0;

/// One raw progress observation, buffered at native chunk frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawProgress {
    time: f64,
    kb: f64,
}

/// Turns raw progress notifications into one finalized [`Sample`] per tick.
///
/// Lives entirely on the producer thread: constructed when the transfer
/// starts, dropped when it ends. The buffer holds at most 20 seconds of
/// logical transfer time.
pub struct RateEstimator {
    buffer: VecDeque<RawProgress>,
    last_emit: f64,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
            last_emit: 0.0,
        }
    }

    /// Record one progress notification. Returns a finalized sample when a
    /// full tick has elapsed since the last one, `None` otherwise.
    ///
    /// `time` is elapsed seconds, `cumulative_bytes` the total downloaded so
    /// far, `avg_bps` the transport-reported average rate in bytes/s.
    pub fn observe(&mut self, time: f64, cumulative_bytes: f64, avg_bps: f64) -> Option<Sample> {
        let kb = cumulative_bytes / 1024.0;
        self.buffer.push_back(RawProgress { time, kb });

        if time - self.last_emit < TICK_INTERVAL {
            return None;
        }

        let window_kbs = self.window_rate(time);
        self.evict_expired(time);
        self.last_emit = time;

        Some(Sample {
            time,
            cumulative_kb: kb,
            avg_kbs: avg_bps / 1024.0,
            window_kbs,
        })
    }

    /// Secant-slope estimate over the trailing 1-second window: telescoping
    /// sum of KB deltas between consecutive in-window observations. The first
    /// observation in the window is the baseline and contributes no delta, so
    /// a window holding a single observation yields 0.
    ///
    /// Deliberately coarse: this is not a smoothed derivative, and it is noisy
    /// at low sample density. The chart plots it as-is.
    fn window_rate(&self, time: f64) -> f64 {
        let mut total_kb = 0.0;
        let mut baseline: Option<f64> = None;
        for raw in &self.buffer {
            if raw.time <= time && raw.time >= time - WINDOW_SECS {
                let base = baseline.get_or_insert(raw.kb);
                total_kb += raw.kb - *base;
                *base = raw.kb;
            }
        }
        total_kb
    }

    /// Two-phase expiry: collect the victims first, then remove each one.
    /// Removing an entry that is no longer present is a no-op.
    fn evict_expired(&mut self, time: f64) {
        let expired: Vec<RawProgress> = self
            .buffer
            .iter()
            .filter(|raw| time >= raw.time + RETENTION_SECS)
            .copied()
            .collect();
        for victim in expired {
            if let Some(idx) = self.buffer.iter().position(|raw| *raw == victim) {
                self.buffer.remove(idx);
            }
        }
    }

    #[cfg(test)]
    fn oldest_buffered(&self) -> Option<f64> {
        self.buffer.front().map(|raw| raw.time)
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttles_to_tick_interval() {
        let mut est = RateEstimator::new();
        // First notification lands inside the very first tick window.
        assert!(est.observe(0.0, 0.0, 0.0).is_none());
        assert!(est.observe(0.005, 512.0, 0.0).is_none());
        // One full tick elapsed: a sample comes out.
        assert!(est.observe(0.01, 1024.0, 0.0).is_some());
        // And the next tick starts counting from there.
        assert!(est.observe(0.015, 2048.0, 0.0).is_none());
    }

    #[test]
    fn windowed_rate_from_two_observations() {
        let mut est = RateEstimator::new();
        assert!(est.observe(0.0, 0.0, 0.0).is_none());
        let sample = est.observe(1.0, 1000.0, 1000.0).unwrap();

        // 1000 bytes over the trailing second, in KB.
        let expected = 1000.0 / 1024.0;
        assert!((sample.window_kbs - expected).abs() < 1e-9);
        // Transport average passes through, only converted to KB/s.
        assert!((sample.avg_kbs - expected).abs() < 1e-9);
        assert!((sample.cumulative_kb - expected).abs() < 1e-9);
    }

    #[test]
    fn single_observation_window_is_zero() {
        let mut est = RateEstimator::new();
        let sample = est.observe(0.02, 500.0, 25_000.0).unwrap();
        assert_eq!(sample.window_kbs, 0.0);
    }

    #[test]
    fn observations_outside_window_do_not_count() {
        let mut est = RateEstimator::new();
        assert!(est.observe(0.0, 0.0, 0.0).is_none());
        est.observe(1.0, 4096.0, 0.0).unwrap();
        // At t=2.5 only the t=2.5 observation is in [1.5, 2.5]: rate is 0.
        let sample = est.observe(2.5, 4096.0, 0.0).unwrap();
        assert_eq!(sample.window_kbs, 0.0);
    }

    #[test]
    fn evicts_observations_older_than_retention() {
        let mut est = RateEstimator::new();
        for i in 0..=25 {
            let t = i as f64;
            est.observe(t, t * 1024.0, 1024.0);
        }
        // Nothing older than 20 seconds survives.
        assert!(est.oldest_buffered().unwrap() >= 25.0 - 20.0);
        assert!(est.buffered() <= 21);
    }
}
