// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-process delivery statistics.
//!
//! Counts what each tracker tried to send and how it went. Nothing here is
//! ever reported to the metrics service.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Delivery statistics for one tracker, keyed by event type.
#[derive(Debug)]
pub struct DeliveryStats {
    events: RwLock<HashMap<String, EventStats>>,
    start_time: Instant,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record an event that was not sent because delivery is disabled.
    pub fn record_skipped(&self, event_type: &str) {
        self.write().entry(event_type.to_string()).or_default().skipped += 1;
    }

    /// Record a successful delivery.
    pub fn record_delivered(&self, event_type: &str, duration: Duration) {
        self.write()
            .entry(event_type.to_string())
            .or_default()
            .record(duration, true);
    }

    /// Record a failed delivery (network, timeout, or rejected).
    pub fn record_failed(&self, event_type: &str, duration: Duration) {
        self.write()
            .entry(event_type.to_string())
            .or_default()
            .record(duration, false);
    }

    /// Statistics for one event type.
    pub fn event(&self, event_type: &str) -> Option<EventStats> {
        self.read().get(event_type).cloned()
    }

    /// Take a snapshot of all statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events: self.read().clone(),
            uptime: self.start_time.elapsed(),
        }
    }

    pub fn reset(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, EventStats>> {
        self.events.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, EventStats>> {
        self.events.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for DeliveryStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for a single event type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStats {
    /// Requests actually issued.
    pub attempted: u64,
    pub delivered: u64,
    pub failed: u64,
    /// Events dropped because delivery is disabled.
    pub skipped: u64,
    pub total_duration: Duration,
    pub latency: LatencyHistogram,
}

impl EventStats {
    fn record(&mut self, duration: Duration, delivered: bool) {
        self.attempted += 1;
        if delivered {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
        self.total_duration += duration;
        self.latency.record(duration);
    }

    pub fn avg_duration(&self) -> Duration {
        if self.attempted == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.attempted as u32
        }
    }

    /// Fraction of attempted requests that were delivered (0.0 to 1.0).
    pub fn delivery_rate(&self) -> f64 {
        if self.attempted == 0 {
            1.0
        } else {
            self.delivered as f64 / self.attempted as f64
        }
    }
}

/// Fixed-bucket latency histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyHistogram {
    /// Upper bucket bounds in milliseconds; a final overflow bucket follows.
    bounds_ms: Vec<u64>,
    counts: Vec<u64>,
}

impl LatencyHistogram {
    pub fn with_bounds(bounds_ms: Vec<u64>) -> Self {
        let counts = vec![0; bounds_ms.len() + 1];
        Self { bounds_ms, counts }
    }

    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        let idx = self
            .bounds_ms
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(self.bounds_ms.len());
        self.counts[idx] += 1;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Approximate percentile, reported as the bucket's upper bound.
    pub fn percentile(&self, p: f64) -> Duration {
        let total = self.total();
        if total == 0 {
            return Duration::ZERO;
        }

        let target = ((total as f64 * p / 100.0).ceil() as u64).max(1);
        let mut cumulative = 0;
        for (i, &count) in self.counts.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                let ms = match self.bounds_ms.get(i) {
                    Some(&bound) => bound,
                    // overflow bucket
                    None => self.bounds_ms.last().copied().unwrap_or(0) * 2,
                };
                return Duration::from_millis(ms);
            }
        }
        Duration::ZERO
    }

    pub fn p50(&self) -> Duration {
        self.percentile(50.0)
    }

    pub fn p90(&self) -> Duration {
        self.percentile(90.0)
    }

    pub fn p99(&self) -> Duration {
        self.percentile(99.0)
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        // Delivery is bounded by the request timeout (5s by default).
        Self::with_bounds(vec![10, 50, 100, 250, 500, 1_000, 2_500, 5_000])
    }
}

/// Statistics captured at a point in time.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub events: HashMap<String, EventStats>,
    pub uptime: Duration,
}

impl StatsSnapshot {
    pub fn total_delivered(&self) -> u64 {
        self.events.values().map(|e| e.delivered).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.events.values().map(|e| e.failed).sum()
    }

    /// Format as a human-readable report.
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Delivery Report ===\n\n");
        report.push_str(&format!("Uptime: {:.2?}\n", self.uptime));
        report.push_str(&format!(
            "Delivered: {}, failed: {}\n",
            self.total_delivered(),
            self.total_failed()
        ));

        let mut names: Vec<&String> = self.events.keys().collect();
        names.sort();
        if !names.is_empty() {
            report.push('\n');
        }
        for name in names {
            let stats = &self.events[name];
            report.push_str(&format!(
                "  {}: {} sent, {:.1}% delivered, {} skipped, avg {:.2?}, p99 {:.2?}\n",
                name,
                stats.attempted,
                stats.delivery_rate() * 100.0,
                stats.skipped,
                stats.avg_duration(),
                stats.latency.p99()
            ));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_stats() {
        let stats = DeliveryStats::new();
        stats.record_delivered("tool_call", Duration::from_millis(20));
        stats.record_delivered("tool_call", Duration::from_millis(40));
        stats.record_failed("tool_call", Duration::from_millis(60));
        stats.record_skipped("tool_error");

        let tool_call = stats.event("tool_call").unwrap();
        assert_eq!(tool_call.attempted, 3);
        assert_eq!(tool_call.delivered, 2);
        assert_eq!(tool_call.failed, 1);
        assert_eq!(tool_call.avg_duration(), Duration::from_millis(40));
        assert!((tool_call.delivery_rate() - 0.666).abs() < 0.01);

        let tool_error = stats.event("tool_error").unwrap();
        assert_eq!(tool_error.attempted, 0);
        assert_eq!(tool_error.skipped, 1);
    }

    #[test]
    fn test_histogram_buckets() {
        let mut hist = LatencyHistogram::default();
        hist.record(Duration::from_millis(5));
        hist.record(Duration::from_millis(75));
        hist.record(Duration::from_secs(9));

        assert_eq!(hist.counts()[0], 1);
        assert_eq!(hist.counts()[2], 1);
        assert_eq!(*hist.counts().last().unwrap(), 1);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_histogram_percentiles() {
        let mut hist = LatencyHistogram::default();
        for _ in 0..100 {
            hist.record(Duration::from_millis(30));
        }
        assert_eq!(hist.p50(), Duration::from_millis(50));
        assert_eq!(hist.p99(), Duration::from_millis(50));
        assert_eq!(LatencyHistogram::default().p50(), Duration::ZERO);
    }

    #[test]
    fn test_snapshot_report_and_reset() {
        let stats = DeliveryStats::new();
        stats.record_delivered("button_click", Duration::from_millis(12));
        stats.record_failed("session_end", Duration::from_millis(5000));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_delivered(), 1);
        assert_eq!(snapshot.total_failed(), 1);

        let report = snapshot.format_report();
        assert!(report.contains("button_click"));
        assert!(report.contains("session_end"));

        stats.reset();
        assert!(stats.event("button_click").is_none());
    }
}
