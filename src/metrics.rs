//! Session statistics for the sentiment form.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept before the oldest half is dropped
const MAX_SAMPLES: usize = 10_000;

/// Counters and latencies for one form session
pub struct SessionMetrics {
    /// Total submissions handled
    pub submissions: AtomicU64,
    /// Submissions by notice kind
    by_notice: RwLock<HashMap<String, u64>>,
    /// Handling times (in microseconds)
    handling_times: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            by_notice: RwLock::new(HashMap::new()),
            handling_times: RwLock::new(Vec::with_capacity(256)),
            start_time: Instant::now(),
        }
    }

    /// Record one handled submission
    pub fn record(&self, notice_kind: &str, elapsed: Duration) {
        self.submissions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_notice) = self.by_notice.write() {
            *by_notice.entry(notice_kind.to_string()).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.handling_times.write() {
            times.push(elapsed.as_micros() as u64);
            if times.len() > MAX_SAMPLES {
                times.drain(0..MAX_SAMPLES / 2);
            }
        }
    }

    pub fn count_for(&self, notice_kind: &str) -> u64 {
        self.by_notice
            .read()
            .map(|m| m.get(notice_kind).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Handling time statistics
    pub fn latency_stats(&self) -> LatencyStats {
        let Ok(times) = self.handling_times.read() else {
            return LatencyStats::default();
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = times.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Log a summary of the session
    pub fn print_summary(&self) {
        let total = self.submissions.load(Ordering::Relaxed);
        let latency = self.latency_stats();
        let elapsed = self.start_time.elapsed();

        info!(
            submissions = total,
            session_secs = elapsed.as_secs(),
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            max_us = latency.max_us,
            "Session summary"
        );

        if let Ok(by_notice) = self.by_notice.read() {
            let mut kinds: Vec<_> = by_notice.iter().collect();
            kinds.sort();
            for (kind, count) in kinds {
                let pct = if total > 0 {
                    (*count as f64 / total as f64) * 100.0
                } else {
                    0.0
                };
                info!(
                    notice = %kind,
                    count = *count,
                    "  {:>18}: {:>5} ({:>5.1}%)",
                    kind,
                    count,
                    pct
                );
            }
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handling time statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub max_us: u64,
}
