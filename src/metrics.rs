//! Assessment throughput, latency and risk distribution tracking.

use crate::types::RiskLevel;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the scoring service
pub struct AssessmentMetrics {
    /// Total assessments scored
    pub assessments_scored: AtomicU64,
    /// Requests rejected as invalid input
    pub rejected_inputs: AtomicU64,
    /// Assessments by risk level
    by_level: RwLock<HashMap<RiskLevel, u64>>,
    /// Scoring times (in microseconds)
    scoring_times: RwLock<Vec<u64>>,
    /// Malignant probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl AssessmentMetrics {
    pub fn new() -> Self {
        Self {
            assessments_scored: AtomicU64::new(0),
            rejected_inputs: AtomicU64::new(0),
            by_level: RwLock::new(HashMap::new()),
            scoring_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored assessment
    pub fn record_assessment(&self, scoring_time: Duration, probability: f64, level: RiskLevel) {
        self.assessments_scored.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.scoring_times.write() {
            times.push(scoring_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_level) = self.by_level.write() {
            *by_level.entry(level).or_insert(0) += 1;
        }
    }

    /// Record a request rejected before scoring
    pub fn record_rejection(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get scoring time statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted: Vec<u64> = match self.scoring_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return LatencyStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted.last().copied().unwrap_or(0),
        }
    }

    /// Assessments per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.assessments_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or_default()
    }

    pub fn get_count(&self, level: RiskLevel) -> u64 {
        self.by_level
            .read()
            .ok()
            .and_then(|by_level| by_level.get(&level).copied())
            .unwrap_or(0)
    }

    /// Point-in-time copy for the metrics endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            assessments_scored: self.assessments_scored.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            low: self.get_count(RiskLevel::Low),
            moderate: self.get_count(RiskLevel::Moderate),
            high: self.get_count(RiskLevel::High),
            throughput: self.get_throughput(),
            latency: self.get_latency_stats(),
            probability_distribution: self.get_probability_distribution(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let total = snapshot.assessments_scored;
        let pct = |n: u64| {
            if total > 0 {
                (n as f64 / total as f64) * 100.0
            } else {
                0.0
            }
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║          RISK ASSESSMENT SERVICE - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Assessments Scored: {:>8}  │  Throughput: {:>8.2} req/s ║",
            total, snapshot.throughput
        );
        info!(
            "║ Rejected Inputs:    {:>8}                                  ║",
            snapshot.rejected_inputs
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Scoring Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}  ║",
            snapshot.latency.mean_us,
            snapshot.latency.p50_us,
            snapshot.latency.p95_us,
            snapshot.latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Assessments by Risk Level:                                   ║");
        for (level, count) in [
            (RiskLevel::Low, snapshot.low),
            (RiskLevel::Moderate, snapshot.moderate),
            (RiskLevel::High, snapshot.high),
        ] {
            info!(
                "║   {:14}: {:>6} ({:>5.1}%)                             ║",
                level.label(),
                count,
                pct(count)
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Malignant Probability Distribution:                          ║");
        for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
            let bar_len = (pct(count) / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct(count),
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for AssessmentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub assessments_scored: u64,
    pub rejected_inputs: u64,
    pub low: u64,
    pub moderate: u64,
    pub high: u64,
    pub throughput: f64,
    pub latency: LatencyStats,
    pub probability_distribution: [u64; 10],
}

/// Prints a summary every `interval_secs`
pub struct MetricsReporter {
    metrics: Arc<AssessmentMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<AssessmentMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // first tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = AssessmentMetrics::new();

        metrics.record_assessment(Duration::from_micros(100), 0.05, RiskLevel::Low);
        metrics.record_assessment(Duration::from_micros(200), 0.95, RiskLevel::High);
        metrics.record_assessment(Duration::from_micros(300), 1.0, RiskLevel::High);
        metrics.record_rejection();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.assessments_scored, 3);
        assert_eq!(snapshot.rejected_inputs, 1);
        assert_eq!(snapshot.low, 1);
        assert_eq!(snapshot.moderate, 0);
        assert_eq!(snapshot.high, 2);
        assert_eq!(snapshot.probability_distribution[0], 1);
        assert_eq!(snapshot.probability_distribution[9], 2);
    }

    #[test]
    fn test_latency_stats() {
        let metrics = AssessmentMetrics::new();
        assert_eq!(metrics.get_latency_stats().count, 0);

        for us in [100, 200, 300, 400] {
            metrics.record_assessment(Duration::from_micros(us), 0.5, RiskLevel::Moderate);
        }

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }
}
