// Latency aggregation over a finished concurrent run

use crate::RequestOutcome;

/// Min/max/mean time to first byte, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtfbStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
}

impl TtfbStats {
    fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Some(Self {
            min_ms: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max_ms: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            avg_ms: mean(samples),
        })
    }
}

/// Latency statistics over the successful requests of a run
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    /// `None` when no successful stream produced a byte
    pub ttfb: Option<TtfbStats>,
    /// Mean completion time of the successful requests, in seconds
    pub avg_total_secs: f64,
    pub succeeded: usize,
    pub total: usize,
}

impl LatencySummary {
    /// Returns `None` when no request succeeded.
    ///
    /// Successful streams that never produced a byte count as succeeded but
    /// contribute nothing to the TTFB figures.
    pub fn from_outcomes(outcomes: &[RequestOutcome]) -> Option<Self> {
        let successes: Vec<&RequestOutcome> = outcomes.iter().filter(|o| o.is_success()).collect();
        if successes.is_empty() {
            return None;
        }

        let ttfbs: Vec<f64> = successes
            .iter()
            .filter_map(|o| o.ttfb())
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();
        let totals: Vec<f64> = successes
            .iter()
            .filter_map(|o| o.total())
            .map(|d| d.as_secs_f64())
            .collect();

        Some(Self {
            ttfb: TtfbStats::from_samples(&ttfbs),
            avg_total_secs: mean(&totals),
            succeeded: successes.len(),
            total: outcomes.len(),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
