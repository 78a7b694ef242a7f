pub mod report;

/// Aggregate view of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    pub total: u64,
    pub ok: u64,
    pub failed: u64,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    /// Population standard deviation.
    pub stdev: f64,
}

impl Statistics {
    /// Compute statistics over successful round-trip times (milliseconds).
    /// Latency figures are all zero when there are no times.
    pub fn from_times(times: &[f64], failed: u64) -> Statistics {
        let ok = times.len() as u64;
        let mut stats = Statistics {
            total: ok + failed,
            ok,
            failed,
            ..Default::default()
        };
        if times.is_empty() {
            return stats;
        }

        let n = times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = times.iter().sum::<f64>() / n;
        let variance = times.iter().map(|t| (t - avg).powi(2)).sum::<f64>() / n;

        stats.min = min;
        // summation rounding can push the mean a hair outside [min, max]
        stats.avg = avg.clamp(min, max);
        stats.max = max;
        stats.stdev = variance.sqrt();
        stats
    }
}
