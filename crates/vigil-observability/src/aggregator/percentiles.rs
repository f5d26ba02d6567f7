use vigil_core::models::LatencyPercentiles;

/// Percentiles over an unsorted sample. Sorts in place.
pub fn summarize(latencies: &mut [u64]) -> LatencyPercentiles {
    if latencies.is_empty() {
        return LatencyPercentiles::default();
    }
    latencies.sort_unstable();
    LatencyPercentiles {
        count: latencies.len() as u64,
        p50_ms: at(latencies, 0.50),
        p95_ms: at(latencies, 0.95),
        p99_ms: at(latencies, 0.99),
        max_ms: latencies[latencies.len() - 1],
    }
}

/// Value at percentile `p` (0.0–1.0) of a sorted, non-empty slice.
fn at(sorted: &[u64], p: f64) -> u64 {
    let idx = ((p * (sorted.len() - 1) as f64).round() as usize).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_fills_every_percentile() {
        let p = summarize(&mut [42]);
        assert_eq!((p.p50_ms, p.p95_ms, p.p99_ms, p.max_ms), (42, 42, 42, 42));
    }

    #[test]
    fn hundred_samples() {
        let mut v: Vec<u64> = (1..=100).rev().collect();
        let p = summarize(&mut v);
        assert_eq!(p.count, 100);
        assert_eq!(p.p50_ms, 51);
        assert_eq!(p.p95_ms, 95);
        assert_eq!(p.p99_ms, 99);
        assert_eq!(p.max_ms, 100);
    }
}
