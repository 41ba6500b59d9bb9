// Per-second histogram of normalized values in 5% steps

use std::collections::BTreeMap;

use super::align::{SecondLabel, second_label};
use crate::models::MetricItem;

/// Buckets 0%, 5%, ..., 100%.
pub const PERCENT_BUCKETS: usize = 21;

/// Sample counts per bucket, keyed by second-of-day.
pub type PercentageHeatmap = BTreeMap<SecondLabel, [u32; PERCENT_BUCKETS]>;

/// Bucket for a value normalized to `[0, 1]`.
///
/// Index 0 holds exact zeros only: any positive value that would floor to 0 goes to bucket 1.
/// Values at or above 1.0 saturate into the last bucket; negatives and NaN land in bucket 0.
pub fn bucket_index(value: f64) -> usize {
    let scaled = (value * PERCENT_BUCKETS as f64).floor();
    let idx = if scaled.is_nan() || scaled < 0.0 {
        0
    } else if scaled >= (PERCENT_BUCKETS - 1) as f64 {
        PERCENT_BUCKETS - 1
    } else {
        scaled as usize
    };
    if idx == 0 && value > 0.0 { 1 } else { idx }
}

/// Builds the histogram of `metric` across all items.
pub fn to_percentage_heatmap(items: &[MetricItem], metric: &str) -> PercentageHeatmap {
    let mut heatmap = PercentageHeatmap::new();
    for item in items {
        for sample in item.series(metric) {
            let hist = heatmap
                .entry(second_label(sample.timestamp_ms))
                .or_insert([0; PERCENT_BUCKETS]);
            hist[bucket_index(sample.value)] += 1;
        }
    }
    heatmap
}
