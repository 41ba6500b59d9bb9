// Second-of-day alignment and cross-item summation

use std::collections::BTreeMap;

use chrono::NaiveTime;

use crate::models::MetricItem;

/// `HH:MM:SS` (UTC) of a sample; the date is discarded.
pub type SecondLabel = String;

const SECONDS_PER_DAY: i64 = 86_400;

/// Formats the UTC time-of-day of an epoch-millisecond timestamp as `HH:MM:SS`.
pub fn second_label(timestamp_ms: i64) -> SecondLabel {
    let secs_of_day = timestamp_ms.div_euclid(1000).rem_euclid(SECONDS_PER_DAY) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs_of_day, 0)
        .unwrap_or(NaiveTime::MIN)
        .format("%H:%M:%S")
        .to_string()
}

/// Sums `metric` across all items per second-of-day, ordered by ascending label.
///
/// Items without the metric contribute nothing. Samples landing on the same label (same second
/// in different items, or the same time-of-day on different dates) are added together.
pub fn sum(items: &[MetricItem], metric: &str) -> Vec<f64> {
    let mut series: BTreeMap<SecondLabel, f64> = BTreeMap::new();
    for item in items {
        for sample in item.series(metric) {
            *series.entry(second_label(sample.timestamp_ms)).or_default() += sample.value;
        }
    }
    series.into_values().collect()
}
