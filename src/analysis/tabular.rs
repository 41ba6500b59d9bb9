// Dense (label, bucket, count) rows for grid rendering

use serde::Serialize;

use super::heatmap::{PERCENT_BUCKETS, PercentageHeatmap};

/// One CSV row: time-of-day group, bucket label, count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularRow {
    pub group: String,
    pub variable: String,
    pub value: String,
}

impl TabularRow {
    pub fn header() -> Self {
        Self::new("group", "variable", "value")
    }

    pub fn new(
        group: impl Into<String>,
        variable: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            variable: variable.into(),
            value: value.into(),
        }
    }
}

/// `"0%"`, `"5%"`, ..., `"100%"`.
pub fn bucket_label(index: usize) -> String {
    if index == 0 {
        "0%".to_string()
    } else {
        format!("{}%", index * 100 / (PERCENT_BUCKETS - 1))
    }
}

/// Header row, then all 21 buckets (zero counts included) for each label in ascending order.
pub fn to_tabular(heatmap: &PercentageHeatmap) -> Vec<TabularRow> {
    let mut rows = Vec::with_capacity(1 + heatmap.len() * PERCENT_BUCKETS);
    rows.push(TabularRow::header());
    for (label, counts) in heatmap {
        for (i, count) in counts.iter().enumerate() {
            rows.push(TabularRow::new(label.as_str(), bucket_label(i), count.to_string()));
        }
    }
    rows
}
