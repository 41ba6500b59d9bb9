// Output stages for fetched items: one pipeline (items -> align/bucket -> render),
// shared by the HTTP handlers and the batch report tool.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::analysis::{self, TabularRow};
use crate::models::MetricItem;

/// JSON body of the summed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    pub values: Vec<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("error encoding values: {0}")]
    Json(#[from] serde_json::Error),
    #[error("error formatting output")]
    Format(#[from] std::fmt::Error),
}

/// Renders one metric of a set of items into a response body.
pub trait OutputStage: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn render(&self, items: &[MetricItem], metric: &str) -> Result<Vec<u8>, RenderError>;
}

/// Percentage heatmap as `group,variable,value` CSV.
pub struct HeatmapCsv;

impl OutputStage for HeatmapCsv {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn render(&self, items: &[MetricItem], metric: &str) -> Result<Vec<u8>, RenderError> {
        let heatmap = analysis::to_percentage_heatmap(items, metric);
        Ok(write_csv(&analysis::to_tabular(&heatmap)).into_bytes())
    }
}

/// Second-aligned sum as `{"values": [...]}`.
pub struct SumJson;

impl OutputStage for SumJson {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, items: &[MetricItem], metric: &str) -> Result<Vec<u8>, RenderError> {
        Ok(serde_json::to_vec(&Timeseries {
            values: analysis::sum(items, metric),
        })?)
    }
}

/// One line per item: name, sample count, min/mean/max, covered time-of-day range.
pub struct ItemSummary;

impl OutputStage for ItemSummary {
    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn render(&self, items: &[MetricItem], metric: &str) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for item in items {
            let series = item.series(metric);
            let Some((first, last)) = series.first().zip(series.last()) else {
                writeln!(out, "{}\t{}\tno samples", item.display_name(), metric)?;
                continue;
            };
            let values = series.iter().map(|s| s.value).filter(|v| v.is_finite());
            let (mut min, mut max, mut total, mut n) = (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0);
            for v in values {
                min = min.min(v);
                max = max.max(v);
                total += v;
                n += 1;
            }
            let mean = if n > 0 { total / n as f64 } else { f64::NAN };
            writeln!(
                out,
                "{}\t{}\tsamples={}\tmin={:.4}\tmean={:.4}\tmax={:.4}\t{}..{}",
                item.display_name(),
                metric,
                series.len(),
                min,
                mean,
                max,
                analysis::second_label(first.timestamp_ms),
                analysis::second_label(last.timestamp_ms),
            )?;
        }
        Ok(out.into_bytes())
    }
}

/// Output formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Heatmap,
    Sum,
    Summary,
}

impl OutputFormat {
    pub fn stage(self) -> &'static dyn OutputStage {
        match self {
            OutputFormat::Heatmap => &HeatmapCsv,
            OutputFormat::Sum => &SumJson,
            OutputFormat::Summary => &ItemSummary,
        }
    }
}

/// RFC 4180 CSV with `\n` line endings.
pub fn write_csv(rows: &[TabularRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let fields = [&row.group, &row.variable, &row.value];
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if field.contains([',', '"', '\n', '\r']) {
                out.push('"');
                out.push_str(&field.replace('"', "\"\""));
                out.push('"');
            } else {
                out.push_str(field);
            }
        }
        out.push('\n');
    }
    out
}
