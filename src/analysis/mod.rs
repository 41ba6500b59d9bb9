// Pure, synchronous views over fetched metric items.
// Both views key samples by UTC time-of-day, so series from different dates line up.

mod align;
mod heatmap;
mod tabular;

pub use align::{SecondLabel, second_label, sum};
pub use heatmap::{PERCENT_BUCKETS, PercentageHeatmap, bucket_index, to_percentage_heatmap};
pub use tabular::{TabularRow, bucket_label, to_tabular};
