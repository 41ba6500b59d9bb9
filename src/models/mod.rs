// Domain models: metric items from the metrics source and the cached snapshot

mod entity;
mod metric;
mod snapshot;

pub use entity::{EntityGroup, InvalidEntityGroup};
pub use metric::{MetricItem, Sample, SnapshotItem, is_valid_metric_name};
pub use snapshot::Snapshot;
