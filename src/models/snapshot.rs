// Point-in-time result of one poll cycle

use std::collections::BTreeMap;

use super::{EntityGroup, MetricItem};

/// Items of every group fetched in one poll cycle. Never mutated once published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Epoch ms when the cycle completed; `None` before the first successful poll.
    pub fetched_at: Option<i64>,
    groups: BTreeMap<EntityGroup, Vec<MetricItem>>,
}

impl Snapshot {
    pub fn new(fetched_at: i64, groups: BTreeMap<EntityGroup, Vec<MetricItem>>) -> Self {
        Self {
            fetched_at: Some(fetched_at),
            groups,
        }
    }

    /// Items for `group`; empty when the group was not fetched.
    pub fn items(&self, group: EntityGroup) -> &[MetricItem] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = (EntityGroup, &[MetricItem])> {
        self.groups.iter().map(|(g, items)| (*g, items.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}
