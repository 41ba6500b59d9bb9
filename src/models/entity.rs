// Closed set of entity groups the poller fetches and the HTTP layer accepts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical group of entities sharing one infrastructure query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityGroup {
    Host,
    AppdataWriter,
    AppdataProcessor,
    Filler,
}

impl EntityGroup {
    pub const ALL: [EntityGroup; 4] = [
        EntityGroup::Host,
        EntityGroup::AppdataWriter,
        EntityGroup::AppdataProcessor,
        EntityGroup::Filler,
    ];

    /// Name used in `entity=` query parameters and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityGroup::Host => "host",
            EntityGroup::AppdataWriter => "appdataWriter",
            EntityGroup::AppdataProcessor => "appdataProcessor",
            EntityGroup::Filler => "filler",
        }
    }
}

impl fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entity name: {0:?}")]
pub struct InvalidEntityGroup(pub String);

impl FromStr for EntityGroup {
    type Err = InvalidEntityGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| InvalidEntityGroup(s.to_string()))
    }
}
