use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a meal item, unique within one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh item ids. Ids handed out are never handed out again.
pub trait IdSource {
    fn next_id(&mut self) -> ItemId;
}

/// Monotonically increasing counter.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Counter whose first id is `next`, e.g. the first free id of a
    /// loaded plan.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }
}
