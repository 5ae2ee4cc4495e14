use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

use crate::hash::RingHasher;

/// A member of the ring: a caller-supplied identifier and the position its
/// hash places it at.
///
/// Nodes order by position, then by identifier, so members whose positions
/// collide still sit in a fixed order no matter which was added first.
///
/// Nodes serialize for inspection but cannot be deserialized: a position is
/// only ever computed from its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    id: String,
    position: u32,
}

impl Node {
    /// Place `id` on the ring using the given hasher.
    pub fn new(id: impl Into<String>, hasher: &impl RingHasher) -> Node {
        let id = id.into();
        let position = hasher.position(id.as_bytes());
        Node { id, position }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> u32 {
        self.position
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:08x}", self.id, self.position)
    }
}

/// A serializable snapshot of ring membership. Positions are not stored since
/// they are implied by the identifiers and the hasher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Node identifiers, in ring order when produced by
    /// [`Ring::config`][crate::Ring::config].
    pub nodes: Vec<String>,
}
