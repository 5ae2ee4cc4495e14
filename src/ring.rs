use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    error::{Error, Result},
    hash::{Crc32, RingHasher},
    types::{Node, RingConfig},
};

/// A consistent hash ring over a dynamic set of nodes.
///
/// Each node sits at the position its identifier hashes to, and a key belongs
/// to the first node at or after the key's own position, wrapping past the
/// highest node back to the lowest. Removing a node therefore only moves the
/// keys it owned, and they all move to its clockwise neighbor.
///
/// The ring is safe to share between threads. Lookups take a shared lock and
/// membership changes take an exclusive one, so a lookup never observes a
/// half-applied change.
#[derive(Debug)]
pub struct Ring<H = Crc32> {
    hasher: H,
    /// Sorted ascending by position, ties broken by identifier.
    members: RwLock<Vec<Node>>,
}

impl Ring {
    /// Create an empty ring using the default CRC-32 hasher.
    pub fn new() -> Ring {
        Ring::with_hasher(Crc32)
    }

    /// Create a ring holding the given node identifiers. Repeated identifiers
    /// collapse into a single member.
    pub fn from_nodes<I>(ids: I) -> Ring
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Ring::from_nodes_with_hasher(ids, Crc32)
    }

    /// Rebuild a ring from a membership snapshot taken from a CRC-32 ring.
    pub fn from_config(cf: &RingConfig) -> Ring {
        Ring::from_config_with_hasher(cf, Crc32)
    }
}

impl Default for Ring {
    fn default() -> Ring {
        Ring::new()
    }
}

impl<H: RingHasher> Ring<H> {
    /// Create an empty ring that places nodes and keys with `hasher`.
    pub fn with_hasher(hasher: H) -> Ring<H> {
        Ring {
            hasher,
            members: RwLock::new(Vec::new()),
        }
    }

    /// Create a ring holding the given node identifiers, placed with `hasher`.
    pub fn from_nodes_with_hasher<I>(ids: I, hasher: H) -> Ring<H>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let ring = Ring::with_hasher(hasher);
        ring.extend(ids);
        ring
    }

    /// Rebuild a ring from a membership snapshot. The snapshot only records
    /// identifiers, so `hasher` must be the one the original ring used or
    /// keys will land on different nodes.
    pub fn from_config_with_hasher(cf: &RingConfig, hasher: H) -> Ring<H> {
        Ring::from_nodes_with_hasher(cf.nodes.iter().cloned(), hasher)
    }

    /// The ring position a node identifier or lookup key hashes to.
    pub fn position_of(&self, key: impl AsRef<[u8]>) -> u32 {
        self.hasher.position(key.as_ref())
    }

    /// Add a node to the ring.
    ///
    /// Identifiers are unique within a ring: adding one that is already a
    /// member leaves the ring untouched and returns `false`.
    pub fn add_node(&self, id: impl Into<String>) -> bool {
        let node = Node::new(id, &self.hasher);
        let mut members = self.write();
        match members.binary_search(&node) {
            Ok(_) => {
                log::debug!("node {node} already in ring");
                false
            }
            Err(i) => {
                log::debug!("adding node {node} ({} members)", members.len() + 1);
                members.insert(i, node);
                true
            }
        }
    }

    /// Add every identifier in `ids`, skipping those already present.
    pub fn extend<I>(&self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for id in ids {
            self.add_node(id);
        }
    }

    /// Remove the node with exactly this identifier.
    pub fn remove_node(&self, id: &str) -> Result<()> {
        let position = self.position_of(id);
        let mut members = self.write();

        // Distinct identifiers can share a position, so the identifier has to
        // match too before anything is removed.
        let start = lower_bound(&members, position);
        let found = members[start..]
            .iter()
            .take_while(|n| n.position() == position)
            .position(|n| n.id() == id);

        match found {
            Some(offset) => {
                let node = members.remove(start + offset);
                log::debug!("removed node {node} ({} members)", members.len());
                Ok(())
            }
            None => Err(Error::NodeNotFound(id.to_owned())),
        }
    }

    /// Resolve a key to the identifier of the node responsible for it.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<String> {
        let target = self.position_of(key);
        let members = self.read();
        let i = lower_bound(&members, target);
        let node = members
            .get(i)
            .or_else(|| members.first())
            .ok_or(Error::RingEmpty)?;
        log::trace!("position {target:08x} -> {node}");
        Ok(node.id().to_owned())
    }

    /// Every member, walking clockwise from the key's position. The first
    /// entry is the node [`get`][Self::get] would return; the rest are
    /// fallbacks in the order they would inherit the key.
    pub fn successors(&self, key: impl AsRef<[u8]>) -> Vec<String> {
        let target = self.position_of(key);
        let members = self.read();
        let (before, after) = members.split_at(lower_bound(&members, target));
        after
            .iter()
            .chain(before)
            .map(|n| n.id().to_owned())
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        let position = self.position_of(id);
        self.read()
            .binary_search_by(|n| (n.position(), n.id()).cmp(&(position, id)))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A snapshot of the members in ring order.
    pub fn nodes(&self) -> Vec<Node> {
        self.read().clone()
    }

    /// A snapshot of the membership, suitable for storing and handing back to
    /// [`Ring::from_config_with_hasher`] along with the same hasher.
    pub fn config(&self) -> RingConfig {
        RingConfig {
            nodes: self.read().iter().map(|n| n.id().to_owned()).collect(),
        }
    }

    // Every mutation is a single Vec::insert or Vec::remove, so the member
    // list is still sorted if a holder of the lock panicked.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Node>> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Node>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H: RingHasher + Clone> Clone for Ring<H> {
    fn clone(&self) -> Ring<H> {
        Ring {
            hasher: self.hasher.clone(),
            members: RwLock::new(self.nodes()),
        }
    }
}

/// Index of the first member at or after `target`, or `members.len()` if
/// every member sits before it.
fn lower_bound(members: &[Node], target: u32) -> usize {
    members.partition_point(|n| n.position() < target)
}
