//! Deterministic key-to-node assignment with consistent hashing.
//!
//! Nodes and keys are hashed onto the same 32-bit circle. A key belongs to
//! the first node found walking clockwise from the key's position, so when a
//! node leaves only its keys move (to the next node along), and when a node
//! joins it only takes keys from its clockwise neighbor.
//!
//! There is one position per node; weighting, replication and spreading
//! membership changes between processes are left to the caller.
//!
//! ```
//! use haze_ring::{Error, Ring};
//!
//! let ring = Ring::new();
//! assert_eq!(ring.get("user:42"), Err(Error::RingEmpty));
//!
//! ring.add_node("cache-1");
//! ring.add_node("cache-2");
//! let owner = ring.get("user:42")?;
//! assert!(owner == "cache-1" || owner == "cache-2");
//!
//! ring.remove_node("cache-1")?;
//! assert_eq!(ring.get("user:42")?, "cache-2");
//! # Ok::<(), Error>(())
//! ```

mod error;
pub mod hash;
mod ring;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use hash::{Crc32, RingHasher};
pub use ring::Ring;
pub use types::{Node, RingConfig};
