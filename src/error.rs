/// Errors returned by ring operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The identifier passed to [`Ring::remove_node`][crate::Ring::remove_node]
    /// is not a member of the ring.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A lookup was made against a ring with no members.
    #[error("ring is empty")]
    RingEmpty,
}

pub type Result<T> = std::result::Result<T, Error>;
