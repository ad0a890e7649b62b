//! Stable ID newtypes for document entities.
//!
//! All IDs are distinct newtype wrappers over `String`, providing type safety
//! so that a `BlockId` cannot be accidentally used where an `ActionId` is
//! expected. They serialize transparently as plain JSON strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque block identifier. Immutable for the lifetime of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

/// Identifier of one recorded action in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

/// Identifier of a captured snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub String);

/// Anchor used by snapshots captured before any action was recorded.
const INITIAL_ANCHOR: &str = "initial";

impl BlockId {
    /// Generates a fresh random block id.
    pub fn new() -> Self {
        BlockId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionId {
    /// Generates a fresh random action id.
    pub fn new() -> Self {
        ActionId(Uuid::new_v4().to_string())
    }

    /// The sentinel anchor for "no action recorded yet".
    pub fn initial() -> Self {
        ActionId(INITIAL_ANCHOR.to_string())
    }

    pub fn is_initial(&self) -> bool {
        self.0 == INITIAL_ANCHOR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotId {
    /// Generates a fresh random snapshot id.
    pub fn new() -> Self {
        SnapshotId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

// Display implementations -- just print the inner value.

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        BlockId(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        BlockId(s)
    }
}

impl From<&str> for SnapshotId {
    fn from(s: &str) -> Self {
        SnapshotId(s.to_string())
    }
}
