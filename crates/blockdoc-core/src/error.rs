//! Core error types for blockdoc-core.
//!
//! Uses `thiserror` for structured, matchable error variants. The state
//! projector itself is total and never produces these; they come from
//! validating externally supplied documents and parsing block type tags.

use thiserror::Error;

/// Core errors produced by the blockdoc-core crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The block map and the ordered id list disagree.
    #[error("inconsistent document: {reason}")]
    Inconsistent { reason: String },

    /// A block type tag did not name any known block type.
    #[error("unknown block type: '{tag}'")]
    UnknownBlockType { tag: String },
}
