//! Durable recovery storage for the block editor.
//!
//! Provides the [`RecoveryStore`] trait, a local-storage style string
//! key/value contract, plus the [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends. The live document is mirrored under
//! [`RECOVERY_KEY`] as a JSON [`RecoveryRecord`].
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: RecoveryRecord and the well-known key
//! - [`traits`]: RecoveryStore trait definition
//! - [`codec`]: record encoding and structural validation
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema and migration setup
//! - [`sqlite`]: SqliteStore implementation

pub mod codec;
pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use codec::{decode_record, encode_record};
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::RecoveryStore;
pub use types::{RecoveryRecord, RECOVERY_KEY};
