//! File-backed policy store.
//!
//! Owns the on-disk autonomy policy: mtime-cached reads, validated whole-document
//! writes with a backup taken first, precedence resolution and the audit trail.

mod core;
mod error;


pub use self::core::PolicyStore;
pub use self::error::{PolicyError, PolicySnapshot, Result};
