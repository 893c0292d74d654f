//! Autonomy policy engine for station broadcast decisions.
//!
//! This crate provides:
//! - Typed policy documents with complete per-mode permission matrices
//! - Conflict detection over show and timeslot overrides
//! - Precedence resolution (timeslot > show > station default)
//! - A file-backed [`PolicyStore`] with backed-up writes and an NDJSON audit trail

pub mod audit;
pub mod conflicts;
pub mod resolve;
pub mod schema;
pub mod store;
pub mod validation;

pub use conflicts::detect_conflicts;
pub use resolve::resolve_effective;
pub use schema::*;
pub use store::{PolicyError, PolicySnapshot, PolicyStore};
