//! Policy document types with serde (de)serialization.
//!
//! - `AutonomyPolicy`: the persisted document
//! - `PermissionMatrix` / `ModePermissions`: fixed, complete authority tables
//! - `EffectivePolicyDecision` / `PolicyAuditEvent`: resolution output and its audit record
//! - `PolicyConflict`: contradiction reports produced by the conflict detector

mod conflict;
mod decision;
mod document;
mod mode;

pub use conflict::*;
pub use decision::*;
pub use document::*;
pub use mode::*;
