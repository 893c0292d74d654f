//! Schedule conflict and recurrence engine.
//!
//! This crate provides:
//! - Typed schedule records (standalone or template + overrides) in a versioned envelope
//! - Projection of one-off, weekly RRULE and cron specs onto a weekly timeline
//! - Conflict detection with actionable suggestions
//! - A file-backed [`ScheduleStore`] that migrates legacy documents and refuses
//!   writes with hard conflicts

pub mod conflicts;
pub mod migrate;
pub mod preview;
pub mod recurrence;
pub mod schema;
pub mod store;
pub mod templates;
pub mod validation;

pub use conflicts::detect_conflicts;
pub use preview::{PreviewRequest, SpecPreview};
pub use recurrence::build_timeline;
pub use schema::*;
pub use store::{ScheduleError, ScheduleStore};
pub use templates::{TemplateKind, TemplateRequest};
