//! Schedule document types with serde (de)serialization.
//!
//! - `ScheduleEnvelope` / `ScheduleRecord`: the persisted document
//! - `RuntimeFields`: the seven fields supplied at top level or via `overrides`
//! - `ScheduleSpec`: one-off, RRULE-subset or cron-subset recurrence
//! - `TimelineBlock` / `Timeline`: weekly projection used for conflict checks
//! - `ScheduleConflict`: conflict reports with suggestions

mod conflict;
mod record;
mod spec;
mod timeline;

pub use conflict::*;
pub use record::*;
pub use spec::*;
pub use timeline::*;

#[cfg(test)]
mod tests;
