//! File-backed schedule store.
//!
//! Owns the schedule envelope on disk: migration on read, mtime-cached loads,
//! conflict-gated whole-document writes, template expansion and spec previews.

mod core;
mod error;


pub use self::core::ScheduleStore;
pub use self::error::{
    PublishSummary, Result, ScheduleError, ScheduleUiState, ScheduleValidation, TemplateApplication,
};
