pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod jsonl;
pub mod time;
pub mod validation;

pub use config::Config;
pub use document::{DocumentCache, DocumentFile};
pub use error::*;
pub use events::EventLog;
pub use jsonl::{JsonlLog, TailRead};
pub use time::{ClockTime, DayOfWeek};
pub use validation::{ValidationError, ValidationResult, ValidationWarning};
