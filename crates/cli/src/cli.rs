use std::path::PathBuf;

use airwave_core::{ClockTime, DayOfWeek};
use airwave_policy::{DecisionOrigin, DecisionType};
use airwave_schedule::TemplateKind;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// Autonomy policy and schedule engine for station automation.
///
/// Every command prints pretty JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "airwave", about = "Autonomy policy and schedule engine for station automation")]
pub struct CliArgs {
    /// Directory holding the policy, schedules and logs. Replaces
    /// AIRWAVE_CONFIG_DIR; explicit AIRWAVE_*_PATH variables still apply
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Configuration profile (prefix for profiled env vars, e.g. PROD)
    #[arg(long, env = "AIRWAVE_PROFILE", global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Autonomy policy document, resolution and audit trail
    #[command(subcommand)]
    Policy(PolicyCommand),

    /// Schedule records, timeline and conflicts
    #[command(subcommand)]
    Schedule(ScheduleCommand),
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// Print the current policy (defaults if the stored one conflicts)
    Get,

    /// Replace the policy with the JSON document in FILE (updated_at may be omitted)
    Put { file: PathBuf },

    /// Effective mode and permissions for a show and/or timeslot
    Resolve {
        #[arg(long)]
        show: Option<String>,
        #[arg(long)]
        timeslot: Option<String>,
    },

    #[command(subcommand)]
    Audit(AuditCommand),
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Append an audit event for a decision
    Record {
        /// track_selection, script_generation, voice_persona_selection, ...
        #[arg(long)]
        decision: DecisionType,
        /// ai or human
        #[arg(long)]
        origin: DecisionOrigin,
        #[arg(long)]
        show: Option<String>,
        #[arg(long)]
        timeslot: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Most recent audit events, oldest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Stored schedules with timeline and conflicts
    State,

    /// Replace the stored schedules with the records in FILE
    Put { file: PathBuf },

    /// Check the records in FILE without saving
    Validate { file: PathBuf },

    /// Save the records in FILE and report what was published
    Publish { file: PathBuf },

    /// Expand a built-in template (weekday, weekend, overnight)
    Template {
        kind: TemplateKind,
        #[arg(long)]
        timezone: String,
        /// Content reference; repeat for several
        #[arg(long = "content-ref")]
        content_refs: Vec<String>,
        /// RFC 3339 start of the activity window
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// RFC 3339 end of the activity window
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },

    /// Render one slot as one-off, RRULE and cron specs
    Preview {
        #[arg(long)]
        day: DayOfWeek,
        /// HH:MM
        #[arg(long)]
        time: ClockTime,
        #[arg(long, default_value = "UTC")]
        timezone: String,
        /// YYYY-MM-DD; defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
}
