//! Shape checks the type system cannot express.
//!
//! Completeness of the permission matrices is enforced by deserialization;
//! what remains here are id, uniqueness and time-window rules.

use std::collections::HashSet;

use airwave_core::ValidationResult;

use crate::schema::AutonomyPolicy;

/// Validate the shape of a policy document. Conflicts are checked separately.
pub fn validate_policy(policy: &AutonomyPolicy) -> ValidationResult {
    let mut result = ValidationResult::new();

    let mut seen_shows = HashSet::new();
    for (i, show) in policy.show_overrides.iter().enumerate() {
        let path = format!("show_overrides[{i}]");
        if show.show_id.trim().is_empty() {
            result.error(format!("{path}.show_id"), "show_id must not be empty");
        } else if !seen_shows.insert(show.show_id.as_str()) {
            result.error_with_suggestion(
                format!("{path}.show_id"),
                format!("duplicate show override for '{}'", show.show_id),
                "Merge the overrides into a single entry per show",
            );
        }
    }

    for (i, slot) in policy.timeslot_overrides.iter().enumerate() {
        let path = format!("timeslot_overrides[{i}]");
        if slot.id.trim().is_empty() {
            result.error(format!("{path}.id"), "id must not be empty");
        }
        if let Some(show_id) = &slot.show_id {
            if show_id.trim().is_empty() {
                result.error_with_suggestion(
                    format!("{path}.show_id"),
                    "show_id must not be empty",
                    "Omit show_id for a station-wide timeslot",
                );
            }
        }
        if slot.start_minute() >= slot.end_minute() {
            result.error_with_suggestion(
                format!("{path}.end_time"),
                format!(
                    "end_time {} must be after start_time {}",
                    slot.end_time, slot.start_time
                ),
                "End at 00:00 to run to midnight, or split windows that cross midnight in two",
            );
        }
        if slot.notes.as_deref().is_some_and(|n| n.trim().is_empty()) {
            result.warn(format!("{path}.notes"), "notes is present but empty");
        }
    }

    result
}
