//! Conflict detection over show and timeslot overrides.
//!
//! Three independent checks run on every policy and their findings are merged:
//! duplicate timeslot ids, overlapping timeslots within one scope, and
//! timeslot overrides that contradict the show override they name.

use std::collections::BTreeMap;

use airwave_core::DayOfWeek;

use crate::schema::{
    AutonomyPolicy, OverrideScope, PolicyConflict, PolicyConflictKind, TimeslotOverride,
};

/// Every contradiction in `policy`, sorted by kind then override ids.
pub fn detect_conflicts(policy: &AutonomyPolicy) -> Vec<PolicyConflict> {
    let mut conflicts = Vec::new();
    conflicts.extend(duplicate_ids(&policy.timeslot_overrides));
    conflicts.extend(overlapping_slots(&policy.timeslot_overrides));
    conflicts.extend(intent_conflicts(policy));
    conflicts.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.override_ids.cmp(&b.override_ids))
            .then_with(|| a.message.cmp(&b.message))
    });
    conflicts
}

fn duplicate_ids(slots: &[TimeslotOverride]) -> Vec<PolicyConflict> {
    let mut by_id: BTreeMap<&str, Vec<&TimeslotOverride>> = BTreeMap::new();
    for slot in slots {
        by_id.entry(slot.id.as_str()).or_default().push(slot);
    }

    by_id
        .into_iter()
        .filter(|(_, occurrences)| occurrences.len() > 1)
        .map(|(id, occurrences)| {
            let places: Vec<String> = occurrences
                .iter()
                .map(|s| format!("{} {}", s.day_of_week, s.time_range()))
                .collect();
            PolicyConflict {
                kind: PolicyConflictKind::DuplicateTimeslotOverrideId,
                override_ids: vec![id.to_string(); occurrences.len()],
                day_of_week: None,
                time_range: None,
                show_id: None,
                message: format!(
                    "timeslot override id '{}' is used {} times ({})",
                    id,
                    occurrences.len(),
                    places.join(", ")
                ),
                suggested_resolution: format!(
                    "Give each timeslot override a unique id; rename all but one '{}'",
                    id
                ),
            }
        })
        .collect()
}

fn overlapping_slots(slots: &[TimeslotOverride]) -> Vec<PolicyConflict> {
    let mut groups: BTreeMap<(DayOfWeek, Option<&str>), Vec<&TimeslotOverride>> = BTreeMap::new();
    for slot in slots {
        groups
            .entry((slot.day_of_week, slot.show_id.as_deref()))
            .or_default()
            .push(slot);
    }

    let mut conflicts = Vec::new();
    for ((day, show_id), mut group) in groups {
        group.sort_by(|a, b| {
            a.start_minute()
                .cmp(&b.start_minute())
                .then_with(|| a.end_minute().cmp(&b.end_minute()))
                .then_with(|| a.id.cmp(&b.id))
        });

        for (i, left) in group.iter().enumerate() {
            for right in &group[i + 1..] {
                // Sorted by start: nothing further right can overlap `left`.
                if right.start_minute() >= left.end_minute() {
                    break;
                }
                if !(left.start_minute() < right.end_minute() && right.start_minute() < left.end_minute()) {
                    continue;
                }
                let overlap_end = if left.end_minute() <= right.end_minute() {
                    left.end_time
                } else {
                    right.end_time
                };
                let scope = show_id
                    .map(|s| format!("show '{}'", s))
                    .unwrap_or_else(|| "station-wide".to_string());
                conflicts.push(PolicyConflict {
                    kind: PolicyConflictKind::OverlappingTimeslotOverrides,
                    override_ids: vec![left.id.clone(), right.id.clone()],
                    day_of_week: Some(day),
                    time_range: Some(format!("{}-{}", right.start_time, overlap_end)),
                    show_id: show_id.map(str::to_string),
                    message: format!(
                        "timeslot overrides '{}' ({}) and '{}' ({}) overlap on {} ({})",
                        left.id,
                        left.time_range(),
                        right.id,
                        right.time_range(),
                        day,
                        scope
                    ),
                    suggested_resolution: format!(
                        "Adjust '{}' to start at or after {} or shorten '{}' to end by {}",
                        right.id, left.end_time, left.id, right.start_time
                    ),
                });
            }
        }
    }
    conflicts
}

fn intent_conflicts(policy: &AutonomyPolicy) -> Vec<PolicyConflict> {
    let mut conflicts = Vec::new();
    for slot in &policy.timeslot_overrides {
        let Some(show_id) = slot.show_id.as_deref() else {
            continue;
        };
        let Some(show) = policy.show_override(show_id) else {
            continue;
        };

        let slot_matrix = slot.effective_permissions(policy);
        let show_matrix = show.effective_permissions(policy);
        let differing = slot_matrix.differing_decisions(&show_matrix);
        if slot.mode == show.mode && differing.is_empty() {
            continue;
        }

        let mut details = Vec::new();
        if slot.mode != show.mode {
            details.push(format!("mode {} vs {}", slot.mode, show.mode));
        }
        if !differing.is_empty() {
            let names: Vec<&str> = differing.iter().map(|d| d.as_str()).collect();
            details.push(format!("authority differs for {}", names.join(", ")));
        }

        conflicts.push(PolicyConflict {
            kind: PolicyConflictKind::ShowTimeslotIntentConflict,
            override_ids: vec![slot.id.clone(), show_id.to_string()],
            day_of_week: Some(slot.day_of_week),
            time_range: Some(slot.time_range()),
            show_id: Some(show_id.to_string()),
            message: format!(
                "timeslot override '{}' contradicts show override '{}': {}",
                slot.id,
                show_id,
                details.join("; ")
            ),
            suggested_resolution: format!(
                "Align timeslot '{}' with show '{}' (mode {}) or drop its show_id to make it station-wide",
                slot.id, show_id, show.mode
            ),
        });
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AuthorityLevel, AutonomyMode, DecisionType, PermissionMatrix, ShowOverride};
    use airwave_core::ClockTime;

    fn slot(id: &str, day: DayOfWeek, start: &str, end: &str, show: Option<&str>) -> TimeslotOverride {
        TimeslotOverride {
            id: id.to_string(),
            day_of_week: day,
            start_time: start.parse::<ClockTime>().unwrap(),
            end_time: end.parse::<ClockTime>().unwrap(),
            show_id: show.map(str::to_string),
            mode: AutonomyMode::Supervised,
            permissions: None,
            notes: None,
        }
    }

    fn policy_with(slots: Vec<TimeslotOverride>) -> AutonomyPolicy {
        let mut policy = AutonomyPolicy::defaults();
        policy.timeslot_overrides = slots;
        policy
    }

    #[test]
    fn overlapping_slots_flagged_once() {
        let policy = policy_with(vec![
            slot("b", DayOfWeek::Monday, "10:00", "11:00", Some("news")),
            slot("a", DayOfWeek::Monday, "09:00", "10:30", Some("news")),
        ]);
        let conflicts = detect_conflicts(&policy);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.kind, PolicyConflictKind::OverlappingTimeslotOverrides);
        assert_eq!(c.override_ids, vec!["a", "b"]);
        assert_eq!(c.day_of_week, Some(DayOfWeek::Monday));
        assert_eq!(c.time_range.as_deref(), Some("10:00-10:30"));
    }

    #[test]
    fn slot_ending_at_midnight_overlaps_late_slot() {
        let policy = policy_with(vec![
            slot("late", DayOfWeek::Friday, "22:00", "00:00", None),
            slot("news", DayOfWeek::Friday, "23:00", "23:30", None),
            slot("early", DayOfWeek::Friday, "00:00", "01:00", None),
        ]);
        let conflicts = detect_conflicts(&policy);
        assert_eq!(conflicts.len(), 1, "{conflicts:?}");
        assert_eq!(conflicts[0].override_ids, vec!["late", "news"]);
        assert_eq!(conflicts[0].time_range.as_deref(), Some("23:00-23:30"));
    }

    #[test]
    fn adjacent_slots_are_not_conflicts() {
        let policy = policy_with(vec![
            slot("a", DayOfWeek::Monday, "09:00", "10:00", None),
            slot("b", DayOfWeek::Monday, "10:00", "11:00", None),
        ]);
        assert!(detect_conflicts(&policy).is_empty());
    }

    #[test]
    fn overlap_is_order_insensitive() {
        let forward = policy_with(vec![
            slot("a", DayOfWeek::Tuesday, "09:00", "12:00", None),
            slot("b", DayOfWeek::Tuesday, "11:00", "13:00", None),
        ]);
        let mut reversed = forward.clone();
        reversed.timeslot_overrides.reverse();
        assert_eq!(detect_conflicts(&forward), detect_conflicts(&reversed));
    }

    #[test]
    fn different_scopes_do_not_overlap() {
        let policy = policy_with(vec![
            slot("a", DayOfWeek::Monday, "09:00", "11:00", None),
            slot("b", DayOfWeek::Monday, "09:00", "11:00", Some("news")),
            slot("c", DayOfWeek::Tuesday, "09:00", "11:00", None),
        ]);
        assert!(detect_conflicts(&policy).is_empty());
    }

    #[test]
    fn contained_slot_overlaps_every_container() {
        let policy = policy_with(vec![
            slot("outer", DayOfWeek::Sunday, "06:00", "12:00", None),
            slot("first", DayOfWeek::Sunday, "07:00", "08:00", None),
            slot("second", DayOfWeek::Sunday, "09:00", "10:00", None),
        ]);
        let conflicts = detect_conflicts(&policy);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.override_ids[0] == "outer"));
    }

    #[test]
    fn duplicate_id_lists_every_occurrence() {
        let policy = policy_with(vec![
            slot("slot-1", DayOfWeek::Monday, "09:00", "10:00", None),
            slot("slot-1", DayOfWeek::Wednesday, "09:00", "10:00", None),
        ]);
        let conflicts = detect_conflicts(&policy);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, PolicyConflictKind::DuplicateTimeslotOverrideId);
        assert_eq!(conflicts[0].override_ids, vec!["slot-1", "slot-1"]);
        assert!(conflicts[0].message.contains("monday"));
        assert!(conflicts[0].message.contains("wednesday"));
    }

    #[test]
    fn intent_conflict_on_mode_mismatch() {
        let mut policy = policy_with(vec![slot("drive", DayOfWeek::Friday, "16:00", "18:00", Some("drive-time"))]);
        policy.show_overrides.push(ShowOverride {
            show_id: "drive-time".into(),
            mode: AutonomyMode::Manual,
            permissions: None,
            notes: None,
        });
        let conflicts = detect_conflicts(&policy);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, PolicyConflictKind::ShowTimeslotIntentConflict);
        assert_eq!(conflicts[0].override_ids, vec!["drive", "drive-time"]);
        assert!(conflicts[0].message.contains("mode supervised vs manual"));
    }

    #[test]
    fn intent_conflict_on_matrix_mismatch() {
        let mut policy = policy_with(vec![slot("drive", DayOfWeek::Friday, "16:00", "18:00", Some("drive-time"))]);
        let mut matrix = PermissionMatrix::default_for(AutonomyMode::Supervised);
        matrix.set(DecisionType::ScriptGeneration, AuthorityLevel::AiAutonomous);
        policy.show_overrides.push(ShowOverride {
            show_id: "drive-time".into(),
            mode: AutonomyMode::Supervised,
            permissions: Some(matrix),
            notes: None,
        });
        let conflicts = detect_conflicts(&policy);
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].message.contains("script_generation"));
    }

    #[test]
    fn matching_intent_is_not_a_conflict() {
        let mut policy = policy_with(vec![slot("drive", DayOfWeek::Friday, "16:00", "18:00", Some("drive-time"))]);
        policy.show_overrides.push(ShowOverride {
            show_id: "drive-time".into(),
            mode: AutonomyMode::Supervised,
            permissions: Some(PermissionMatrix::default_for(AutonomyMode::Supervised)),
            notes: None,
        });
        assert!(detect_conflicts(&policy).is_empty());
    }
}
