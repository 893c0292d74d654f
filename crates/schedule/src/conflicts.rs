//! Conflict detection across a schedule record set.
//!
//! Six checks run independently and their findings are merged and sorted:
//! duplicate ids, duplicate names, inverted windows, template ambiguity,
//! timeline overlap, and ambiguous dispatch.

use std::collections::BTreeMap;

use airwave_core::DayOfWeek;

use crate::recurrence::project_record;
use crate::schema::{
    ConflictSuggestion, DaySegment, ScheduleConflict, ScheduleConflictKind, ScheduleRecord,
    TimelineBlock,
};

/// Every conflict in `records`, given their projected `blocks`.
///
/// Sorted by kind, then schedule ids, then message.
pub fn detect_conflicts(records: &[ScheduleRecord], blocks: &[TimelineBlock]) -> Vec<ScheduleConflict> {
    let mut conflicts = Vec::new();
    conflicts.extend(duplicate_ids(records));
    conflicts.extend(duplicate_names(records));
    conflicts.extend(invalid_windows(records));
    conflicts.extend(template_ambiguity(records));
    conflicts.extend(timeline_overlaps(records, blocks));
    conflicts.extend(ambiguous_dispatch(records));
    conflicts.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.schedule_ids.cmp(&b.schedule_ids))
            .then_with(|| a.message.cmp(&b.message))
    });
    conflicts
}

fn duplicate_ids(records: &[ScheduleRecord]) -> Vec<ScheduleConflict> {
    let mut by_id: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *by_id.entry(record.id.as_str()).or_default() += 1;
    }

    by_id
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| ScheduleConflict {
            kind: ScheduleConflictKind::DuplicateId,
            schedule_ids: vec![id.to_string(); count],
            day_of_week: None,
            message: format!("schedule id '{id}' is used {count} times"),
            suggestions: vec![ConflictSuggestion::new(
                "rename_id",
                format!("Give each schedule a unique id; rename all but one '{id}'"),
            )],
        })
        .collect()
}

fn duplicate_names(records: &[ScheduleRecord]) -> Vec<ScheduleConflict> {
    let mut by_name: BTreeMap<String, Vec<&ScheduleRecord>> = BTreeMap::new();
    for record in records {
        let key = record.name.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        by_name.entry(key).or_default().push(record);
    }

    by_name
        .into_values()
        .filter(|group| group.len() > 1)
        .map(|group| {
            let mut ids: Vec<String> = group.iter().map(|r| r.id.clone()).collect();
            ids.sort();
            let name = group[0].name.trim();
            ScheduleConflict {
                kind: ScheduleConflictKind::DuplicateName,
                message: format!(
                    "schedule name '{}' is shared by {}",
                    name,
                    quoted(&ids)
                ),
                schedule_ids: ids,
                day_of_week: None,
                suggestions: vec![ConflictSuggestion::new(
                    "rename",
                    format!("Rename all but one schedule called '{name}'"),
                )],
            }
        })
        .collect()
}

fn invalid_windows(records: &[ScheduleRecord]) -> Vec<ScheduleConflict> {
    records
        .iter()
        .filter_map(|record| {
            let start = record.effective_start_window()?.value;
            let end = record.effective_end_window()?.value;
            (start > end).then(|| ScheduleConflict {
                kind: ScheduleConflictKind::InvalidWindow,
                schedule_ids: vec![record.id.clone()],
                day_of_week: None,
                message: format!(
                    "schedule '{}' starts at {} after it ends at {}",
                    record.id,
                    start.to_rfc3339(),
                    end.to_rfc3339()
                ),
                suggestions: vec![ConflictSuggestion::new(
                    "swap_window",
                    "Swap start_window and end_window, or move end_window after start_window",
                )],
            })
        })
        .collect()
}

fn template_ambiguity(records: &[ScheduleRecord]) -> Vec<ScheduleConflict> {
    records
        .iter()
        .filter_map(|record| {
            let fields = record.ambiguous_fields();
            if fields.is_empty() {
                return None;
            }
            Some(ScheduleConflict {
                kind: ScheduleConflictKind::TemplateAmbiguity,
                schedule_ids: vec![record.id.clone()],
                day_of_week: None,
                message: format!(
                    "schedule '{}' sets {} both at top level and in overrides",
                    record.id,
                    fields.join(", ")
                ),
                suggestions: vec![ConflictSuggestion::new(
                    "remove_top_level",
                    format!("Keep {} only inside overrides", fields.join(", ")),
                )],
            })
        })
        .collect()
}

fn timeline_overlaps(records: &[ScheduleRecord], blocks: &[TimelineBlock]) -> Vec<ScheduleConflict> {
    // Blocks projected from disabled records, removed one for one so an
    // enabled record sharing the id keeps its own blocks.
    let mut disabled: Vec<TimelineBlock> = records
        .iter()
        .filter(|r| !r.enabled)
        .filter_map(|r| project_record(r).ok())
        .flatten()
        .collect();

    let mut by_day: BTreeMap<DayOfWeek, Vec<(&str, DaySegment)>> = BTreeMap::new();
    for block in blocks {
        if let Some(pos) = disabled.iter().position(|b| b == block) {
            disabled.swap_remove(pos);
            continue;
        }
        for segment in block.segments() {
            by_day
                .entry(segment.day)
                .or_default()
                .push((block.schedule_id.as_str(), segment));
        }
    }

    // One finding per (pair, day): the earliest overlapping segments win.
    let mut found: BTreeMap<(DayOfWeek, &str, &str), (DaySegment, DaySegment)> = BTreeMap::new();
    for (day, mut segments) in by_day {
        segments.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        for (i, (left_id, left)) in segments.iter().enumerate() {
            for (right_id, right) in &segments[i + 1..] {
                if right.start >= left.end {
                    break;
                }
                if left_id == right_id || !left.overlaps(right) {
                    continue;
                }
                let (key, pair) = if left_id <= right_id {
                    ((day, *left_id, *right_id), (*left, *right))
                } else {
                    ((day, *right_id, *left_id), (*right, *left))
                };
                found.entry(key).or_insert(pair);
            }
        }
    }

    found
        .into_iter()
        .map(|((day, a, b), (seg_a, seg_b))| ScheduleConflict {
            kind: ScheduleConflictKind::Overlap,
            schedule_ids: vec![a.to_string(), b.to_string()],
            day_of_week: Some(day),
            message: format!(
                "schedules '{}' ({} {}) and '{}' ({} {}) overlap on {}",
                a,
                day.short_label(),
                seg_a.label(),
                b,
                day.short_label(),
                seg_b.label(),
                day
            ),
            suggestions: vec![
                ConflictSuggestion::new(
                    "shift_start",
                    format!("Move '{b}' to start at or after {}", end_label(&seg_a)),
                ),
                ConflictSuggestion::new(
                    "pause",
                    format!("Pause or disable one of '{a}' and '{b}'"),
                ),
            ],
        })
        .collect()
}

fn ambiguous_dispatch(records: &[ScheduleRecord]) -> Vec<ScheduleConflict> {
    let candidates: Vec<&ScheduleRecord> = records.iter().filter(|r| r.is_dispatchable()).collect();
    let mut conflicts = Vec::new();

    for (i, left) in candidates.iter().enumerate() {
        let Some(left_key) = dispatch_key(left) else {
            continue;
        };
        for right in &candidates[i + 1..] {
            if dispatch_key(right).as_ref() != Some(&left_key) {
                continue;
            }
            let (ls, le) = left.effective_window();
            let (rs, re) = right.effective_window();
            if !(ls <= re && rs <= le) {
                continue;
            }

            let (tz, priority, spec) = &left_key;
            let mut ids = vec![left.id.clone(), right.id.clone()];
            ids.sort();
            conflicts.push(ScheduleConflict {
                kind: ScheduleConflictKind::AmbiguousDispatch,
                message: format!(
                    "schedules {} share timezone {}, priority {} and spec {} with overlapping windows",
                    quoted(&ids),
                    tz,
                    priority,
                    spec
                ),
                schedule_ids: ids,
                day_of_week: None,
                suggestions: vec![
                    ConflictSuggestion::new(
                        "raise_priority",
                        format!("Raise the priority of '{}' above {}", right.id, priority),
                    ),
                    ConflictSuggestion::new(
                        "narrow_window",
                        format!(
                            "Narrow the windows of '{}' and '{}' so they do not overlap",
                            left.id, right.id
                        ),
                    ),
                ],
            });
        }
    }
    conflicts
}

/// Effective `(timezone, priority, spec)`; `None` when any is missing.
fn dispatch_key(record: &ScheduleRecord) -> Option<(String, u8, String)> {
    Some((
        record.effective_timezone()?.to_string(),
        record.effective_priority()?,
        record.effective_schedule_spec()?.to_string(),
    ))
}

fn quoted(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("'{id}'"))
        .collect::<Vec<_>>()
        .join(" and ")
}

fn end_label(segment: &DaySegment) -> String {
    segment.label().split_once('-').map(|(_, end)| end.to_string()).unwrap_or_default()
}
