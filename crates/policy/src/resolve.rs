//! Precedence resolution: timeslot override, then show override, then station default.

use crate::schema::{AutonomyPolicy, EffectivePolicyDecision, OverrideScope, PolicySource};

/// Mode and permissions in force for the given scope.
///
/// A timeslot matched by id wins; otherwise a show matched by show id; otherwise
/// the station default. Unknown ids fall through to the next layer. A matching
/// override uses its own matrix when it has one, else the mode's matrix.
pub fn resolve_effective(
    policy: &AutonomyPolicy,
    show_id: Option<&str>,
    timeslot_id: Option<&str>,
) -> EffectivePolicyDecision {
    if let Some(slot) = timeslot_id.and_then(|id| policy.timeslot_override(id)) {
        return EffectivePolicyDecision {
            mode: slot.mode,
            permissions: slot.effective_permissions(policy),
            source: PolicySource::TimeslotOverride,
            show_id: show_id.map(str::to_string).or_else(|| slot.show_id.clone()),
            timeslot_id: Some(slot.id.clone()),
        };
    }

    if let Some(show) = show_id.and_then(|id| policy.show_override(id)) {
        return EffectivePolicyDecision {
            mode: show.mode,
            permissions: show.effective_permissions(policy),
            source: PolicySource::ShowOverride,
            show_id: Some(show.show_id.clone()),
            timeslot_id: None,
        };
    }

    let mode = policy.station_default_mode;
    EffectivePolicyDecision {
        mode,
        permissions: *policy.mode_matrix(mode),
        source: PolicySource::StationDefault,
        show_id: show_id.map(str::to_string),
        timeslot_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        AuthorityLevel, AutonomyMode, DecisionType, PermissionMatrix, ShowOverride,
        TimeslotOverride,
    };
    use airwave_core::DayOfWeek;

    fn policy() -> AutonomyPolicy {
        let mut policy = AutonomyPolicy::defaults();
        policy.show_overrides.push(ShowOverride {
            show_id: "overnight".into(),
            mode: AutonomyMode::AutonomousGuardrailed,
            permissions: None,
            notes: None,
        });
        let mut matrix = PermissionMatrix::uniform(AuthorityLevel::HumanApprovalRequired);
        matrix.set(DecisionType::TrackSelection, AuthorityLevel::AiAutonomous);
        policy.timeslot_overrides.push(TimeslotOverride {
            id: "overnight-news".into(),
            day_of_week: DayOfWeek::Monday,
            start_time: "02:00".parse().unwrap(),
            end_time: "02:30".parse().unwrap(),
            show_id: Some("overnight".into()),
            mode: AutonomyMode::Supervised,
            permissions: Some(matrix),
            notes: None,
        });
        policy
    }

    #[test]
    fn timeslot_wins_with_own_matrix() {
        let decision = resolve_effective(&policy(), Some("overnight"), Some("overnight-news"));
        assert_eq!(decision.source, PolicySource::TimeslotOverride);
        assert_eq!(decision.mode, AutonomyMode::Supervised);
        assert_eq!(decision.permissions.track_selection, AuthorityLevel::AiAutonomous);
        assert_eq!(
            decision.permissions.script_generation,
            AuthorityLevel::HumanApprovalRequired
        );
    }

    #[test]
    fn show_override_uses_mode_matrix() {
        let policy = policy();
        let decision = resolve_effective(&policy, Some("overnight"), None);
        assert_eq!(decision.source, PolicySource::ShowOverride);
        assert_eq!(
            decision.permissions,
            *policy.mode_matrix(AutonomyMode::AutonomousGuardrailed)
        );
    }

    #[test]
    fn unknown_ids_fall_through() {
        let policy = policy();
        let decision = resolve_effective(&policy, Some("overnight"), Some("no-such-slot"));
        assert_eq!(decision.source, PolicySource::ShowOverride);

        let decision = resolve_effective(&policy, Some("no-such-show"), None);
        assert_eq!(decision.source, PolicySource::StationDefault);
        assert_eq!(decision.mode, AutonomyMode::Assisted);
    }

    #[test]
    fn neither_resolves_station_default() {
        let decision = resolve_effective(&policy(), None, None);
        assert_eq!(decision.source, PolicySource::StationDefault);
        assert!(decision.show_id.is_none());
        assert!(decision.timeslot_id.is_none());
    }
}
