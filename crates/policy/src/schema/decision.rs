//! Resolved decisions and the audit events recorded for them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AutonomyMode, DecisionType, PermissionMatrix};

/// Which layer of the policy produced an effective decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    StationDefault,
    ShowOverride,
    TimeslotOverride,
}

/// Mode and permissions in force for a `(show, timeslot)` scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivePolicyDecision {
    pub mode: AutonomyMode,
    pub permissions: PermissionMatrix,
    pub source: PolicySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeslot_id: Option<String>,
}

/// Who made the audited decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOrigin {
    Ai,
    Human,
}

impl FromStr for DecisionOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ai" => Ok(DecisionOrigin::Ai),
            "human" => Ok(DecisionOrigin::Human),
            _ => Err(format!("unknown decision origin: '{}' (expected ai or human)", s)),
        }
    }
}

/// Immutable audit record, one NDJSON line per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAuditEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub decision_type: DecisionType,
    pub origin: DecisionOrigin,
    pub mode: AutonomyMode,
    pub source: PolicySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeslot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
