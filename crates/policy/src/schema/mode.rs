//! Autonomy modes, decision types, authority levels and permission matrices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Station operating posture, ordered from least to most autonomous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomyMode {
    Manual,
    Assisted,
    Supervised,
    AutonomousWithReview,
    AutonomousGuardrailed,
}

impl AutonomyMode {
    pub const ALL: [AutonomyMode; 5] = [
        AutonomyMode::Manual,
        AutonomyMode::Assisted,
        AutonomyMode::Supervised,
        AutonomyMode::AutonomousWithReview,
        AutonomyMode::AutonomousGuardrailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AutonomyMode::Manual => "manual",
            AutonomyMode::Assisted => "assisted",
            AutonomyMode::Supervised => "supervised",
            AutonomyMode::AutonomousWithReview => "autonomous_with_review",
            AutonomyMode::AutonomousGuardrailed => "autonomous_guardrailed",
        }
    }
}

impl fmt::Display for AutonomyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutonomyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AutonomyMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown autonomy mode: '{}'", s))
    }
}

/// Kind of on-air decision whose authority the policy governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    TrackSelection,
    ScriptGeneration,
    VoicePersonaSelection,
    CallerSimulationUsage,
    BreakingNewsInterruption,
}

impl DecisionType {
    pub const ALL: [DecisionType; 5] = [
        DecisionType::TrackSelection,
        DecisionType::ScriptGeneration,
        DecisionType::VoicePersonaSelection,
        DecisionType::CallerSimulationUsage,
        DecisionType::BreakingNewsInterruption,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DecisionType::TrackSelection => "track_selection",
            DecisionType::ScriptGeneration => "script_generation",
            DecisionType::VoicePersonaSelection => "voice_persona_selection",
            DecisionType::CallerSimulationUsage => "caller_simulation_usage",
            DecisionType::BreakingNewsInterruption => "breaking_news_interruption",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DecisionType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown decision type: '{}'", s))
    }
}

/// Who holds authority over a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityLevel {
    HumanOnly,
    HumanApprovalRequired,
    AiWithHumanOverride,
    AiAutonomous,
}

/// Authority level for each of the five decision types.
///
/// A fixed struct rather than an open map: a matrix missing any decision, or
/// carrying an unknown one, fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionMatrix {
    pub track_selection: AuthorityLevel,
    pub script_generation: AuthorityLevel,
    pub voice_persona_selection: AuthorityLevel,
    pub caller_simulation_usage: AuthorityLevel,
    pub breaking_news_interruption: AuthorityLevel,
}

impl PermissionMatrix {
    /// Same authority for every decision.
    pub const fn uniform(level: AuthorityLevel) -> Self {
        Self {
            track_selection: level,
            script_generation: level,
            voice_persona_selection: level,
            caller_simulation_usage: level,
            breaking_news_interruption: level,
        }
    }

    pub fn get(&self, decision: DecisionType) -> AuthorityLevel {
        match decision {
            DecisionType::TrackSelection => self.track_selection,
            DecisionType::ScriptGeneration => self.script_generation,
            DecisionType::VoicePersonaSelection => self.voice_persona_selection,
            DecisionType::CallerSimulationUsage => self.caller_simulation_usage,
            DecisionType::BreakingNewsInterruption => self.breaking_news_interruption,
        }
    }

    pub fn set(&mut self, decision: DecisionType, level: AuthorityLevel) {
        match decision {
            DecisionType::TrackSelection => self.track_selection = level,
            DecisionType::ScriptGeneration => self.script_generation = level,
            DecisionType::VoicePersonaSelection => self.voice_persona_selection = level,
            DecisionType::CallerSimulationUsage => self.caller_simulation_usage = level,
            DecisionType::BreakingNewsInterruption => self.breaking_news_interruption = level,
        }
    }

    /// Decisions whose authority differs between `self` and `other`.
    pub fn differing_decisions(&self, other: &PermissionMatrix) -> Vec<DecisionType> {
        DecisionType::ALL
            .into_iter()
            .filter(|d| self.get(*d) != other.get(*d))
            .collect()
    }

    /// Built-in matrix for a mode; AI authority grows with the mode.
    pub fn default_for(mode: AutonomyMode) -> Self {
        use AuthorityLevel::*;
        match mode {
            AutonomyMode::Manual => Self::uniform(HumanOnly),
            AutonomyMode::Assisted => Self {
                track_selection: HumanApprovalRequired,
                script_generation: HumanApprovalRequired,
                voice_persona_selection: HumanOnly,
                caller_simulation_usage: HumanOnly,
                breaking_news_interruption: HumanOnly,
            },
            AutonomyMode::Supervised => Self {
                track_selection: AiWithHumanOverride,
                script_generation: HumanApprovalRequired,
                voice_persona_selection: HumanApprovalRequired,
                caller_simulation_usage: HumanApprovalRequired,
                breaking_news_interruption: HumanOnly,
            },
            AutonomyMode::AutonomousWithReview => Self {
                track_selection: AiAutonomous,
                script_generation: AiWithHumanOverride,
                voice_persona_selection: AiWithHumanOverride,
                caller_simulation_usage: HumanApprovalRequired,
                breaking_news_interruption: HumanApprovalRequired,
            },
            AutonomyMode::AutonomousGuardrailed => Self {
                track_selection: AiAutonomous,
                script_generation: AiAutonomous,
                voice_persona_selection: AiAutonomous,
                caller_simulation_usage: AiWithHumanOverride,
                breaking_news_interruption: HumanApprovalRequired,
            },
        }
    }
}

/// One permission matrix per autonomy mode, all five required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModePermissions {
    pub manual: PermissionMatrix,
    pub assisted: PermissionMatrix,
    pub supervised: PermissionMatrix,
    pub autonomous_with_review: PermissionMatrix,
    pub autonomous_guardrailed: PermissionMatrix,
}

impl ModePermissions {
    pub fn get(&self, mode: AutonomyMode) -> &PermissionMatrix {
        match mode {
            AutonomyMode::Manual => &self.manual,
            AutonomyMode::Assisted => &self.assisted,
            AutonomyMode::Supervised => &self.supervised,
            AutonomyMode::AutonomousWithReview => &self.autonomous_with_review,
            AutonomyMode::AutonomousGuardrailed => &self.autonomous_guardrailed,
        }
    }

    pub fn get_mut(&mut self, mode: AutonomyMode) -> &mut PermissionMatrix {
        match mode {
            AutonomyMode::Manual => &mut self.manual,
            AutonomyMode::Assisted => &mut self.assisted,
            AutonomyMode::Supervised => &mut self.supervised,
            AutonomyMode::AutonomousWithReview => &mut self.autonomous_with_review,
            AutonomyMode::AutonomousGuardrailed => &mut self.autonomous_guardrailed,
        }
    }
}

impl Default for ModePermissions {
    fn default() -> Self {
        Self {
            manual: PermissionMatrix::default_for(AutonomyMode::Manual),
            assisted: PermissionMatrix::default_for(AutonomyMode::Assisted),
            supervised: PermissionMatrix::default_for(AutonomyMode::Supervised),
            autonomous_with_review: PermissionMatrix::default_for(AutonomyMode::AutonomousWithReview),
            autonomous_guardrailed: PermissionMatrix::default_for(AutonomyMode::AutonomousGuardrailed),
        }
    }
}
