use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled var through `lookup`: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_lookup(lookup: &dyn Fn(&str) -> Option<String>, profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed) {
            return Some(v);
        }
    }
    lookup(key)
}

fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    profiled_lookup(&env_opt, profile, key)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}


// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub paths: PathsConfig,
    pub audit: AuditConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `AIRWAVE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("AIRWAVE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        Self::for_profile_in(profile, None)
    }

    /// Like [`Config::for_profile`], with `config_dir` (a `--config-dir`
    /// flag) replacing the configured directory. File paths set explicitly
    /// in the environment still win over the directory defaults.
    pub fn for_profile_in(profile: &str, config_dir: Option<&Path>) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            paths: PathsConfig::resolve(&env_opt, p, config_dir),
            audit: AuditConfig::from_env_profiled(p),
        }
    }

    /// Config rooted at an explicit directory, ignoring the environment.
    pub fn rooted_at(dir: impl AsRef<Path>) -> Self {
        Self {
            profile: String::new(),
            paths: PathsConfig::under(dir),
            audit: AuditConfig::default(),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  policy:      {}", self.paths.policy_path.display());
        tracing::info!("  schedules:   {}", self.paths.schedule_path.display());
        tracing::info!("  audit log:   {}", self.paths.audit_log_path.display());
        tracing::info!("  event log:   {}", self.paths.event_log_path.display());
    }
}

// ── Paths ─────────────────────────────────────────────────────

/// Locations of every file the core reads or writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    pub config_dir: PathBuf,
    pub policy_path: PathBuf,
    pub schedule_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub event_log_path: PathBuf,
}

impl PathsConfig {
    /// Default file layout under `dir`.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            config_dir: dir.to_path_buf(),
            policy_path: dir.join("autonomy_policy.json"),
            schedule_path: dir.join("schedules.json"),
            audit_log_path: dir.join("logs").join("autonomy_audit.jsonl"),
            event_log_path: dir.join("logs").join("scheduler_events.jsonl"),
        }
    }

    /// Directory from `dir_override`, else `AIRWAVE_CONFIG_DIR`, else `config`;
    /// each file from its own key, else its default under that directory.
    fn resolve(lookup: &dyn Fn(&str) -> Option<String>, p: &str, dir_override: Option<&Path>) -> Self {
        let dir = match dir_override {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from(
                profiled_lookup(lookup, p, "AIRWAVE_CONFIG_DIR").unwrap_or_else(|| "config".to_string()),
            ),
        };
        let defaults = Self::under(&dir);
        let path = |key: &str, default: PathBuf| {
            profiled_lookup(lookup, p, key).map(PathBuf::from).unwrap_or(default)
        };
        Self {
            policy_path: path("AIRWAVE_POLICY_PATH", defaults.policy_path),
            schedule_path: path("AIRWAVE_SCHEDULE_PATH", defaults.schedule_path),
            audit_log_path: path("AIRWAVE_AUDIT_LOG_PATH", defaults.audit_log_path),
            event_log_path: path("AIRWAVE_EVENT_LOG_PATH", defaults.event_log_path),
            config_dir: dir,
        }
    }
}

// ── Audit ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Number of events returned by `ListAuditEvents` when no limit is given.
    pub default_list_limit: usize,
    /// Hard upper bound on a single tail read.
    pub max_list_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_list_limit: 100,
            max_list_limit: 5_000,
        }
    }
}

impl AuditConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            default_list_limit: profiled_env_usize(p, "AIRWAVE_AUDIT_DEFAULT_LIMIT", defaults.default_list_limit),
            max_list_limit: profiled_env_usize(p, "AIRWAVE_AUDIT_MAX_LIMIT", defaults.max_list_limit),
        }
    }

    /// Clamp a caller-supplied limit into `1..=max_list_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, self.max_list_limit.max(1))
    }
}
