//! Structured validation results with path-addressed errors and suggestions.
//!
//! Shape checks for both persisted documents report into a [`ValidationResult`]:
//! errors block a write, warnings are advisory.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    /// JSON-path-like location, e.g. `"schedules[2].overrides.priority"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// One-line summary of the first `limit` errors, for error messages and logs.
    pub fn summary(&self, limit: usize) -> String {
        let mut parts: Vec<String> = self
            .errors
            .iter()
            .take(limit)
            .map(ToString::to_string)
            .collect();
        if self.errors.len() > limit {
            parts.push(format!("(+{} more)", self.errors.len() - limit));
        }
        parts.join("; ")
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_marks_invalid() {
        let mut result = ValidationResult::new();
        assert!(result.valid);
        result.warn("a", "advisory only");
        assert!(result.valid);
        result.error("b", "broken");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn summary_truncates() {
        let mut result = ValidationResult::new();
        for i in 0..5 {
            result.error(format!("f{i}"), "missing");
        }
        let summary = result.summary(3);
        assert_eq!(summary, "f0: missing; f1: missing; f2: missing; (+2 more)");
    }
}
