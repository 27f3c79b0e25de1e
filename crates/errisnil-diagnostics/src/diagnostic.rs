//! Core diagnostic types for errisnil.
//!
//! The checker produces `Diagnostic` values, and all formatters
//! (human, JSON, SARIF) consume them.

use serde::{Deserialize, Serialize};

/// Category attached to every finding of the checker.
pub const CATEGORY: &str = "errisnil";

/// A diagnostic produced by the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique ID: RULE_CODE-file:line (e.g., "ERRNIL001-handler.go:18").
    pub id: String,
    /// Rule code (e.g., "ERRNIL001").
    pub rule: String,
    /// Analyzer category, always [`CATEGORY`].
    pub category: String,
    /// Severity level.
    pub severity: Severity,
    /// Fixed one-line message. Consumers match on this text byte for byte.
    pub message: String,
    /// Which function and SSA value the finding is about.
    pub explanation: String,
    /// Function the finding was reported in.
    pub function: String,
    /// Where the use happens.
    pub location: Location,
}

/// Severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Potential issue that should be addressed.
    Warning,
    /// Definite bug.
    Error,
    /// Critical safety issue.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl Severity {
    /// Check if this severity is at or above a threshold.
    pub fn is_at_least(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

/// Source code location.
///
/// Lines and columns are 1-based (matching Go's `token.Position`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    /// Line number (1-based).
    pub line: u32,
    /// Column offset (1-based).
    pub column: u32,
    /// End line number (1-based).
    pub end_line: u32,
    /// End column offset (1-based).
    pub end_column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Builder for creating diagnostics conveniently.
pub struct DiagnosticBuilder {
    rule: String,
    severity: Severity,
    message: String,
    file: String,
    line: u32,
    column: u32,
    end_line: u32,
    end_column: u32,
    explanation: String,
    function: String,
}

impl DiagnosticBuilder {
    /// Create a new diagnostic builder.
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            file: String::new(),
            line: 0,
            column: 0,
            end_line: 0,
            end_column: 0,
            explanation: String::new(),
            function: String::new(),
        }
    }

    /// Set the location.
    pub fn location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self.column = column;
        self.end_line = line;
        self.end_column = column;
        self
    }

    /// Set the end location.
    pub fn end_location(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    /// Set the explanation.
    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Set the enclosing function.
    pub fn function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// Build the diagnostic.
    pub fn build(self) -> Diagnostic {
        let id = format!("{}-{}:{}", self.rule, self.file, self.line);
        Diagnostic {
            id,
            rule: self.rule,
            category: CATEGORY.to_string(),
            severity: self.severity,
            message: self.message,
            explanation: self.explanation,
            function: self.function,
            location: Location {
                file: self.file,
                line: self.line,
                column: self.column,
                end_line: self.end_line,
                end_column: self.end_column,
            },
        }
    }
}
