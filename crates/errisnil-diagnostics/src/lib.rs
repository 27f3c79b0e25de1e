//! errisnil diagnostics: diagnostic types, rule catalog, formatting, and output.

pub mod diagnostic;
pub mod human;
pub mod rules;
pub mod sarif;

pub use diagnostic::*;

/// Format diagnostics as pretty-printed JSON.
pub fn to_json(diags: &[Diagnostic]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(diags)
}
