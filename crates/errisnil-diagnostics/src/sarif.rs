//! SARIF v2.1.0 output formatter for CI/CD integration.
//!
//! Produces SARIF JSON compatible with GitHub code scanning
//! and other SARIF consumers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagnostic::{Diagnostic, Severity};
use crate::rules;

// ---------------------------------------------------------------------------
// SARIF v2.1.0 data model
// ---------------------------------------------------------------------------

/// SARIF v2.1.0 root object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLog {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

/// A single SARIF run (one tool execution).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifTool {
    pub driver: SarifDriver,
}

/// Tool driver with rules.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub full_description: SarifMessage,
    pub rules: Vec<SarifRule>,
}

/// A SARIF rule definition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_description: Option<SarifMessage>,
    pub default_configuration: SarifRuleConfig,
}

/// Default configuration for a rule (severity level).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRuleConfig {
    pub level: String,
}

/// A SARIF result (one diagnostic finding).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub partial_fingerprints: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifMessage {
    pub text: String,
}

/// A SARIF location (physical file + optional annotation message).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<SarifMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
}

/// A region within a file (line/column ranges, 1-based).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: u32,
    pub start_column: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub end_line: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub end_column: u32,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

// ---------------------------------------------------------------------------
// Conversion functions
// ---------------------------------------------------------------------------

/// Convert diagnostics to a pretty-printed SARIF JSON string.
pub fn to_sarif(diagnostics: &[Diagnostic], version: &str) -> Result<String, serde_json::Error> {
    let log = to_sarif_log(diagnostics, version);
    serde_json::to_string_pretty(&log)
}

/// Convert diagnostics to a [`SarifLog`] struct.
pub fn to_sarif_log(diagnostics: &[Diagnostic], version: &str) -> SarifLog {
    let rules = collect_rules(diagnostics);
    let results: Vec<SarifResult> = diagnostics.iter().map(diagnostic_to_sarif_result).collect();

    SarifLog {
        schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json".into(),
        version: "2.1.0".into(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "errisnil".into(),
                    version: version.into(),
                    full_description: SarifMessage {
                        text: rules::ANALYZER_DOC.trim_end().into(),
                    },
                    rules,
                },
            },
            results,
        }],
    }
}

/// Map [`Severity`] to SARIF level string.
fn severity_to_sarif_level(severity: Severity) -> String {
    match severity {
        Severity::Critical | Severity::Error => "error".into(),
        Severity::Warning => "warning".into(),
        Severity::Info => "note".into(),
    }
}

fn diagnostic_to_sarif_result(diag: &Diagnostic) -> SarifResult {
    let primary_location = SarifLocation {
        physical_location: SarifPhysicalLocation {
            artifact_location: SarifArtifactLocation {
                uri: diag.location.file.clone(),
            },
            region: SarifRegion {
                start_line: diag.location.line,
                start_column: diag.location.column,
                end_line: diag.location.end_line,
                end_column: diag.location.end_column,
            },
        },
        message: (!diag.explanation.is_empty()).then(|| SarifMessage {
            text: diag.explanation.clone(),
        }),
    };

    let mut partial_fingerprints = BTreeMap::new();
    partial_fingerprints.insert("errisnil/v1".to_string(), diag.id.clone());

    SarifResult {
        rule_id: diag.rule.clone(),
        level: severity_to_sarif_level(diag.severity),
        message: SarifMessage {
            text: diag.message.clone(),
        },
        locations: vec![primary_location],
        partial_fingerprints,
    }
}

/// Collect unique rule definitions from diagnostics, deduplicated by rule code.
///
/// Catalog metadata is preferred; rules missing from the catalog fall back to
/// the first diagnostic's message and severity.
fn collect_rules(diagnostics: &[Diagnostic]) -> Vec<SarifRule> {
    let mut seen: BTreeMap<String, SarifRule> = BTreeMap::new();

    for diag in diagnostics {
        seen.entry(diag.rule.clone()).or_insert_with(|| match rules::get_rule(&diag.rule) {
            Some(info) => SarifRule {
                id: info.code,
                name: info.name,
                short_description: SarifMessage { text: info.title },
                full_description: Some(SarifMessage {
                    text: info.description,
                }),
                default_configuration: SarifRuleConfig {
                    level: severity_to_sarif_level(info.severity),
                },
            },
            None => SarifRule {
                id: diag.rule.clone(),
                name: diag.rule.to_lowercase(),
                short_description: SarifMessage {
                    text: diag.message.clone(),
                },
                full_description: None,
                default_configuration: SarifRuleConfig {
                    level: severity_to_sarif_level(diag.severity),
                },
            },
        });
    }

    seen.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
