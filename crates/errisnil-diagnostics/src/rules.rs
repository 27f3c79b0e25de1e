//! Rule catalog: all rules the errisnil checker can report.
//!
//! This module is the single source of truth for rule metadata.
//! The checker, `errisnil explain` and the SARIF formatter all read from here.

use crate::diagnostic::Severity;
use serde::Serialize;

/// Analyzer documentation shown by `errisnil explain` and in SARIF tool metadata.
pub const ANALYZER_DOC: &str = "check for unnecessary use of error variables that are known to be nil

The err-is-nil checker looks for code following an error != nil return
that still uses the error variable, even though it's known to be nil.
";

/// Rule code for a use of an error value that is nil on every reaching path.
pub const KNOWN_NIL: &str = "ERRNIL001";
/// Rule code for a use of an error value that is nil on some reaching paths only.
pub const MAYBE_NIL: &str = "ERRNIL002";

/// Message of [`KNOWN_NIL`] findings. Consumers match on it byte for byte.
pub const KNOWN_NIL_MESSAGE: &str = "use of error variable that is known to be nil";
/// Message of [`MAYBE_NIL`] findings. Consumers match on it byte for byte.
pub const MAYBE_NIL_MESSAGE: &str =
    "use of error variable that is nil in some branches, not in others. do a nil check earlier";

/// Information about a single analysis rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub code: String,
    /// Configuration key under `[rules.*]` in `errisnil.toml`.
    pub name: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: String,
    /// Example Go code that triggers this rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_bad: Option<String>,
    /// Example Go code that is safe (does not trigger this rule).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_good: Option<String>,
}

/// Look up a single rule by code (e.g., "ERRNIL001"). Matching ignores case.
pub fn get_rule(code: &str) -> Option<RuleInfo> {
    get_all_rules()
        .into_iter()
        .find(|r| r.code.eq_ignore_ascii_case(code))
}

/// Return all available analysis rules.
pub fn get_all_rules() -> Vec<RuleInfo> {
    vec![
        RuleInfo {
            code: KNOWN_NIL.into(),
            name: "known_nil".into(),
            title: KNOWN_NIL_MESSAGE.into(),
            description: "An error value is used after a comparison against nil has proven it \
                          nil on every path reaching the use. The use almost always refers to \
                          the wrong variable or follows a missing return."
                .into(),
            severity: Severity::Error,
            category: crate::diagnostic::CATEGORY.into(),
            example_bad: Some(
                "err := f()\nif err != nil {\n\treturn err\n}\nfmt.Println(err) // err is nil here"
                    .into(),
            ),
            example_good: Some(
                "err := f()\nif err != nil {\n\treturn err\n}\nfmt.Println(\"ok\")".into(),
            ),
        },
        RuleInfo {
            code: MAYBE_NIL.into(),
            name: "maybe_nil".into(),
            title: MAYBE_NIL_MESSAGE.into(),
            description: "An error value flowing out of a join is nil on some incoming paths \
                          and not on others. The check at the use is ambiguous and should \
                          happen before the paths merge."
                .into(),
            severity: Severity::Warning,
            category: crate::diagnostic::CATEGORY.into(),
            example_bad: Some(
                "err := f()\nif err != nil {\n\treturn err\n}\nif cond {\n\terr = f()\n}\nif err != nil { // nil in some branches\n\treturn err\n}"
                    .into(),
            ),
            example_good: Some(
                "err := f()\nif err != nil {\n\treturn err\n}\nif cond {\n\tif err := f(); err != nil {\n\t\treturn err\n\t}\n}"
                    .into(),
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_have_unique_codes() {
        let rules = get_all_rules();
        let mut codes: Vec<&str> = rules.iter().map(|r| r.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), rules.len(), "Duplicate rule codes found");
    }

    #[test]
    fn test_get_rule_found() {
        let rule = get_rule("ERRNIL001").unwrap();
        assert_eq!(rule.name, "known_nil");
        assert_eq!(rule.category, "errisnil");
        assert_eq!(rule.severity, Severity::Error);
        assert_eq!(rule.title, KNOWN_NIL_MESSAGE);
        assert!(rule.example_bad.is_some());
        assert!(rule.example_good.is_some());
    }

    #[test]
    fn test_get_rule_case_insensitive() {
        let rule = get_rule("errnil002").unwrap();
        assert_eq!(rule.code, MAYBE_NIL);
        assert_eq!(rule.severity, Severity::Warning);
    }

    #[test]
    fn test_get_rule_not_found() {
        assert!(get_rule("NIL001").is_none());
    }

    #[test]
    fn test_messages_are_exact() {
        assert_eq!(
            KNOWN_NIL_MESSAGE,
            "use of error variable that is known to be nil"
        );
        assert_eq!(
            MAYBE_NIL_MESSAGE,
            "use of error variable that is nil in some branches, not in others. do a nil check earlier"
        );
    }

    #[test]
    fn test_rule_serialization() {
        let rule = get_rule(KNOWN_NIL).unwrap();
        let json = serde_json::to_string_pretty(&rule).unwrap();
        assert!(json.contains("\"severity\": \"error\""));
        assert!(json.contains("example_bad"));
    }
}
