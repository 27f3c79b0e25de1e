//! Configuration loading from errisnil.toml.

use errisnil_diagnostics::rules::{KNOWN_NIL, MAYBE_NIL};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "errisnil.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub errisnil: ErrisnilConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrisnilConfig {
    pub severity_threshold: String,
    /// Skip functions declared in files marked as generated.
    pub skip_generated: bool,
    /// Skip functions declared in `_test.go` files.
    pub skip_tests: bool,
    /// 0 = unlimited.
    pub max_diagnostics: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// ERRNIL001
    pub known_nil: RuleConfig,
    /// ERRNIL002
    pub maybe_nil: RuleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub enabled: bool,
}

impl Default for ErrisnilConfig {
    fn default() -> Self {
        Self {
            severity_threshold: "warning".to_string(),
            skip_generated: true,
            skip_tests: false,
            max_diagnostics: 0,
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl RulesConfig {
    /// Whether diagnostics with this rule code should be kept. Unknown codes are kept.
    pub fn is_enabled(&self, rule: &str) -> bool {
        match rule {
            KNOWN_NIL => self.known_nil.enabled,
            MAYBE_NIL => self.maybe_nil.enabled,
            _ => true,
        }
    }
}

/// Find and load errisnil.toml, walking up from `start_dir`.
///
/// Returns the default config if no file is found or the file cannot be read or parsed.
pub fn load_config(start_dir: &Path) -> Config {
    let Some(path) = find_config_file(start_dir) else {
        return Config::default();
    };
    tracing::debug!(path = %path.display(), "loading config");

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), "cannot read config, using defaults: {e}");
            return Config::default();
        }
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), "invalid config, using defaults: {e}");
            Config::default()
        }
    }
}

/// Walk up directories looking for errisnil.toml.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Default TOML content for `errisnil init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"[errisnil]
severity_threshold = "warning"  # info | warning | error | critical
skip_generated = true
skip_tests = false
max_diagnostics = 0             # 0 = unlimited

# ERRNIL001: use of an error variable that is known to be nil
[rules.known_nil]
enabled = true

# ERRNIL002: use of an error variable that is nil in some branches only
[rules.maybe_nil]
enabled = true
"#;
