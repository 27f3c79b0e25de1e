//! errisnil IR: SSA intermediate representation consumed by the checker.
//!
//! The IR is built by the Go SSA bridge and deserialized here. This crate provides:
//! - Owned IR types matching the bridge JSON output
//! - CFG navigation helpers and the dominator tree
//! - Type system helpers

pub mod cfg; // CFG navigation helpers
pub mod ir; // Owned IR types
pub mod types; // Type system helpers

/// Load a bridge JSON file and convert it to the owned IR.
pub fn load_json_file(path: &std::path::Path) -> Result<ir::AnalysisInput, ir::IrError> {
    ir::AnalysisInput::from_json_file(path)
}

/// Load a fixture file from `tests/fixtures/` by name (without the `.json` extension).
///
/// This is available in test builds and when the `test-fixtures` feature is enabled.
#[cfg(any(test, feature = "test-fixtures"))]
pub fn load_fixture(name: &str) -> ir::AnalysisInput {
    load_json_file(&fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to load fixture {name}: {e}"))
}

/// Absolute path of a fixture file in `tests/fixtures/`.
#[cfg(any(test, feature = "test-fixtures"))]
pub fn fixture_path(name: &str) -> std::path::PathBuf {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .join("../../tests/fixtures")
        .join(format!("{name}.json"))
}
