//! Analysis orchestrator: loads IR, runs the checker over every function,
//! then filters, sorts and summarizes the findings.

use crate::config::Config;
use errisnil_check::ErrIsNilAnalyzer;
use errisnil_diagnostics::diagnostic::{Diagnostic, Severity};
use errisnil_ir::ir::{AnalysisInput, FileInfo, Function, IrError};
use errisnil_ir::types::TypeMap;
use std::collections::HashMap;
use std::path::Path;

/// Complete output from an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub summary: AnalysisSummary,
    /// One message per function whose analysis was aborted.
    pub failures: Vec<String>,
}

/// Summary statistics for the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisSummary {
    pub total: usize,
    pub error: usize,
    pub warning: usize,
    pub packages_analyzed: usize,
    pub functions_analyzed: usize,
    pub functions_failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("failed to load IR: {0}")]
    Ir(#[from] IrError),
}

/// Load one IR JSON file and analyze it.
pub fn analyze_file(path: &Path, config: &Config) -> Result<AnalysisOutput, OrchestratorError> {
    analyze_files(&[path], config)
}

/// Load several IR JSON files and analyze their packages as one run.
pub fn analyze_files<P: AsRef<Path>>(
    paths: &[P],
    config: &Config,
) -> Result<AnalysisOutput, OrchestratorError> {
    let mut merged = AnalysisInput::default();
    for path in paths {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading IR");
        let ir = errisnil_ir::load_json_file(path)?;
        if merged.go_version.is_empty() {
            merged.go_version = ir.go_version;
            merged.bridge_version = ir.bridge_version;
        }
        merged.packages.extend(ir.packages);
    }
    Ok(analyze_ir(&merged, config))
}

/// Run the checker on already-loaded IR.
/// Used by both the CLI (after loading) and tests (from fixtures).
pub fn analyze_ir(ir: &AnalysisInput, config: &Config) -> AnalysisOutput {
    let mut diags = Vec::new();
    let mut failures = Vec::new();
    let mut functions_analyzed = 0;

    for pkg in &ir.packages {
        let types = TypeMap::from_package(pkg);
        let files: HashMap<&str, &FileInfo> =
            pkg.files.iter().map(|f| (f.path.as_str(), f)).collect();

        for func in &pkg.functions {
            if should_skip(func, &files, config) {
                tracing::debug!(func = %func.name, "skipping function");
                continue;
            }
            functions_analyzed += 1;
            match ErrIsNilAnalyzer::analyze_function(func, &types) {
                Ok(found) => diags.extend(found),
                Err(e) => {
                    tracing::error!(package = %pkg.import_path, "{e}");
                    failures.push(e.to_string());
                }
            }
        }
    }

    postprocess_diagnostics(diags, failures, functions_analyzed, config, ir)
}

fn should_skip(func: &Function, files: &HashMap<&str, &FileInfo>, config: &Config) -> bool {
    let Some(path) = func.file() else {
        return false;
    };
    let info = files.get(path);
    let generated = info.is_some_and(|f| f.is_generated);
    let test = info.is_some_and(|f| f.is_test) || path.ends_with("_test.go");
    (config.errisnil.skip_generated && generated) || (config.errisnil.skip_tests && test)
}

/// Shared post-processing: rule and severity filters, sort, truncate, build summary.
fn postprocess_diagnostics(
    mut diags: Vec<Diagnostic>,
    failures: Vec<String>,
    functions_analyzed: usize,
    config: &Config,
    ir: &AnalysisInput,
) -> AnalysisOutput {
    let threshold = parse_severity(&config.errisnil.severity_threshold);
    diags.retain(|d| config.rules.is_enabled(&d.rule) && d.severity.is_at_least(threshold));

    diags.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
    });

    if config.errisnil.max_diagnostics > 0 && diags.len() > config.errisnil.max_diagnostics {
        diags.truncate(config.errisnil.max_diagnostics);
    }

    let summary = AnalysisSummary {
        total: diags.len(),
        error: diags
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count(),
        warning: diags
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count(),
        packages_analyzed: ir.packages.len(),
        functions_analyzed,
        functions_failed: failures.len(),
    };

    AnalysisOutput {
        diagnostics: diags,
        summary,
        failures,
    }
}

/// Parse a severity name; unknown names fall back to `warning`.
pub fn parse_severity(s: &str) -> Severity {
    match s {
        "critical" => Severity::Critical,
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        "info" => Severity::Info,
        other => {
            tracing::warn!(severity = %other, "unknown severity threshold, using warning");
            Severity::Warning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errisnil_ir::ir::{BasicBlock, Instruction, Package, Span, TypeKind, TypeRef, ValueKind};

    const FIXTURE: &str = "errisnil/testdata";

    fn lines(output: &AnalysisOutput) -> Vec<(String, u32)> {
        output
            .diagnostics
            .iter()
            .map(|d| (d.rule.clone(), d.location.line))
            .collect()
    }

    #[test]
    fn test_analyze_ir_fixture() {
        let ir = errisnil_ir::load_fixture(FIXTURE);
        let output = analyze_ir(&ir, &Config::default());
        assert_eq!(
            output.summary,
            AnalysisSummary {
                total: 8,
                error: 7,
                warning: 1,
                packages_analyzed: 1,
                functions_analyzed: 10,
                functions_failed: 0,
            }
        );
        assert!(output.failures.is_empty());
    }

    #[test]
    fn test_analyze_ir_sorted_output() {
        let ir = errisnil_ir::load_fixture(FIXTURE);
        let output = analyze_ir(&ir, &Config::default());
        let found: Vec<u32> = output.diagnostics.iter().map(|d| d.location.line).collect();
        assert_eq!(found, vec![30, 41, 62, 68, 73, 102, 109, 122]);
    }

    #[test]
    fn test_analyze_ir_severity_filter() {
        let ir = errisnil_ir::load_fixture(FIXTURE);
        let mut config = Config::default();
        config.errisnil.severity_threshold = "error".into();
        let output = analyze_ir(&ir, &config);
        assert_eq!(output.summary.total, 7);
        assert!(output.diagnostics.iter().all(|d| d.rule == "ERRNIL001"));
    }

    #[test]
    fn test_analyze_ir_disabled_rule() {
        let ir = errisnil_ir::load_fixture(FIXTURE);
        let mut config = Config::default();
        config.rules.known_nil.enabled = false;
        let output = analyze_ir(&ir, &config);
        assert_eq!(lines(&output), vec![("ERRNIL002".to_string(), 122)]);
    }

    #[test]
    fn test_analyze_ir_max_diagnostics() {
        let ir = errisnil_ir::load_fixture(FIXTURE);
        let mut config = Config::default();
        config.errisnil.max_diagnostics = 3;
        let output = analyze_ir(&ir, &config);
        assert_eq!(output.summary.total, 3);
        let found: Vec<u32> = output.diagnostics.iter().map(|d| d.location.line).collect();
        assert_eq!(found, vec![30, 41, 62]);
    }

    #[test]
    fn test_analyze_file_fixture() {
        let output =
            analyze_file(&errisnil_ir::fixture_path(FIXTURE), &Config::default()).unwrap();
        assert_eq!(output.summary.total, 8);
    }

    #[test]
    fn test_analyze_files_merges_packages() {
        let path = errisnil_ir::fixture_path(FIXTURE);
        let output = analyze_files(&[&path, &path], &Config::default()).unwrap();
        assert_eq!(output.summary.packages_analyzed, 2);
        assert_eq!(output.summary.total, 16);
    }

    #[test]
    fn test_analyze_file_missing() {
        let err = analyze_file(Path::new("/nonexistent/ir.json"), &Config::default()).unwrap_err();
        assert!(matches!(err, OrchestratorError::Ir(IrError::Io { .. })));
        assert!(err.to_string().starts_with("failed to load IR"));
    }

    /// A package with one function that uses err after `if err != nil { return err }`.
    fn single_function_package(file: FileInfo) -> AnalysisInput {
        let instr = |id: u32, kind: ValueKind, type_id: u32, operands: Vec<u32>| Instruction {
            id,
            kind,
            name: format!("t{id}"),
            type_id,
            span: Some(Span::new(file.path.as_str(), id + 10, 1)),
            operands,
            callee: None,
            const_value: None,
            is_nil: false,
            bin_op: None,
            nil_operand_indices: vec![],
        };
        let mut cmp = instr(1, ValueKind::BinOp, 2, vec![0, 100]);
        cmp.bin_op = Some("!=".into());
        cmp.nil_operand_indices = vec![1];
        let block = |id: u32, instructions: Vec<Instruction>| BasicBlock {
            id,
            name: format!("b{id}"),
            instructions,
            is_return: id != 0,
            is_panic: false,
        };
        let edge = |to_block, kind| errisnil_ir::ir::CfgEdge {
            from_block: 0,
            to_block,
            kind,
        };
        let func = Function {
            name: "gen.f".into(),
            short_name: "f".into(),
            span: Some(Span::new(file.path.as_str(), 1, 1)),
            blocks: vec![
                block(
                    0,
                    vec![
                        instr(0, ValueKind::Call, 1, vec![]),
                        cmp,
                        instr(200, ValueKind::If, 0, vec![1]),
                    ],
                ),
                block(1, vec![instr(201, ValueKind::Return, 0, vec![0])]),
                block(2, vec![instr(202, ValueKind::Return, 0, vec![0])]),
            ],
            cfg_edges: vec![
                edge(1, errisnil_ir::ir::EdgeKind::CondTrue),
                edge(2, errisnil_ir::ir::EdgeKind::CondFalse),
            ],
        };
        AnalysisInput {
            packages: vec![Package {
                import_path: "gen".into(),
                name: "gen".into(),
                files: vec![file],
                types: vec![TypeRef {
                    id: 1,
                    kind: TypeKind::Interface,
                    name: "error".into(),
                    is_nilable: true,
                    is_error: true,
                }],
                functions: vec![func],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_skip_generated() {
        let ir = single_function_package(FileInfo {
            path: "gen.pb.go".into(),
            is_generated: true,
            is_test: false,
        });
        let output = analyze_ir(&ir, &Config::default());
        assert_eq!(output.summary.total, 0);
        assert_eq!(output.summary.functions_analyzed, 0);

        let mut config = Config::default();
        config.errisnil.skip_generated = false;
        let output = analyze_ir(&ir, &config);
        assert_eq!(lines(&output), vec![("ERRNIL001".to_string(), 212)]);
    }

    #[test]
    fn test_skip_tests() {
        let ir = single_function_package(FileInfo {
            path: "gen_test.go".into(),
            is_generated: false,
            is_test: false,
        });
        assert_eq!(analyze_ir(&ir, &Config::default()).summary.total, 1);

        let mut config = Config::default();
        config.errisnil.skip_tests = true;
        assert_eq!(analyze_ir(&ir, &config).summary.total, 0);
    }

    #[test]
    fn test_failed_function_is_counted() {
        let mut ir = single_function_package(FileInfo {
            path: "gen.go".into(),
            is_generated: false,
            is_test: false,
        });
        // A conversion defining the empty placeholder breaks the fact invariant.
        let conv = Instruction {
            id: errisnil_ir::ir::NO_VALUE,
            kind: ValueKind::ChangeInterface,
            name: "bad".into(),
            type_id: 1,
            span: None,
            operands: vec![0],
            callee: None,
            const_value: None,
            is_nil: false,
            bin_op: None,
            nil_operand_indices: vec![],
        };
        ir.packages[0].functions[0].blocks[2]
            .instructions
            .insert(0, conv);
        let output = analyze_ir(&ir, &Config::default());
        assert_eq!(output.summary.functions_analyzed, 1);
        assert_eq!(output.summary.functions_failed, 1);
        assert_eq!(output.summary.total, 0);
        assert!(output.failures[0].contains("gen.f"));
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("critical"), Severity::Critical);
        assert_eq!(parse_severity("error"), Severity::Error);
        assert_eq!(parse_severity("warning"), Severity::Warning);
        assert_eq!(parse_severity("info"), Severity::Info);
        assert_eq!(parse_severity("bogus"), Severity::Warning);
    }
}
