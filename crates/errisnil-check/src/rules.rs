//! Diagnostic builders for ERRNIL001 and ERRNIL002.

use errisnil_diagnostics::diagnostic::{Diagnostic, DiagnosticBuilder, Severity};
use errisnil_diagnostics::rules::{KNOWN_NIL, KNOWN_NIL_MESSAGE, MAYBE_NIL, MAYBE_NIL_MESSAGE};
use errisnil_ir::ir::{Instruction, Span};

use crate::facts::Nilness;

/// Build the diagnostic for a use of `value_name` by `instr`.
pub fn report(instr: &Instruction, nilness: Nilness, func_name: &str, value_name: &str) -> Diagnostic {
    match nilness {
        Nilness::Known => build_errnil001(instr, func_name, value_name),
        Nilness::Maybe => build_errnil002(instr, func_name, value_name),
    }
}

/// ERRNIL001: error value used where it is nil on every path
pub fn build_errnil001(instr: &Instruction, func_name: &str, value_name: &str) -> Diagnostic {
    let (file, line, col, end_line, end_col) = extract_span(&instr.span);
    DiagnosticBuilder::new(KNOWN_NIL, Severity::Error, KNOWN_NIL_MESSAGE)
        .location(file, line, col)
        .end_location(end_line, end_col)
        .explanation(format!(
            "In function `{func_name}`, `{value_name}` was compared against nil and is nil on every path reaching this use"
        ))
        .function(func_name)
        .build()
}

/// ERRNIL002: error value used after a merge where it is nil only on some paths
pub fn build_errnil002(instr: &Instruction, func_name: &str, value_name: &str) -> Diagnostic {
    let (file, line, col, end_line, end_col) = extract_span(&instr.span);
    DiagnosticBuilder::new(MAYBE_NIL, Severity::Warning, MAYBE_NIL_MESSAGE)
        .location(file, line, col)
        .end_location(end_line, end_col)
        .explanation(format!(
            "In function `{func_name}`, `{value_name}` is nil on some paths reaching this use and not on others"
        ))
        .function(func_name)
        .build()
}

fn extract_span(span: &Option<Span>) -> (String, u32, u32, u32, u32) {
    match span {
        Some(s) => (
            s.file.clone(),
            s.start_line,
            s.start_col,
            s.end_line,
            s.end_col,
        ),
        None => (String::new(), 0, 0, 0, 0),
    }
}
