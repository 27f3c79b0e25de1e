//! Dominator-tree walk that tracks which error values are known to be nil.
//!
//! Each function is walked from its entry block in dominator-tree pre-order.
//! A branch on `err != nil` (or `err == nil`) proves `err` nil on one
//! successor; that successor is visited first with the stronger fact, and
//! every later use of `err` below it is reported.

use std::collections::{HashMap, HashSet};

use errisnil_diagnostics::diagnostic::Diagnostic;
use errisnil_ir::cfg::{Cfg, DominatorTree};
use errisnil_ir::ir::{AnalysisInput, Function, Instruction, Package, ValueId, ValueKind, NO_VALUE};
use errisnil_ir::types::TypeMap;

use crate::facts::{resolve_phi, FactError, Facts};
use crate::guard::recognize_guard;
use crate::rules;

/// The analysis of one function was aborted because its IR broke an invariant.
#[derive(Debug, thiserror::Error)]
#[error("analysis of `{func}` aborted: {source}")]
pub struct AnalysisError {
    pub func: String,
    #[source]
    pub source: FactError,
}

pub struct ErrIsNilAnalyzer;

impl ErrIsNilAnalyzer {
    /// Check every function of every package.
    ///
    /// Functions whose analysis aborts are logged and contribute no diagnostics.
    pub fn analyze(ir: &AnalysisInput) -> Vec<Diagnostic> {
        ir.packages
            .iter()
            .flat_map(Self::analyze_package)
            .collect()
    }

    pub fn analyze_package(pkg: &Package) -> Vec<Diagnostic> {
        let types = TypeMap::from_package(pkg);
        let mut diags = Vec::new();
        for func in &pkg.functions {
            match Self::analyze_function(func, &types) {
                Ok(found) => diags.extend(found),
                Err(e) => tracing::error!(package = %pkg.import_path, "{e}"),
            }
        }
        diags
    }

    /// Check a single function. Diagnostics come out in walk order.
    pub fn analyze_function(
        func: &Function,
        types: &TypeMap,
    ) -> Result<Vec<Diagnostic>, AnalysisError> {
        tracing::debug!(func = %func.name, blocks = func.blocks.len(), "visit function");

        let mut walker = Walker::new(func, types);
        let Some(entry) = walker.dom.root() else {
            return Ok(Vec::new());
        };
        walker
            .visit(entry, Facts::new())
            .map_err(|source| AnalysisError {
                func: func.name.clone(),
                source,
            })?;
        Ok(walker.diags)
    }
}

struct Walker<'a> {
    func: &'a Function,
    cfg: Cfg<'a>,
    dom: DominatorTree,
    values: HashMap<ValueId, &'a Instruction>,
    types: &'a TypeMap,
    visited: HashSet<u32>,
    diags: Vec<Diagnostic>,
}

impl<'a> Walker<'a> {
    fn new(func: &'a Function, types: &'a TypeMap) -> Self {
        let cfg = Cfg::from_function(func);
        let dom = DominatorTree::compute(&cfg);
        Self {
            func,
            cfg,
            dom,
            values: func.value_map(),
            types,
            visited: HashSet::new(),
            diags: Vec::new(),
        }
    }

    fn visit(&mut self, block_id: u32, facts: Facts) -> Result<(), FactError> {
        if !self.visited.insert(block_id) {
            return Ok(());
        }
        let Some(block) = self.cfg.block(block_id) else {
            return Ok(());
        };
        tracing::debug!(block = block_id, name = %block.name, facts = facts.len(), "visit block");

        let mut facts = facts;
        for instr in &block.instructions {
            tracing::trace!(id = instr.id, kind = ?instr.kind, operands = ?instr.operands, "instr");

            if instr.kind == ValueKind::Phi {
                if let Some(nilness) = resolve_phi(&facts, &instr.operands) {
                    facts = facts.with_fact(instr.id, nilness)?;
                }
                continue;
            }

            for &operand in &instr.operands {
                if operand == NO_VALUE {
                    continue;
                }
                let Some(nilness) = facts.nilness(operand) else {
                    continue;
                };

                if instr.has_position() {
                    let diag =
                        rules::report(instr, nilness, &self.func.short_name, &self.value_name(operand));
                    self.diags.push(diag);
                } else if instr.is_implicit_conversion() {
                    // The conversion has nowhere to report; its result carries the fact instead.
                    facts = facts.with_fact(instr.id, nilness)?;
                } else {
                    tracing::trace!(id = instr.id, operand, "skip use without position");
                }
            }
        }

        if let Some(guard) = recognize_guard(block, &self.cfg, &self.values, self.types) {
            if self.cfg.pred_count(guard.nil_block) == 1 {
                let nil_facts = facts.with_known_nil(guard.value)?;
                self.visit(guard.nil_block, nil_facts)?;
            }
        }

        let dominees = self.dom.dominees(block_id).to_vec();
        for dominee in dominees {
            self.visit(dominee, facts.clone())?;
        }
        Ok(())
    }

    fn value_name(&self, id: ValueId) -> String {
        self.values
            .get(&id)
            .map(|v| v.name.as_str())
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("t{id}"), str::to_string)
    }
}
