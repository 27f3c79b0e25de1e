//! Owned SSA IR consumed by the checker.
//!
//! These types mirror the JSON document produced by the Go SSA bridge:
//! one [`AnalysisInput`] per run, packages with their type table, and
//! functions laid out as basic blocks plus explicit CFG edges.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identity of an SSA value. Every instruction's `id` names its result.
pub type ValueId = u32;

/// Placeholder for an empty operand slot (e.g. an omitted slice bound).
///
/// Never a concrete value: operand scans skip it and no fact may name it.
pub const NO_VALUE: ValueId = u32::MAX;

/// Errors raised while loading IR documents.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error("failed to read IR file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid IR JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Root type: complete analysis input from the bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub packages: Vec<Package>,
    #[serde(default)]
    pub go_version: String,
    #[serde(default)]
    pub bridge_version: String,
}

/// A Go package with full SSA IR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub import_path: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileInfo>,
    #[serde(default)]
    pub types: Vec<TypeRef>,
    pub functions: Vec<Function>,
}

/// File-level metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub is_test: bool,
}

/// Type reference with unique ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRef {
    pub id: u32,
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub is_nilable: bool,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TypeKind {
    Basic,
    Named,
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Struct,
    Interface,
    Signature,
    Tuple,
    #[serde(other)]
    Unknown,
}

/// Source location span
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub file: String,
    pub start_line: u32,
    pub start_col: u32,
    #[serde(default)]
    pub end_line: u32,
    #[serde(default)]
    pub end_col: u32,
}

impl Span {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
        }
    }
}

/// SSA Instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub id: ValueId,
    pub kind: ValueKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_id: u32,
    /// `None` for compiler-inserted instructions with no source position.
    #[serde(default)]
    pub span: Option<Span>,
    /// Operand values in IR order. For `Phi`, one per predecessor edge.
    #[serde(default)]
    pub operands: Vec<ValueId>,

    // Call-specific
    #[serde(default)]
    pub callee: Option<String>,

    // Const-specific
    #[serde(default)]
    pub const_value: Option<String>,
    #[serde(default)]
    pub is_nil: bool,

    // BinOp-specific
    #[serde(default)]
    pub bin_op: Option<String>,
    /// Indices of operands that are nil constants not materialized as instructions
    #[serde(default)]
    pub nil_operand_indices: Vec<usize>,
}

impl Instruction {
    /// True if the instruction carries a source position.
    pub fn has_position(&self) -> bool {
        self.span.is_some()
    }

    /// True for a positionless interface-to-interface conversion the
    /// compiler inserted on its own (e.g. `error` passed as `any`).
    pub fn is_implicit_conversion(&self) -> bool {
        self.kind == ValueKind::ChangeInterface && self.span.is_none() && self.operands.len() == 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueKind {
    Const,
    Parameter,
    Alloc,
    FieldAddr,
    IndexAddr,
    Call,
    BinOp,
    UnOp,
    Phi,
    Extract,
    TypeAssert,
    MakeInterface,
    MakeClosure,
    MakeSlice,
    MakeMap,
    Slice,
    Convert,
    ChangeInterface,
    ChangeType,
    FreeVar,
    Global,
    Return,
    If,
    Jump,
    Panic,
    Store,
    Load,
    DebugRef,
    #[serde(other)]
    Unknown,
}

/// CFG edge between basic blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfgEdge {
    pub from_block: u32,
    pub to_block: u32,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EdgeKind {
    Unconditional,
    CondTrue,
    CondFalse,
    #[serde(other)]
    Unknown,
}

/// SSA Basic Block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub is_return: bool,
    #[serde(default)]
    pub is_panic: bool,
}

impl BasicBlock {
    /// The block's terminating instruction, if it has any instructions.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last()
    }
}

/// SSA Function with full CFG
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub span: Option<Span>,
    pub blocks: Vec<BasicBlock>,
    #[serde(default)]
    pub cfg_edges: Vec<CfgEdge>,
}

impl Function {
    /// Index every instruction by the value it defines.
    pub fn value_map(&self) -> HashMap<ValueId, &Instruction> {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .map(|i| (i.id, i))
            .collect()
    }

    /// File the function is declared in, when known.
    pub fn file(&self) -> Option<&str> {
        self.span.as_ref().map(|s| s.file.as_str())
    }
}

impl AnalysisInput {
    /// Parse a bridge JSON document.
    pub fn from_json(data: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Read and parse a bridge JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, IrError> {
        let data = std::fs::read_to_string(path).map_err(|source| IrError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let input = Self::from_json(&data)?;
        tracing::debug!(
            path = %path.display(),
            packages = input.packages.len(),
            functions = input.function_count(),
            "loaded IR"
        );
        Ok(input)
    }

    /// Total number of functions across all packages.
    pub fn function_count(&self) -> usize {
        self.packages.iter().map(|p| p.functions.len()).sum()
    }
}
