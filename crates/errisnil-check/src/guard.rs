//! Recognition of `err == nil` / `err != nil` branches.

use std::collections::HashMap;

use errisnil_ir::cfg::Cfg;
use errisnil_ir::ir::{BasicBlock, Instruction, ValueId, ValueKind};
use errisnil_ir::types::TypeMap;

/// A branch that proves an error value nil on one of its successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    /// Successor entered only when the value is nil.
    pub nil_block: u32,
    /// The error value compared against nil.
    pub value: ValueId,
}

/// Inspect the terminator of `block` for a nil comparison of an error value.
///
/// Matches `if v == nil` and `if v != nil` with the nil on either side. The
/// comparison itself may be defined in any block of the function.
pub fn recognize_guard(
    block: &BasicBlock,
    cfg: &Cfg<'_>,
    values: &HashMap<ValueId, &Instruction>,
    types: &TypeMap,
) -> Option<Guard> {
    let branch = block.terminator()?;
    if branch.kind != ValueKind::If {
        return None;
    }
    let cmp = values.get(branch.operands.first()?)?;
    if cmp.kind != ValueKind::BinOp || cmp.operands.len() != 2 {
        return None;
    }
    let op = cmp.bin_op.as_deref()?;
    if op != "==" && op != "!=" {
        return None;
    }

    let value = match (is_nil_operand(cmp, 0, values), is_nil_operand(cmp, 1, values)) {
        (false, true) => cmp.operands[0],
        (true, false) => cmp.operands[1],
        _ => return None,
    };

    let compared = values.get(&value)?;
    if !types.is_error_type(compared.type_id) {
        return None;
    }

    let (on_true, on_false) = cfg.branch_successors(block.id)?;
    let nil_block = if op == "==" { on_true } else { on_false };

    tracing::trace!(block = block.id, value, op, nil_block, "nil check");
    Some(Guard { nil_block, value })
}

fn is_nil_operand(cmp: &Instruction, index: usize, values: &HashMap<ValueId, &Instruction>) -> bool {
    cmp.nil_operand_indices.contains(&index)
        || values
            .get(&cmp.operands[index])
            .is_some_and(|v| v.kind == ValueKind::Const && v.is_nil)
}
