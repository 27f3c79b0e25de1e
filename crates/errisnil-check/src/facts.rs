//! Per-path nilness facts.
//!
//! `Facts` is a persistent list: extending it returns a new list that shares
//! the old one as its tail, so sibling branches of the dominator walk each
//! own their extensions and never observe one another's.

use std::sync::Arc;

use errisnil_ir::ir::{ValueId, NO_VALUE};

/// What is known about an error value at a program point.
///
/// The absence of a fact (`Option<Nilness>::None`) means nothing is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nilness {
    /// Nil on every path reaching this point.
    Known,
    /// Nil on some paths reaching this point, not on others.
    Maybe,
}

impl std::fmt::Display for Nilness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known => write!(f, "nil-known"),
            Self::Maybe => write!(f, "nil-maybe"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FactError {
    /// A fact must name a concrete value, never the empty operand placeholder.
    #[error("cannot record a {0} fact for the empty value placeholder")]
    NoValue(Nilness),
}

#[derive(Debug)]
struct Node {
    value: ValueId,
    nilness: Nilness,
    next: Option<Arc<Node>>,
}

/// An immutable, append-only sequence of `(value, nilness)` facts.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    head: Option<Arc<Node>>,
    len: usize,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nilness of `value`, taken from the first fact recorded for it.
    pub fn nilness(&self, value: ValueId) -> Option<Nilness> {
        // Nodes run newest to oldest; the last match is the first recorded.
        let mut found = None;
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            if node.value == value {
                found = Some(node.nilness);
            }
            cursor = node.next.as_deref();
        }
        found
    }

    /// A new fact list with `value` recorded as `nilness`. `self` is untouched.
    pub fn with_fact(&self, value: ValueId, nilness: Nilness) -> Result<Facts, FactError> {
        if value == NO_VALUE {
            return Err(FactError::NoValue(nilness));
        }
        tracing::trace!(value, %nilness, depth = self.len + 1, "add fact");
        Ok(Facts {
            head: Some(Arc::new(Node {
                value,
                nilness,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        })
    }

    pub fn with_known_nil(&self, value: ValueId) -> Result<Facts, FactError> {
        self.with_fact(value, Nilness::Known)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Nilness of a phi result given the nilness of its incoming values.
///
/// Known when every incoming value is known nil, Maybe when only some are,
/// nothing otherwise. Incoming values that are merely Maybe do not count.
pub fn resolve_phi(facts: &Facts, operands: &[ValueId]) -> Option<Nilness> {
    let known = operands
        .iter()
        .filter(|&&op| facts.nilness(op) == Some(Nilness::Known))
        .count();

    tracing::trace!(known, operands = operands.len(), "resolve phi");

    if known == 0 {
        None
    } else if known == operands.len() {
        Some(Nilness::Known)
    } else {
        Some(Nilness::Maybe)
    }
}
