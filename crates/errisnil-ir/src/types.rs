//! Type system helpers for working with Go types from bridge data.

use crate::ir::{Package, TypeKind, TypeRef};
use std::collections::HashMap;

/// Type lookup table for a package
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    types: HashMap<u32, TypeRef>,
}

impl TypeMap {
    pub fn from_package(pkg: &Package) -> Self {
        Self::from_types(&pkg.types)
    }

    pub fn from_types(types: &[TypeRef]) -> Self {
        let types = types.iter().map(|t| (t.id, t.clone())).collect();
        Self { types }
    }

    pub fn get(&self, id: u32) -> Option<&TypeRef> {
        self.types.get(&id)
    }

    pub fn is_nilable(&self, id: u32) -> bool {
        self.types.get(&id).map(|t| t.is_nilable).unwrap_or(false)
    }

    pub fn is_interface(&self, id: u32) -> bool {
        self.types
            .get(&id)
            .map(|t| t.kind == TypeKind::Interface)
            .unwrap_or(false)
    }

    /// The tracked error-like type: the builtin `error` interface.
    pub fn is_error_type(&self, id: u32) -> bool {
        self.types
            .get(&id)
            .map(|t| t.is_error || t.name == "error" || t.name.ends_with(".error"))
            .unwrap_or(false)
    }
}
