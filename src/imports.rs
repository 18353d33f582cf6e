//! Import Scanner
//!
//! Records which local names were imported from 3D/graphics libraries so the
//! classifier can leave their elements alone. Must finish before tagging
//! starts.

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::markup::{ImportDecl, ImportKind};

lazy_static! {
    /// Module specifier fragments that mark a graphics library import.
    pub static ref LIBRARY_MARKERS: Vec<&'static str> =
        vec!["three", "@react-three/fiber", "@react-three/drei"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBindings {
    /// Named and default bindings.
    pub named: HashSet<String>,
    /// `import * as X` bindings.
    pub namespaces: HashSet<String>,
}

impl ImportBindings {
    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.namespaces.is_empty()
    }
}

pub fn is_library_source(source: &str) -> bool {
    LIBRARY_MARKERS.iter().any(|marker| source.contains(marker))
}

pub fn scan_imports(imports: &[ImportDecl]) -> ImportBindings {
    let mut bindings = ImportBindings::default();

    for decl in imports.iter().filter(|d| is_library_source(&d.source)) {
        for binding in &decl.bindings {
            match binding.kind {
                ImportKind::Named | ImportKind::Default => {
                    bindings.named.insert(binding.local.clone());
                }
                ImportKind::Namespace => {
                    bindings.namespaces.insert(binding.local.clone());
                }
            }
        }
    }

    bindings
}
