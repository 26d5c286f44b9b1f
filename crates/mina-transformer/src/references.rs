//! Cross-references between the script and the other segments.
//!
//! Sub-components are imported in the script and registered under
//! `components`. Both the markup (`<import>`) and the style sheet
//! (`@import`) need them, and the behavior transformer prunes their imports.

use crate::script::{import_local, member_name, unwrap_parens, BehaviorTree};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use swc_ecma_ast::{Expr, ModuleDecl, ModuleItem, Prop, PropOrSpread};

/// A sub-component used by the component being converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReference {
    /// The identifier the component is imported as.
    pub local_name: SmolStr,
    /// The import source as written.
    pub source_path: String,
}

impl ComponentReference {
    /// The source path without its `.vue` extension.
    pub fn stem(&self) -> &str {
        self.source_path
            .strip_suffix(".vue")
            .unwrap_or(&self.source_path)
    }
}

/// Collects the registered sub-components, in `components` order.
///
/// Only imports binding exactly one identifier are considered, and only
/// shorthand entries of `components` count as registrations.
pub fn extract_references(tree: &BehaviorTree) -> Vec<ComponentReference> {
    let mut imports: FxHashMap<&str, String> = FxHashMap::default();
    for item in &tree.module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        if import.type_only {
            continue;
        }
        let [specifier] = import.specifiers.as_slice() else {
            continue;
        };
        let local = import_local(specifier);
        if let Some(source) = import.src.value.as_str() {
            imports.insert(local.sym.as_str(), source.to_string());
        }
    }

    let Ok(descriptor) = tree.descriptor() else {
        return Vec::new();
    };
    let Some(Expr::Object(components)) = descriptor.property("components").map(unwrap_parens)
    else {
        return Vec::new();
    };

    let references: Vec<_> = components
        .props
        .iter()
        .filter_map(|prop| match prop {
            PropOrSpread::Prop(p) if matches!(p.as_ref(), Prop::Shorthand(_)) => member_name(prop),
            _ => None,
        })
        .filter_map(|name| {
            imports.get(name).map(|source| ComponentReference {
                local_name: SmolStr::new(name),
                source_path: source.clone(),
            })
        })
        .collect();

    log::debug!(
        "found {} component reference(s): {:?}",
        references.len(),
        references.iter().map(|r| r.local_name.as_str()).collect::<Vec<_>>()
    );

    references
}
