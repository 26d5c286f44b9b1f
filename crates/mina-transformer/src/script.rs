//! The behavior script, parsed with swc.

use crate::error::TransformError;
use std::ops::Range;
use std::sync::Arc;
use swc_common::{BytePos, FileName, SourceMap, Span as SwcSpan, Spanned};
use swc_ecma_ast::{
    EsVersion, Expr, Ident, ImportSpecifier, Module, ModuleDecl, ModuleItem, ObjectLit, Prop,
    PropName, PropOrSpread,
};
use swc_ecma_parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use vue_parser::{ScriptLang, Span};

/// A parsed script with the text it came from.
pub struct BehaviorTree {
    /// The module AST.
    pub module: Module,
    source: String,
    start: BytePos,
}

impl BehaviorTree {
    /// Parses `source` as an ES module, or a TypeScript module for `lang="ts"`.
    pub fn parse(source: &str, lang: ScriptLang) -> Result<Self, TransformError> {
        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom("vue-script".into()).into(),
            source.to_string(),
        );

        let syntax = match lang {
            ScriptLang::TypeScript => Syntax::Typescript(TsSyntax {
                tsx: false,
                ..Default::default()
            }),
            ScriptLang::JavaScript => Syntax::Es(EsSyntax {
                jsx: false,
                ..Default::default()
            }),
        };

        let start = fm.start_pos;
        let mut recovered = Vec::new();
        let to_error = |err: swc_ecma_parser::error::Error| {
            let span = err.span();
            TransformError::ScriptParse {
                message: err.kind().msg().into_owned(),
                span: Span::from_offsets(
                    span.lo.0.saturating_sub(start.0) as usize,
                    span.hi.0.saturating_sub(start.0) as usize,
                ),
            }
        };

        let module = parse_file_as_module(&fm, syntax, EsVersion::Es2022, None, &mut recovered)
            .map_err(to_error)?;
        if let Some(err) = recovered.into_iter().next() {
            return Err(to_error(err));
        }

        log::debug!("parsed script: {} top-level items", module.body.len());

        Ok(Self {
            module,
            source: source.to_string(),
            start,
        })
    }

    /// The script text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Converts an swc span to a byte range into [`source`](Self::source).
    pub fn range(&self, span: SwcSpan) -> Range<usize> {
        let lo = span.lo.0.saturating_sub(self.start.0) as usize;
        let hi = span.hi.0.saturating_sub(self.start.0) as usize;
        lo.min(self.source.len())..hi.min(self.source.len())
    }

    /// Converts an swc span to a segment-relative [`Span`].
    pub fn span(&self, span: SwcSpan) -> Span {
        let range = self.range(span);
        Span::from_offsets(range.start, range.end)
    }

    /// The source text covered by `span`.
    pub fn text(&self, span: SwcSpan) -> &str {
        &self.source[self.range(span)]
    }

    /// Finds the `export default` item and its object literal.
    pub fn descriptor(&self) -> Result<Descriptor<'_>, TransformError> {
        for item in &self.module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) = item else {
                continue;
            };
            return match unwrap_parens(&export.expr) {
                Expr::Object(object) => Ok(Descriptor {
                    export_span: export.span,
                    object,
                }),
                other => Err(TransformError::DescriptorNotObject {
                    span: self.span(other.span()),
                }),
            };
        }

        // `export default class {}` and friends are declarations, not objects.
        for item in &self.module.body {
            if let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(decl)) = item {
                return Err(TransformError::DescriptorNotObject {
                    span: self.span(decl.span),
                });
            }
        }

        Err(TransformError::MissingDefaultExport)
    }
}

/// The component descriptor: `export default { … }`.
#[derive(Clone, Copy)]
pub struct Descriptor<'a> {
    /// The span of the whole export statement.
    pub export_span: SwcSpan,
    /// The exported object literal.
    pub object: &'a ObjectLit,
}

impl<'a> Descriptor<'a> {
    /// Looks up a top-level property value by key.
    pub fn property(&self, name: &str) -> Option<&'a Expr> {
        self.object.props.iter().find_map(|prop| match prop {
            PropOrSpread::Prop(prop) => match prop.as_ref() {
                Prop::KeyValue(kv) if prop_name(&kv.key) == Some(name) => Some(kv.value.as_ref()),
                _ => None,
            },
            PropOrSpread::Spread(_) => None,
        })
    }
}

/// Strips any parentheses around an expression.
pub(crate) fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        other => other,
    }
}

/// The local binding of an import specifier.
pub(crate) fn import_local(specifier: &ImportSpecifier) -> &Ident {
    match specifier {
        ImportSpecifier::Named(named) => &named.local,
        ImportSpecifier::Default(default) => &default.local,
        ImportSpecifier::Namespace(namespace) => &namespace.local,
    }
}

/// Gets a string key from a property name.
pub(crate) fn prop_name(key: &PropName) -> Option<&str> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.as_str()),
        PropName::Str(s) => s.value.as_str(),
        _ => None,
    }
}

/// Gets the key of an object member, if it has a static one.
pub(crate) fn member_name(prop: &PropOrSpread) -> Option<&str> {
    let PropOrSpread::Prop(prop) = prop else {
        return None;
    };
    match prop.as_ref() {
        Prop::Shorthand(ident) => Some(ident.sym.as_str()),
        Prop::KeyValue(kv) => prop_name(&kv.key),
        Prop::Method(method) => prop_name(&method.key),
        Prop::Getter(getter) => prop_name(&getter.key),
        Prop::Setter(setter) => prop_name(&setter.key),
        Prop::Assign(assign) => Some(assign.key.sym.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_find_descriptor() {
        let tree = BehaviorTree::parse(
            "import A from './a.vue'\nexport default { name: 'x', data() { return {} } }",
            ScriptLang::JavaScript,
        )
        .unwrap();
        let descriptor = tree.descriptor().unwrap();
        assert_eq!(descriptor.object.props.len(), 2);
        assert!(descriptor.property("name").is_some());
        assert!(tree.text(descriptor.export_span).starts_with("export default"));
    }

    #[test]
    fn test_typescript_script() {
        let tree = BehaviorTree::parse(
            "const n: number = 1;\nexport default { n }",
            ScriptLang::TypeScript,
        );
        assert!(tree.is_ok());
    }

    #[test]
    fn test_syntax_error_has_span() {
        let Err(err) = BehaviorTree::parse("export default {", ScriptLang::JavaScript) else {
            panic!("expected a parse error");
        };
        assert!(matches!(err, TransformError::ScriptParse { .. }));

        let source = "const a = ;\nexport default {}";
        let Err(TransformError::ScriptParse { span, .. }) =
            BehaviorTree::parse(source, ScriptLang::JavaScript)
        else {
            panic!("expected a script parse error");
        };
        let start = u32::from(span.start) as usize;
        assert_eq!(&source[start..start + 1], ";", "{span:?}");
    }

    #[test]
    fn test_missing_default_export() {
        let tree = BehaviorTree::parse("const a = 1;", ScriptLang::JavaScript).unwrap();
        assert!(matches!(
            tree.descriptor(),
            Err(TransformError::MissingDefaultExport)
        ));
    }

    #[test]
    fn test_non_object_default_export() {
        let tree = BehaviorTree::parse("export default 42;", ScriptLang::JavaScript).unwrap();
        let Err(TransformError::DescriptorNotObject { span }) = tree.descriptor() else {
            panic!("expected DescriptorNotObject");
        };
        assert_eq!(span, Span::from_offsets(15, 17));
    }
}
