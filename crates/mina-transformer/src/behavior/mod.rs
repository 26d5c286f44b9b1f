//! Behavior script transformation.
//!
//! The script is rewritten by splicing text over swc spans: instance
//! assignments become `setData` calls, `alert` becomes `wx.showModal`,
//! component imports are pruned and the `export default` descriptor is
//! rebuilt as a `Page({ … })` call. Code outside the edits keeps its
//! original formatting.

mod descriptor;
mod splice;

pub use descriptor::DescriptorSection;

use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::markup::{model_handler_name, ModelBindings};
use crate::references::ComponentReference;
use crate::script::{import_local, member_name, unwrap_parens, BehaviorTree, Descriptor};
use rustc_hash::FxHashSet;
use splice::{Piece, Splicer};
use std::ops::Range;
use swc_common::{Span as SwcSpan, Spanned};
use swc_ecma_ast::{
    ArrowExpr, AssignExpr, AssignOp, AssignTarget, BlockStmt, BlockStmtOrExpr, CallExpr, Callee,
    Expr, Function, MemberExpr, MemberProp, ModuleDecl, ModuleItem, Prop, PropOrSpread,
    SimpleAssignTarget, Stmt, UpdateExpr, UpdateOp,
};
use swc_ecma_visit::{Visit, VisitWith};

/// Rewrites the script into a mini-program page script.
pub fn transform_behavior(
    tree: &BehaviorTree,
    config: &TransformConfig,
    references: &[ComponentReference],
    model_fields: &ModelBindings,
) -> Result<String, TransformError> {
    let descriptor = tree.descriptor()?;
    let mut splicer = Splicer::new(tree.source());

    let mut rewriter = ScriptRewriter {
        tree,
        splicer: &mut splicer,
    };
    tree.module.visit_with(&mut rewriter);

    prune_component_imports(tree, references, &mut splicer);

    let page = DescriptorRewriter {
        tree,
        config,
        splicer: &mut splicer,
    }
    .rewrite(descriptor, model_fields)?;

    let mut end = tree.range(descriptor.export_span).end;
    if tree.source()[end..].starts_with(';') {
        end += 1;
    }
    splicer.replace(tree.range(descriptor.export_span).start..end, page);

    let code = splicer
        .finish()
        .replace("this.$router.", "utils.navigator.");
    let code = format!("{}\n", code.trim());

    log::debug!("behavior transformed: {} bytes", code.len());
    Ok(code)
}

/// Removes `import X from '…'` for every referenced component.
fn prune_component_imports(
    tree: &BehaviorTree,
    references: &[ComponentReference],
    splicer: &mut Splicer<'_>,
) {
    let names: FxHashSet<&str> = references.iter().map(|r| r.local_name.as_str()).collect();

    for item in &tree.module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        let [specifier] = import.specifiers.as_slice() else {
            continue;
        };
        let local = import_local(specifier);
        if !names.contains(local.sym.as_str()) {
            continue;
        }

        let range = tree.range(import.span);
        let rest = &tree.source()[range.end..];
        let newline = if rest.starts_with("\r\n") {
            2
        } else {
            usize::from(rest.starts_with('\n'))
        };
        log::trace!("pruning import of `{}`", local.sym);
        splicer.remove(range.start..range.end + newline);
    }
}

/// Collects expression-level rewrites anywhere in the script.
struct ScriptRewriter<'a, 'src> {
    tree: &'a BehaviorTree,
    splicer: &'a mut Splicer<'src>,
}

/// The key of an instance member: `this.name` or `this[expr]`.
enum MemberKey {
    Static(String),
    Computed(Range<usize>),
}

impl MemberKey {
    fn of(tree: &BehaviorTree, member: &MemberExpr) -> Option<Self> {
        match &member.prop {
            MemberProp::Ident(ident) => Some(MemberKey::Static(ident.sym.to_string())),
            MemberProp::Computed(computed) => {
                Some(MemberKey::Computed(tree.range(computed.expr.span())))
            }
            MemberProp::PrivateName(_) => None,
        }
    }

    /// `name` or `[expr]`, as an object key.
    fn key_pieces(&self) -> Vec<Piece> {
        match self {
            MemberKey::Static(name) => vec![name.as_str().into()],
            MemberKey::Computed(range) => {
                vec!["[".into(), Piece::Source(range.clone()), "]".into()]
            }
        }
    }

    /// `this.data.name` or `this.data[expr]`.
    fn current_value_pieces(&self) -> Vec<Piece> {
        match self {
            MemberKey::Static(name) => vec![format!("this.data.{name}").into()],
            MemberKey::Computed(range) => {
                vec!["this.data[".into(), Piece::Source(range.clone()), "]".into()]
            }
        }
    }
}

/// Returns the member if `expr` is `this.name` or `this[expr]`.
fn instance_member(expr: &Expr) -> Option<&MemberExpr> {
    match expr {
        Expr::Member(member) if matches!(member.obj.as_ref(), Expr::This(_)) => Some(member),
        _ => None,
    }
}

/// Returns the target member if `node` assigns to `this.name` or `this[expr]`.
fn instance_assign_target(node: &AssignExpr) -> Option<&MemberExpr> {
    match &node.left {
        AssignTarget::Simple(SimpleAssignTarget::Member(member))
            if matches!(member.obj.as_ref(), Expr::This(_)) =>
        {
            Some(member)
        }
        _ => None,
    }
}

/// Finds `this` at the root of a member chain such as `this.a.b`.
fn chain_root_this(expr: &Expr) -> Option<&MemberExpr> {
    match expr {
        Expr::Member(member) => match member.obj.as_ref() {
            Expr::This(_) => Some(member),
            inner => chain_root_this(inner),
        },
        _ => None,
    }
}

fn compound_operator(op: AssignOp) -> Option<&'static str> {
    Some(match op {
        AssignOp::Assign => return None,
        AssignOp::AddAssign => "+",
        AssignOp::SubAssign => "-",
        AssignOp::MulAssign => "*",
        AssignOp::DivAssign => "/",
        AssignOp::ModAssign => "%",
        AssignOp::LShiftAssign => "<<",
        AssignOp::RShiftAssign => ">>",
        AssignOp::ZeroFillRShiftAssign => ">>>",
        AssignOp::BitOrAssign => "|",
        AssignOp::BitXorAssign => "^",
        AssignOp::BitAndAssign => "&",
        AssignOp::ExpAssign => "**",
        AssignOp::AndAssign => "&&",
        AssignOp::OrAssign => "||",
        AssignOp::NullishAssign => "??",
    })
}

impl ScriptRewriter<'_, '_> {
    /// Replaces `span` with one `this.setData({ … })` call.
    fn set_data(&mut self, span: SwcSpan, entries: Vec<(&MemberKey, Vec<Piece>)>) {
        let mut pieces = vec![Piece::from("this.setData({ ")];
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                pieces.push(", ".into());
            }
            pieces.extend(key.key_pieces());
            pieces.push(": ".into());
            pieces.extend(value);
        }
        pieces.push(" })".into());
        self.splicer.replace(self.tree.range(span), pieces);
    }

    /// Rewrites an assignment. Returns the expression the visitor should
    /// descend into instead of the children, when the chain was consumed.
    fn rewrite_assignment<'n>(&mut self, node: &'n AssignExpr) -> Option<&'n Expr> {
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &node.left else {
            return None;
        };

        if matches!(member.obj.as_ref(), Expr::This(_)) {
            let key = MemberKey::of(self.tree, member)?;

            // `this.a = this.b = v` updates every key in one call.
            let mut links = vec![(key, node.op)];
            let mut value_expr: &Expr = &node.right;
            while let Expr::Assign(inner) = unwrap_parens(value_expr) {
                let Some(key) =
                    instance_assign_target(inner).and_then(|m| MemberKey::of(self.tree, m))
                else {
                    break;
                };
                links.push((key, inner.op));
                value_expr = &inner.right;
            }

            let mut value = vec![Piece::Source(self.tree.range(value_expr.span()))];
            let mut entries = Vec::with_capacity(links.len());
            for (key, op) in links.iter().rev() {
                if let Some(op) = compound_operator(*op) {
                    let mut current = key.current_value_pieces();
                    current.push(format!(" {op} (").into());
                    current.extend(value);
                    current.push(")".into());
                    value = current;
                }
                entries.push((key, value.clone()));
            }
            entries.reverse();

            log::trace!("assignment to `{}`", self.tree.text(member.span));
            self.set_data(node.span, entries);
            return (links.len() > 1).then_some(value_expr);
        }

        // `this.user.name = v` writes through `this.data.user`.
        if let Some(root) = chain_root_this(&member.obj) {
            let already_data =
                matches!(&root.prop, MemberProp::Ident(ident) if ident.sym.as_str() == "data");
            if !already_data {
                self.splicer
                    .insert(self.tree.range(root.obj.span()).end, ".data");
            }
        }
        None
    }

    fn rewrite_update(&mut self, node: &UpdateExpr) {
        let Some(member) = instance_member(&node.arg) else {
            return;
        };
        let Some(key) = MemberKey::of(self.tree, member) else {
            return;
        };
        let op = match node.op {
            UpdateOp::PlusPlus => " + 1",
            UpdateOp::MinusMinus => " - 1",
        };
        let mut value = key.current_value_pieces();
        value.push(op.into());
        self.set_data(node.span, vec![(&key, value)]);
    }

    fn rewrite_alert(&mut self, node: &CallExpr) {
        let Callee::Expr(callee) = &node.callee else {
            return;
        };
        if !matches!(callee.as_ref(), Expr::Ident(ident) if ident.sym.as_str() == "alert") {
            return;
        }

        let content = match node.args.first() {
            Some(arg) => Piece::Source(self.tree.range(arg.expr.span())),
            None => "''".into(),
        };
        self.splicer.replace(
            self.tree.range(node.span),
            vec![
                "wx.showModal({ title: '提示', content: ".into(),
                content,
                ", showCancel: false })".into(),
            ],
        );
    }
}

impl Visit for ScriptRewriter<'_, '_> {
    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        match self.rewrite_assignment(node) {
            Some(value) => value.visit_with(self),
            None => node.visit_children_with(self),
        }
    }

    fn visit_update_expr(&mut self, node: &UpdateExpr) {
        self.rewrite_update(node);
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        self.rewrite_alert(node);
        node.visit_children_with(self);
    }
}

/// One property of the generated page object.
struct PageMember {
    name: Option<String>,
    pieces: Vec<Piece>,
}

impl PageMember {
    fn text(name: &str, text: String) -> Self {
        Self {
            name: Some(name.to_string()),
            pieces: vec![Piece::Text(text)],
        }
    }
}

struct DescriptorRewriter<'a, 'src> {
    tree: &'a BehaviorTree,
    config: &'a TransformConfig,
    splicer: &'a mut Splicer<'src>,
}

impl DescriptorRewriter<'_, '_> {
    /// Builds the `Page({ … });` replacement for the export statement.
    fn rewrite(
        &mut self,
        descriptor: Descriptor<'_>,
        model_fields: &ModelBindings,
    ) -> Result<Vec<Piece>, TransformError> {
        let mut members = Vec::new();
        let mut flattened = Vec::new();
        let mut has_pull_down_refresh = false;
        let mut has_reach_bottom = false;

        for prop in &descriptor.object.props {
            let name = member_name(prop);
            let section = DescriptorSection::classify(name);
            match section {
                DescriptorSection::Created | DescriptorSection::BeforeDestroy => {
                    let renamed = section.renamed_hook().unwrap_or_default();
                    self.rename_hook(prop, renamed, section == DescriptorSection::Created);
                    members.push(self.kept(prop, Some(renamed)));
                }
                DescriptorSection::PullDownRefresh => {
                    has_pull_down_refresh = true;
                    members.push(self.kept(prop, name));
                }
                DescriptorSection::ReachBottom => {
                    has_reach_bottom = true;
                    members.push(self.kept(prop, name));
                }
                DescriptorSection::Data => members.push(self.data_member(prop)?),
                DescriptorSection::Computed
                | DescriptorSection::Methods
                | DescriptorSection::Filters => {
                    flattened.extend(self.section_members(prop, name.unwrap_or_default())?);
                }
                DescriptorSection::Components => {
                    log::trace!("dropping components section");
                }
                DescriptorSection::Other => members.push(self.kept(prop, name)),
            }
        }

        members.extend(flattened);

        for field in model_fields.iter() {
            let handler = model_handler_name(field);
            let key = if is_identifier(field) {
                field.to_string()
            } else {
                format!("'{}'", field.replace('\'', "\\'"))
            };
            members.push(PageMember::text(
                &handler,
                format!("{handler}(event) {{\n    this.setData({{ {key}: event.detail.value }});\n  }}"),
            ));
        }

        if !has_reach_bottom {
            members.push(PageMember::text("onReachBottom", "onReachBottom() {}".into()));
        }
        if !has_pull_down_refresh {
            members.push(PageMember::text(
                "onPullDownRefresh",
                "onPullDownRefresh() {}".into(),
            ));
        }

        members.retain(|m| match &m.name {
            Some(name) if self.config.drops_hook(name) => {
                log::trace!("dropping `{name}`");
                false
            }
            _ => true,
        });

        let mut pieces = vec![Piece::from("Page({\n")];
        for member in members {
            pieces.push("  ".into());
            pieces.extend(member.pieces);
            pieces.push(",\n".into());
        }
        pieces.push("});".into());
        Ok(pieces)
    }

    fn prop_range(&self, prop: &PropOrSpread) -> Range<usize> {
        let span = match prop {
            PropOrSpread::Prop(prop) => prop.span(),
            PropOrSpread::Spread(spread) => spread.span(),
        };
        self.tree.range(span)
    }

    /// The source range, reindented to the page object's member level.
    fn reindented(&self, range: Range<usize>) -> Piece {
        let width = line_indent(self.tree.source(), range.start).saturating_sub(2);
        Piece::Dedented(range, width)
    }

    fn kept(&self, prop: &PropOrSpread, name: Option<&str>) -> PageMember {
        PageMember {
            name: name.map(str::to_string),
            pieces: vec![self.reindented(self.prop_range(prop))],
        }
    }

    /// Renames a lifecycle hook; `created` also gains a `params` argument.
    fn rename_hook(&mut self, prop: &PropOrSpread, renamed: &str, add_params: bool) {
        let PropOrSpread::Prop(prop) = prop else {
            return;
        };
        match prop.as_ref() {
            Prop::Method(method) => {
                self.splicer
                    .replace(self.tree.range(method.key.span()), vec![renamed.into()]);
                if add_params {
                    self.append_function_param(method.key.span(), &method.function);
                }
            }
            Prop::KeyValue(kv) => {
                self.splicer
                    .replace(self.tree.range(kv.key.span()), vec![renamed.into()]);
                if add_params {
                    match unwrap_parens(&kv.value) {
                        Expr::Fn(f) => self.append_function_param(f.function.span, &f.function),
                        Expr::Arrow(arrow) => self.append_arrow_param(arrow),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn append_function_param(&mut self, head: SwcSpan, function: &Function) {
        if let Some(last) = function.params.last() {
            let at = self.tree.range(last.span).end;
            self.splicer.insert(at, ", params");
            return;
        }
        let Some(body) = &function.body else {
            return;
        };
        let from = self.tree.range(head).start;
        let to = self.tree.range(body.span).start;
        if let Some(paren) = self.tree.source()[from..to].rfind(')') {
            self.splicer.insert(from + paren, "params");
        }
    }

    fn append_arrow_param(&mut self, arrow: &ArrowExpr) {
        let head = self.tree.range(arrow.span).start;
        let body = self.tree.range(arrow.body.span()).start;
        match arrow.params.last() {
            None => {
                if let Some(paren) = self.tree.source()[head..body].rfind(')') {
                    self.splicer.insert(head + paren, "params");
                }
            }
            Some(last) => {
                let last = self.tree.range(last.span());
                if self.tree.source()[head..last.start].contains('(') {
                    self.splicer.insert(last.end, ", params");
                } else {
                    // `x => …` has no parentheses to extend.
                    self.splicer.replace(
                        last.clone(),
                        vec!["(".into(), Piece::Source(last), ", params)".into()],
                    );
                }
            }
        }
    }

    /// `data() { return {…} }` becomes `data: {…}`.
    fn data_member(&self, prop: &PropOrSpread) -> Result<PageMember, TransformError> {
        let PropOrSpread::Prop(inner) = prop else {
            return Ok(self.kept(prop, Some("data")));
        };
        let invalid = || TransformError::InvalidData {
            span: self.tree.span(inner.span()),
        };

        let object = match inner.as_ref() {
            Prop::Method(method) => returned_object(&method.function).ok_or_else(invalid)?,
            Prop::KeyValue(kv) => match unwrap_parens(&kv.value) {
                Expr::Object(_) => return Ok(self.kept(prop, Some("data"))),
                Expr::Fn(f) => returned_object(&f.function).ok_or_else(invalid)?,
                Expr::Arrow(arrow) => arrow_object(arrow).ok_or_else(invalid)?,
                _ => return Err(invalid()),
            },
            Prop::Shorthand(_) => return Ok(self.kept(prop, Some("data"))),
            _ => return Err(invalid()),
        };

        let range = self.tree.range(object);
        Ok(PageMember {
            name: Some("data".into()),
            pieces: vec!["data: ".into(), self.reindented(range)],
        })
    }

    /// The members of `methods`, `computed` or `filters`.
    fn section_members(
        &self,
        prop: &PropOrSpread,
        section: &str,
    ) -> Result<Vec<PageMember>, TransformError> {
        let invalid = || TransformError::InvalidSection {
            section: section.to_string(),
            span: self.tree.span(match prop {
                PropOrSpread::Prop(p) => p.span(),
                PropOrSpread::Spread(s) => s.span(),
            }),
        };

        let PropOrSpread::Prop(inner) = prop else {
            return Err(invalid());
        };
        let Prop::KeyValue(kv) = inner.as_ref() else {
            return Err(invalid());
        };
        let Expr::Object(object) = unwrap_parens(&kv.value) else {
            return Err(invalid());
        };

        Ok(object
            .props
            .iter()
            .map(|member| self.kept(member, member_name(member)))
            .collect())
    }
}

/// The span of the object literal a function only returns.
fn returned_object(function: &Function) -> Option<SwcSpan> {
    if !function.params.is_empty() {
        return None;
    }
    block_object(function.body.as_ref()?)
}

fn arrow_object(arrow: &ArrowExpr) -> Option<SwcSpan> {
    if !arrow.params.is_empty() {
        return None;
    }
    match arrow.body.as_ref() {
        BlockStmtOrExpr::BlockStmt(block) => block_object(block),
        BlockStmtOrExpr::Expr(expr) => match unwrap_parens(expr) {
            Expr::Object(object) => Some(object.span),
            _ => None,
        },
    }
}

fn block_object(block: &BlockStmt) -> Option<SwcSpan> {
    let [Stmt::Return(ret)] = block.stmts.as_slice() else {
        return None;
    };
    match unwrap_parens(ret.arg.as_ref()?) {
        Expr::Object(object) => Some(object.span),
        _ => None,
    }
}

/// The indentation of the line containing `offset`.
fn line_indent(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests;
