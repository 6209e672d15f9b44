//! Any-typed expressions.
//!
//! An any-typed constraint accepts every expression shape producing a value
//! of the target type. Complex types reconstruct an equivalent concrete
//! constraint (list of T becomes a list constraint over any-of-T, and so
//! on) so the generic container traversal applies; shapes without a
//! constraint equivalent — traversals, function calls, templates,
//! comprehensions — are handled here directly.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{constraint_for_type, AnyExpression, Constraint, Reference};
use crate::syntax::{Expression, ExprKind, FileFormat, ForExpr, FuncCall, TemplatePart};
use crate::types::{FunctionSignature, Type};

use super::{
    wrap, Candidate, CandidateKind, ExprContext, ExpressionView, HoverData, SemanticToken,
    TargetContext, TextEdit, TokenType,
};

pub(super) struct AnyExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a AnyExpression,
    pub ctx: ExprContext<'a>,
}

impl<'a> AnyExpr<'a> {
    fn reconstructed(&self) -> Option<Constraint> {
        constraint_for_type(&self.cons.of)
    }

    fn literal_constraint(&self) -> Constraint {
        Constraint::literal_type(self.cons.of.clone())
    }

    fn reference_constraint(&self) -> Constraint {
        Constraint::Reference(Reference {
            of_type: Some(self.cons.of.clone()),
            of_scope: None,
            name: None,
            address: None,
        })
    }

    fn signature(&self, call: &FuncCall) -> Option<&'a FunctionSignature> {
        self.ctx.functions.and_then(|f| f.get(&call.name))
    }

    /// Constraint for one call argument, from the signature when known.
    fn arg_constraint(&self, call: &FuncCall, index: usize) -> Constraint {
        let ty = self
            .signature(call)
            .and_then(|sig| sig.param_at(index))
            .map(|p| p.ty.clone())
            .unwrap_or(Type::Dynamic);
        Constraint::any(ty)
    }

    /// Constraint for one template interpolation. A single interpolation
    /// spanning the whole native template adopts the target type;
    /// everything else (embedded pieces, JSON bodies) is fully dynamic.
    fn interp_constraint(&self, parts: &[TemplatePart]) -> Constraint {
        let single = parts.len() == 1 && matches!(parts[0], TemplatePart::Interp { .. });
        if single && self.ctx.format == FileFormat::Native {
            Constraint::any(self.cons.of.clone())
        } else {
            Constraint::any(Type::Dynamic)
        }
    }

    /// Retyped constraints for the sub-expressions of a comprehension,
    /// derived from the collection's inferred type.
    fn for_constraints(&self, f: &ForExpr) -> ForConstraints {
        let coll = Constraint::any(Type::Dynamic);
        let coll_ty = wrap(&f.collection, &coll, self.ctx)
            .infer_type()
            .unwrap_or(Type::Dynamic);
        for_constraints_from(coll_ty)
    }

    /// The comprehension's sub-expressions paired with their constraints.
    fn for_parts<'b>(
        &self,
        f: &'b ForExpr,
        cons: &'b ForConstraints,
    ) -> Vec<(&'b Expression, &'b Constraint)> {
        let mut parts = vec![(&f.collection, &cons.collection)];
        if let Some(ref key) = f.key_expr {
            parts.push((key, &cons.key));
        }
        parts.push((&f.value_expr, &cons.value));
        if let Some(ref cond) = f.cond_expr {
            parts.push((cond, &cons.condition));
        }
        parts
    }

    fn function_candidates(&self, range: crate::base::Range) -> Vec<Candidate> {
        let Some(functions) = self.ctx.functions else {
            return Vec::new();
        };
        let mut names: Vec<_> = functions
            .iter()
            .filter(|(_, sig)| self.cons.of.matches(&sig.return_type))
            .collect();
        names.sort_by(|(a, _), (b, _)| a.cmp(b));
        names
            .into_iter()
            .map(|(name, sig)| {
                let mut candidate = Candidate::new(
                    name.clone(),
                    CandidateKind::Function,
                    TextEdit::new(range, format!("{name}()"))
                        .with_snippet(format!("{name}(${{1}})")),
                )
                .with_detail(sig.render(name));
                if let Some(ref description) = sig.description {
                    candidate = candidate.with_description(description.clone());
                }
                candidate
            })
            .collect()
    }

    fn fallback_view_completion(&self, pos: Pos) -> Vec<Candidate> {
        if let Some(cons) = self.reconstructed() {
            wrap(self.expr, &cons, self.ctx).completion_at_pos(pos)
        } else {
            let cons = self.literal_constraint();
            wrap(self.expr, &cons, self.ctx).completion_at_pos(pos)
        }
    }
}

pub(super) struct ForConstraints {
    collection: Constraint,
    key: Constraint,
    value: Constraint,
    condition: Constraint,
}

/// The retyping rules for comprehension sub-expressions.
///
/// List/tuple collections iterate with a numeric key; iterating a set binds
/// the key to the element itself; map/object collections key by string. The
/// value type is the element type where one exists — tuples and objects
/// have no single static element type, so their values stay fully dynamic.
pub(super) fn for_constraints_from(coll_ty: Type) -> ForConstraints {
    let key_ty = match &coll_ty {
        Type::List(_) | Type::Tuple(_) => Type::Number,
        Type::Set(elem) => (**elem).clone(),
        Type::Map(_) | Type::Object(_) => Type::String,
        _ => Type::Dynamic,
    };
    let value_ty = match coll_ty {
        Type::List(elem) | Type::Set(elem) | Type::Map(elem) => *elem,
        _ => Type::Dynamic,
    };
    ForConstraints {
        collection: Constraint::any(Type::Dynamic),
        key: Constraint::any(key_ty),
        value: Constraint::any(value_ty),
        condition: Constraint::any(Type::Bool),
    }
}

impl ExpressionView for AnyExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        match &self.expr.kind {
            ExprKind::Traversal(_) => {
                let cons = self.reference_constraint();
                wrap(self.expr, &cons, self.ctx).completion_at_pos(pos)
            }
            ExprKind::FuncCall(call) => {
                for (i, arg) in call.args.iter().enumerate() {
                    if arg.range.contains_or_ends_at(pos) {
                        let cons = self.arg_constraint(call, i);
                        return wrap(arg, &cons, self.ctx).completion_at_pos(pos);
                    }
                }
                if call.args_range.interior_contains(pos) {
                    if let Some((i, arg)) = call
                        .args
                        .iter()
                        .enumerate()
                        .find(|(_, a)| a.is_unset())
                    {
                        let cons = self.arg_constraint(call, i);
                        return wrap(arg, &cons, self.ctx).completion_at_pos(pos);
                    }
                }
                Vec::new()
            }
            ExprKind::For(f) => {
                let constraints = self.for_constraints(f);
                for (part, cons) in self.for_parts(f, &constraints) {
                    if part.range.contains_or_ends_at(pos) {
                        return wrap(part, cons, self.ctx).completion_at_pos(pos);
                    }
                }
                Vec::new()
            }
            ExprKind::Template(parts) => {
                let cons = self.interp_constraint(parts);
                for part in parts {
                    if let TemplatePart::Interp { expr, range } = part {
                        if range.contains_or_ends_at(pos) {
                            return wrap(expr, &cons, self.ctx).completion_at_pos(pos);
                        }
                    }
                }
                Vec::new()
            }
            ExprKind::Paren(inner) => {
                let cons = Constraint::any(self.cons.of.clone());
                wrap(inner, &cons, self.ctx).completion_at_pos(pos)
            }
            ExprKind::Unset => {
                let mut out = self.fallback_view_completion(pos);
                let refc = self.reference_constraint();
                out.extend(wrap(self.expr, &refc, self.ctx).completion_at_pos(pos));
                out.extend(self.function_candidates(self.expr.range));
                out
            }
            _ => self.fallback_view_completion(pos),
        }
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        match &self.expr.kind {
            ExprKind::Traversal(_) => {
                let cons = self.reference_constraint();
                wrap(self.expr, &cons, self.ctx).hover_at_pos(pos)
            }
            ExprKind::FuncCall(call) => {
                for (i, arg) in call.args.iter().enumerate() {
                    if arg.range.contains_or_ends_at(pos) {
                        let cons = self.arg_constraint(call, i);
                        if let Some(hover) = wrap(arg, &cons, self.ctx).hover_at_pos(pos) {
                            return Some(hover);
                        }
                    }
                }
                let sig = self.signature(call)?;
                let mut content = format!("`{}`", sig.render(&call.name));
                if let Some(ref description) = sig.description {
                    content.push_str("\n\n");
                    content.push_str(description);
                }
                Some(HoverData {
                    content,
                    range: self.expr.range,
                })
            }
            ExprKind::For(f) => {
                let constraints = self.for_constraints(f);
                for (part, cons) in self.for_parts(f, &constraints) {
                    if part.range.contains_or_ends_at(pos) {
                        return wrap(part, cons, self.ctx).hover_at_pos(pos);
                    }
                }
                None
            }
            ExprKind::Template(parts) => {
                if self.expr.static_string().is_some() {
                    let cons = Constraint::literal_type(Type::String);
                    return wrap(self.expr, &cons, self.ctx).hover_at_pos(pos);
                }
                let cons = self.interp_constraint(parts);
                for part in parts {
                    if let TemplatePart::Interp { expr, range } = part {
                        if range.contains_or_ends_at(pos) {
                            return wrap(expr, &cons, self.ctx).hover_at_pos(pos);
                        }
                    }
                }
                None
            }
            ExprKind::Paren(inner) => {
                let cons = Constraint::any(self.cons.of.clone());
                wrap(inner, &cons, self.ctx).hover_at_pos(pos)
            }
            _ => {
                if let Some(cons) = self.reconstructed() {
                    wrap(self.expr, &cons, self.ctx).hover_at_pos(pos)
                } else {
                    let cons = self.literal_constraint();
                    wrap(self.expr, &cons, self.ctx).hover_at_pos(pos)
                }
            }
        }
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        match &self.expr.kind {
            ExprKind::Traversal(_) => {
                let cons = self.reference_constraint();
                wrap(self.expr, &cons, self.ctx).semantic_tokens()
            }
            ExprKind::FuncCall(call) => {
                if self.signature(call).is_none() {
                    return Vec::new();
                }
                let mut tokens = vec![SemanticToken::new(TokenType::FunctionName, call.name_range)];
                for (i, arg) in call.args.iter().enumerate() {
                    let cons = self.arg_constraint(call, i);
                    tokens.extend(wrap(arg, &cons, self.ctx).semantic_tokens());
                }
                tokens
            }
            ExprKind::For(f) => {
                let constraints = self.for_constraints(f);
                self.for_parts(f, &constraints)
                    .into_iter()
                    .flat_map(|(part, cons)| wrap(part, cons, self.ctx).semantic_tokens())
                    .collect()
            }
            ExprKind::Template(parts) => {
                let cons = self.interp_constraint(parts);
                let mut tokens = Vec::new();
                for part in parts {
                    match part {
                        TemplatePart::Literal { range, .. } => {
                            tokens.push(SemanticToken::new(TokenType::String, *range));
                        }
                        TemplatePart::Interp { expr, .. } => {
                            tokens.extend(wrap(expr, &cons, self.ctx).semantic_tokens());
                        }
                    }
                }
                tokens
            }
            ExprKind::Paren(inner) => {
                let cons = Constraint::any(self.cons.of.clone());
                wrap(inner, &cons, self.ctx).semantic_tokens()
            }
            _ => {
                if let Some(cons) = self.reconstructed() {
                    wrap(self.expr, &cons, self.ctx).semantic_tokens()
                } else {
                    let cons = self.literal_constraint();
                    wrap(self.expr, &cons, self.ctx).semantic_tokens()
                }
            }
        }
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        match &self.expr.kind {
            ExprKind::Traversal(_) => {
                let cons = self.reference_constraint();
                wrap(self.expr, &cons, self.ctx).reference_origins(allow_self_refs)
            }
            ExprKind::FuncCall(call) => {
                let mut origins = Vec::new();
                for (i, arg) in call.args.iter().enumerate() {
                    let cons = self.arg_constraint(call, i);
                    origins.extend(wrap(arg, &cons, self.ctx).reference_origins(allow_self_refs));
                }
                origins
            }
            ExprKind::For(f) => {
                let constraints = self.for_constraints(f);
                self.for_parts(f, &constraints)
                    .into_iter()
                    .flat_map(|(part, cons)| {
                        wrap(part, cons, self.ctx).reference_origins(allow_self_refs)
                    })
                    .collect()
            }
            ExprKind::Template(parts) => {
                let cons = self.interp_constraint(parts);
                parts
                    .iter()
                    .filter_map(|part| match part {
                        TemplatePart::Interp { expr, .. } => Some(expr),
                        TemplatePart::Literal { .. } => None,
                    })
                    .flat_map(|expr| wrap(expr, &cons, self.ctx).reference_origins(allow_self_refs))
                    .collect()
            }
            ExprKind::Paren(inner) => {
                let cons = Constraint::any(self.cons.of.clone());
                wrap(inner, &cons, self.ctx).reference_origins(allow_self_refs)
            }
            _ => {
                if let Some(cons) = self.reconstructed() {
                    wrap(self.expr, &cons, self.ctx).reference_origins(allow_self_refs)
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        if let Some(cons) = self.reconstructed() {
            return wrap(self.expr, &cons, self.ctx).reference_targets(target_ctx);
        }
        let Some(tctx) = target_ctx else {
            return Vec::new();
        };
        let ty = if tctx.infer_type { self.infer_type() } else { None };
        vec![tctx.base_target(ty)]
    }

    fn infer_type(&self) -> Option<Type> {
        match &self.expr.kind {
            ExprKind::Literal(value) => Some(value.ty()),
            ExprKind::Template(_) => Some(Type::String),
            ExprKind::Traversal(_) => {
                if self.cons.of.is_dynamic() {
                    None
                } else {
                    Some(self.cons.of.clone())
                }
            }
            ExprKind::FuncCall(call) => self.signature(call).map(|sig| sig.return_type.clone()),
            ExprKind::Paren(inner) => {
                let cons = Constraint::any(self.cons.of.clone());
                wrap(inner, &cons, self.ctx).infer_type()
            }
            ExprKind::Unset => Some(self.cons.of.clone()),
            ExprKind::Tuple(items) => {
                if let Some(cons) = self.reconstructed() {
                    return wrap(self.expr, &cons, self.ctx).infer_type();
                }
                if !self.cons.of.is_dynamic() {
                    return None;
                }
                // Structural inference for untyped containers.
                let dynamic = Constraint::any(Type::Dynamic);
                Some(Type::Tuple(
                    items
                        .iter()
                        .map(|item| {
                            wrap(item, &dynamic, self.ctx)
                                .infer_type()
                                .unwrap_or(Type::Dynamic)
                        })
                        .collect(),
                ))
            }
            ExprKind::Object(items) => {
                if let Some(cons) = self.reconstructed() {
                    return wrap(self.expr, &cons, self.ctx).infer_type();
                }
                if !self.cons.of.is_dynamic() {
                    return None;
                }
                let dynamic = Constraint::any(Type::Dynamic);
                let mut object = crate::types::ObjectType::default();
                for item in items {
                    let Some(key) = item.key.static_string() else {
                        continue;
                    };
                    let ty = wrap(&item.value, &dynamic, self.ctx)
                        .infer_type()
                        .unwrap_or(Type::Dynamic);
                    object.attributes.insert(key, ty);
                }
                Some(Type::Object(object))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::syntax::{Traversal, TraverseStep, Value};
    use crate::types::{FunctionTable, Parameter};

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn ctx(src: &str) -> ExprContext<'_> {
        ExprContext::new(FileFormat::Native, src)
    }

    fn traversal(names: &[&str], start: usize) -> Expression {
        let mut steps = Vec::new();
        let mut offset = start;
        for (i, name) in names.iter().enumerate() {
            let end = offset + name.len();
            if i == 0 {
                steps.push(TraverseStep::Root {
                    name: (*name).into(),
                    range: r(offset, end),
                });
            } else {
                steps.push(TraverseStep::Attr {
                    name: (*name).into(),
                    range: r(offset - 1, end),
                });
            }
            offset = end + 1;
        }
        Expression::new(
            ExprKind::Traversal(Traversal { steps }),
            r(start, offset - 1),
        )
    }

    #[test]
    fn test_traversal_origin_carries_target_type() {
        let cons = Constraint::any(Type::String);
        let expr = traversal(&["var", "region"], 0);
        let view = wrap(&expr, &cons, ctx("var.region"));

        let origins = view.reference_origins(false);
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].constraints()[0].of_type, Some(Type::String));
    }

    #[test]
    fn test_complex_type_reconstruction() {
        // Any(list of string) over a tuple node behaves like a list.
        let cons = Constraint::any(Type::list(Type::String));
        let item = Expression::literal(Value::string("a"), r(1, 4));
        let expr = Expression::new(ExprKind::Tuple(vec![item]), r(0, 5));
        let view = wrap(&expr, &cons, ctx("[\"a\"]"));

        let hover = view.hover_at_pos(Pos::new(0, 2, 2)).unwrap();
        assert_eq!(hover.content, "`\"a\"` _string_");
        assert_eq!(view.infer_type(), Some(Type::list(Type::String)));
    }

    #[test]
    fn test_function_call_tokens_and_infer() {
        let mut functions = FunctionTable::default();
        functions.insert(
            "join".into(),
            FunctionSignature::new(
                vec![Parameter::new("sep", Type::String)],
                Type::String,
            ),
        );
        let cons = Constraint::any(Type::String);
        // join(",")
        let call = FuncCall {
            name: "join".into(),
            name_range: r(0, 4),
            args: vec![Expression::literal(Value::string(","), r(5, 8))],
            args_range: r(4, 9),
        };
        let expr = Expression::new(ExprKind::FuncCall(call), r(0, 9));
        let src = "join(\",\")";
        let ctx = ExprContext::new(FileFormat::Native, src).with_functions(&functions);
        let view = wrap(&expr, &cons, ctx);

        let tokens = view.semantic_tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::FunctionName);
        assert_eq!(tokens[1].token_type, TokenType::String);
        assert_eq!(view.infer_type(), Some(Type::String));
    }

    #[test]
    fn test_unknown_function_is_silent() {
        let cons = Constraint::any(Type::String);
        let call = FuncCall {
            name: "mystery".into(),
            name_range: r(0, 7),
            args: vec![],
            args_range: r(7, 9),
        };
        let expr = Expression::new(ExprKind::FuncCall(call), r(0, 9));
        let view = wrap(&expr, &cons, ctx("mystery()"));
        assert!(view.semantic_tokens().is_empty());
        assert!(view.infer_type().is_none());
    }

    #[test]
    fn test_unset_offers_functions_matching_type() {
        let mut functions = FunctionTable::default();
        functions.insert(
            "len".into(),
            FunctionSignature::new(vec![Parameter::new("v", Type::Dynamic)], Type::Number),
        );
        functions.insert(
            "upper".into(),
            FunctionSignature::new(vec![Parameter::new("s", Type::String)], Type::String),
        );
        let cons = Constraint::any(Type::Number);
        let expr = Expression::unset(r(8, 8));
        let ctx = ExprContext::new(FileFormat::Native, "count = ").with_functions(&functions);
        let view = wrap(&expr, &cons, ctx);

        let candidates = view.completion_at_pos(Pos::new(0, 8, 8));
        let function_labels: Vec<_> = candidates
            .iter()
            .filter(|c| c.kind == CandidateKind::Function)
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(function_labels, vec!["len"]);
    }

    #[test]
    fn test_template_single_interp_origin_adopts_type() {
        let cons = Constraint::any(Type::Number);
        let inner = traversal(&["var", "port"], 3);
        let parts = vec![TemplatePart::Interp {
            expr: inner,
            range: r(1, 12),
        }];
        let expr = Expression::new(ExprKind::Template(parts), r(0, 13));
        let view = wrap(&expr, &cons, ctx("\"${var.port}\""));

        let origins = view.reference_origins(false);
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].constraints()[0].of_type, Some(Type::Number));
    }

    #[test]
    fn test_json_template_origin_is_dynamic() {
        let cons = Constraint::any(Type::Number);
        let inner = traversal(&["var", "port"], 3);
        let parts = vec![TemplatePart::Interp {
            expr: inner,
            range: r(1, 12),
        }];
        let expr = Expression::new(ExprKind::Template(parts), r(0, 13));
        let ctx = ExprContext::new(FileFormat::Json, "\"${var.port}\"");
        let view = wrap(&expr, &cons, ctx);

        let origins = view.reference_origins(false);
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].constraints()[0].of_type, Some(Type::Dynamic));
    }

    #[test]
    fn test_for_retyping_per_collection_type() {
        let fc = for_constraints_from(Type::list(Type::String));
        assert_eq!(fc.key, Constraint::any(Type::Number));
        assert_eq!(fc.value, Constraint::any(Type::String));
        assert_eq!(fc.condition, Constraint::any(Type::Bool));

        // Sets reuse their element type as the key type.
        let fc = for_constraints_from(Type::set(Type::String));
        assert_eq!(fc.key, Constraint::any(Type::String));
        assert_eq!(fc.value, Constraint::any(Type::String));

        let fc = for_constraints_from(Type::map(Type::Number));
        assert_eq!(fc.key, Constraint::any(Type::String));
        assert_eq!(fc.value, Constraint::any(Type::Number));

        // Tuples iterate numerically but have no single element type.
        let fc = for_constraints_from(Type::Tuple(vec![Type::Bool, Type::String]));
        assert_eq!(fc.key, Constraint::any(Type::Number));
        assert_eq!(fc.value, Constraint::any(Type::Dynamic));

        let fc = for_constraints_from(Type::Object(crate::types::ObjectType::default()));
        assert_eq!(fc.key, Constraint::any(Type::String));
        assert_eq!(fc.value, Constraint::any(Type::Dynamic));
    }

    #[test]
    fn test_for_parts_collect_origins() {
        // [for v in var.items : var.prefix]
        let coll = traversal(&["var", "items"], 10);
        let value = traversal(&["var", "prefix"], 22);
        let f = ForExpr {
            key_var: None,
            value_var: "v".into(),
            collection: coll,
            key_expr: None,
            value_expr: value,
            cond_expr: None,
        };
        let cons = Constraint::any(Type::list(Type::Dynamic));
        let expr = Expression::new(ExprKind::For(Box::new(f)), r(0, 33));
        let view = wrap(&expr, &cons, ctx("[for v in var.items : var.prefix]"));

        let origins = view.reference_origins(false);
        let addrs: Vec<_> = origins.iter().map(|o| o.address().to_string()).collect();
        assert_eq!(addrs, vec!["var.items", "var.prefix"]);
    }

    #[test]
    fn test_structural_inference_for_dynamic_object() {
        let cons = Constraint::any(Type::Dynamic);
        let items = vec![crate::syntax::ObjectItem {
            key: Expression::symbol("port", r(2, 6)),
            value: Expression::literal(Value::number(80.0), r(9, 11)),
            range: r(2, 11),
        }];
        let expr = Expression::new(ExprKind::Object(items), r(0, 13));
        let view = wrap(&expr, &cons, ctx("{ port = 80 }"));

        match view.infer_type() {
            Some(Type::Object(object)) => {
                assert_eq!(object.attributes["port"], Type::Number);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }
}
