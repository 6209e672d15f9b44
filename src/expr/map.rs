//! Map constrained expressions.
//!
//! Keys are free-form literal strings (bare or quoted); the element
//! constraint governs every value. Interpolated `(expr)` keys are only
//! recognized when the schema allows them, by retyping the inner expression
//! as a plain string expression and recursing.

use smol_str::SmolStr;

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{Constraint, Map};
use crate::syntax::{Expression, ExprKind, FileFormat, ObjectItem};
use crate::types::Type;

use super::{
    child_at_pos, container_candidate, container_hover, hover_primitive, last_item_end_before,
    new_item_allowed, output::kind_for_constraint, wrap, Candidate, ExprContext, ExpressionView,
    HoverData, SemanticToken, TargetContext, TextEdit, TokenType,
};

pub(super) struct MapExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a Map,
    pub ctx: ExprContext<'a>,
}

pub(super) enum KeyKind<'a> {
    Literal(SmolStr),
    Interpolated(&'a Expression),
    Unsupported,
}

/// Classify an item key: literal (bare or quoted) or interpolated.
pub(super) fn classify_key(key: &Expression) -> KeyKind<'_> {
    match &key.kind {
        ExprKind::Symbol(s) if crate::syntax::is_bare_key(s) => KeyKind::Literal(s.clone()),
        ExprKind::Symbol(_) => KeyKind::Unsupported,
        ExprKind::Literal(crate::syntax::Value::String(s)) => KeyKind::Literal(s.clone()),
        ExprKind::Template(_) => match key.static_string() {
            Some(s) => KeyKind::Literal(s),
            None => KeyKind::Unsupported,
        },
        ExprKind::Paren(inner) => KeyKind::Interpolated(inner),
        _ => KeyKind::Unsupported,
    }
}

impl<'a> MapExpr<'a> {
    fn constraint(&self) -> Constraint {
        Constraint::Map(self.cons.clone())
    }

    fn items(&self) -> Option<&'a [ObjectItem]> {
        match &self.expr.kind {
            ExprKind::Object(items) => Some(items),
            _ => None,
        }
    }

    fn elem_type(&self) -> Type {
        self.cons
            .elem
            .as_ref()
            .and_then(|e| e.declared_type())
            .unwrap_or(Type::Dynamic)
    }

    /// Interpolated keys recurse with the inner expression retyped as a
    /// plain string expression. JSON bodies skip this: their interpolations
    /// cannot be statically typed the same way.
    fn interpolated_keys_active(&self) -> bool {
        self.cons.allow_interpolated_keys && self.ctx.format == FileFormat::Native
    }
}

impl ExpressionView for MapExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        if self.expr.is_unset() {
            return vec![container_candidate(&self.constraint(), self.expr.range)];
        }
        let Some(items) = self.items() else {
            return Vec::new();
        };
        if !self.expr.range.interior_contains(pos) {
            return Vec::new();
        }
        let Some(elem) = self.cons.elem.as_deref() else {
            return Vec::new();
        };
        if let Some((_, item)) = child_at_pos(items, |i| i.range, pos) {
            if item.value.range.contains_or_ends_at(pos) || item.value.is_unset() {
                return wrap(&item.value, elem, self.ctx).completion_at_pos(pos);
            }
            // Keys are free-form; nothing to offer inside one.
            return Vec::new();
        }
        let from = last_item_end_before(items, |i| i.range, pos)
            .unwrap_or(self.expr.range.start.byte + 1);
        if new_item_allowed(self.ctx.src, from, pos.byte) {
            let range = crate::base::Range::at(self.expr.range.file, pos);
            let snippet = format!("\"${{1:key}}\" = {}", elem.snippet(2));
            let plain = super::strip_placeholders(&snippet);
            return vec![
                Candidate::new(
                    "\"key\"",
                    kind_for_constraint(elem),
                    TextEdit::new(range, plain).with_snippet(snippet),
                )
                .with_detail(self.elem_type().friendly_name()),
            ];
        }
        Vec::new()
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        if let Some(items) = self.items() {
            if self.expr.range.interior_contains(pos) {
                if let Some((_, item)) = child_at_pos(items, |i| i.range, pos) {
                    if let Some(hover) = self.item_hover(item, pos) {
                        return Some(hover);
                    }
                }
            }
        } else if !self.expr.is_unset() {
            return None;
        }
        Some(container_hover(&self.constraint(), self.expr.range))
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        let (Some(items), Some(elem)) = (self.items(), self.cons.elem.as_deref()) else {
            return Vec::new();
        };
        let mut tokens = Vec::new();
        for item in items {
            match classify_key(&item.key) {
                KeyKind::Literal(_) => {
                    tokens.push(SemanticToken::new(TokenType::MapKey, item.key.range));
                }
                KeyKind::Interpolated(inner) if self.interpolated_keys_active() => {
                    let string_expr = Constraint::any(Type::String);
                    tokens.extend(wrap(inner, &string_expr, self.ctx).semantic_tokens());
                }
                _ => continue,
            }
            tokens.extend(wrap(&item.value, elem, self.ctx).semantic_tokens());
        }
        tokens
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        let (Some(items), Some(elem)) = (self.items(), self.cons.elem.as_deref()) else {
            return Vec::new();
        };
        let mut origins = Vec::new();
        for item in items {
            if let KeyKind::Interpolated(inner) = classify_key(&item.key) {
                if self.interpolated_keys_active() {
                    let string_expr = Constraint::any(Type::String);
                    origins.extend(
                        wrap(inner, &string_expr, self.ctx).reference_origins(allow_self_refs),
                    );
                }
            }
            origins.extend(wrap(&item.value, elem, self.ctx).reference_origins(allow_self_refs));
        }
        origins
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        let Some(tctx) = target_ctx else {
            return Vec::new();
        };
        let ty = if tctx.infer_type { self.infer_type() } else { None };
        let mut base = tctx.base_target(ty);
        if tctx.infer_type {
            if let (Some(items), Some(elem)) = (self.items(), self.cons.elem.as_deref()) {
                for item in items {
                    let KeyKind::Literal(key) = classify_key(&item.key) else {
                        continue;
                    };
                    let child_ctx = tctx.nested(tctx.addr.index_str(key), item.value.range);
                    base.nested.extend(
                        wrap(&item.value, elem, self.ctx).reference_targets(Some(&child_ctx)),
                    );
                }
            }
        }
        vec![base]
    }

    fn infer_type(&self) -> Option<Type> {
        if self.expr.is_unset() {
            return Some(Type::map(self.elem_type()));
        }
        let items = self.items()?;
        let elem_ty = items
            .first()
            .zip(self.cons.elem.as_deref())
            .and_then(|(item, elem)| wrap(&item.value, elem, self.ctx).infer_type())
            .unwrap_or_else(|| self.elem_type());
        Some(Type::map(elem_ty))
    }
}

impl MapExpr<'_> {
    fn item_hover(&self, item: &ObjectItem, pos: Pos) -> Option<HoverData> {
        if item.key.range.contains_or_ends_at(pos) {
            match classify_key(&item.key) {
                KeyKind::Literal(key) => {
                    return Some(HoverData {
                        content: hover_primitive(&key, "string"),
                        range: item.key.range,
                    });
                }
                KeyKind::Interpolated(inner) if self.interpolated_keys_active() => {
                    let string_expr = Constraint::any(Type::String);
                    return wrap(inner, &string_expr, self.ctx).hover_at_pos(pos);
                }
                _ => return None,
            }
        }
        let elem = self.cons.elem.as_deref()?;
        if item.value.range.contains_or_ends_at(pos) {
            return wrap(&item.value, elem, self.ctx).hover_at_pos(pos);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::syntax::Value;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn ctx(src: &str) -> ExprContext<'_> {
        ExprContext::new(FileFormat::Native, src)
    }

    fn number_map() -> Constraint {
        Constraint::map(Constraint::literal_type(Type::Number))
    }

    fn item(key: Expression, value: Expression) -> ObjectItem {
        let range = Range::new(key.range.file, key.range.start, value.range.end);
        ObjectItem { key, value, range }
    }

    #[test]
    fn test_empty_map_hover() {
        let cons = number_map();
        let expr = Expression::new(ExprKind::Object(Vec::new()), r(8, 10));
        let view = wrap(&expr, &cons, ctx("sizes = {}"));

        let hover = view.hover_at_pos(Pos::new(0, 9, 9)).unwrap();
        assert_eq!(hover.content, "_map of number_");
        assert_eq!(hover.range, r(8, 10));
    }

    #[test]
    fn test_key_and_value_hover() {
        // sizes = { small = 1 }
        let cons = number_map();
        let items = vec![item(
            Expression::symbol("small", r(10, 15)),
            Expression::literal(Value::number(1.0), r(18, 19)),
        )];
        let expr = Expression::new(ExprKind::Object(items), r(8, 21));
        let view = wrap(&expr, &cons, ctx("sizes = { small = 1 }"));

        let key_hover = view.hover_at_pos(Pos::new(0, 12, 12)).unwrap();
        assert_eq!(key_hover.content, "`small` _string_");

        let value_hover = view.hover_at_pos(Pos::new(0, 18, 18)).unwrap();
        assert_eq!(value_hover.content, "`1` _number_");
    }

    #[test]
    fn test_key_tokens() {
        let cons = number_map();
        let items = vec![item(
            Expression::literal(Value::string("small"), r(10, 17)),
            Expression::literal(Value::number(1.0), r(20, 21)),
        )];
        let expr = Expression::new(ExprKind::Object(items), r(8, 23));
        let view = wrap(&expr, &cons, ctx("sizes = { \"small\" = 1 }"));

        let tokens = view.semantic_tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::MapKey);
        assert_eq!(tokens[1].token_type, TokenType::Number);
    }

    #[test]
    fn test_interpolated_key_requires_allowance() {
        let inner = Expression::literal(Value::string("k"), r(11, 14));
        let key = Expression::new(ExprKind::Paren(Box::new(inner)), r(10, 15));
        let items = vec![item(key, Expression::literal(Value::number(1.0), r(18, 19)))];
        let expr = Expression::new(ExprKind::Object(items), r(8, 21));

        let plain = number_map();
        let view = wrap(&expr, &plain, ctx("sizes = { (\"k\") = 1 }"));
        // Only the value token; the key is not recognized.
        assert_eq!(view.semantic_tokens().len(), 1);

        let mut allowing = Map::default();
        allowing.elem = Some(Box::new(Constraint::literal_type(Type::Number)));
        allowing.allow_interpolated_keys = true;
        let allowing = Constraint::Map(allowing);
        let view = wrap(&expr, &allowing, ctx("sizes = { (\"k\") = 1 }"));
        // Inner string literal token plus the value token.
        assert_eq!(view.semantic_tokens().len(), 2);
    }

    #[test]
    fn test_new_entry_candidate_in_gap() {
        let cons = number_map();
        let expr = Expression::new(ExprKind::Object(Vec::new()), r(8, 12));
        let view = wrap(&expr, &cons, ctx("sizes = {  }"));

        let candidates = view.completion_at_pos(Pos::new(0, 10, 10));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label.as_str(), "\"key\"");
        let snippet = candidates[0].edit.snippet.as_deref().unwrap();
        assert_eq!(snippet, "\"${1:key}\" = ${2:0}");
    }

    #[test]
    fn test_nested_targets_per_key() {
        let cons = number_map();
        let items = vec![item(
            Expression::symbol("small", r(10, 15)),
            Expression::literal(Value::number(1.0), r(18, 19)),
        )];
        let expr = Expression::new(ExprKind::Object(items), r(8, 21));
        let view = wrap(&expr, &cons, ctx("sizes = { small = 1 }"));

        let tctx = TargetContext {
            addr: crate::refs::Address::root("var").attr("sizes"),
            name: None,
            scope_id: None,
            infer_type: true,
            range: Some(r(0, 21)),
            def_range: None,
            visible_in: None,
        };
        let targets = view.reference_targets(Some(&tctx));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].nested.len(), 1);
        assert_eq!(
            targets[0].nested[0].addr.to_string(),
            "var.sizes[\"small\"]"
        );
        assert_eq!(targets[0].nested[0].ty, Some(Type::Number));
    }
}
