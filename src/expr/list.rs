//! List constrained expressions.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{Constraint, List};
use crate::syntax::{Expression, ExprKind};
use crate::types::Type;

use super::{
    child_at_pos, container_candidate, container_hover, last_item_end_before, new_item_allowed,
    value_candidate, wrap, Candidate, ExprContext, ExpressionView, HoverData, SemanticToken,
    TargetContext,
};

pub(super) struct ListExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a List,
    pub ctx: ExprContext<'a>,
}

impl<'a> ListExpr<'a> {
    fn constraint(&self) -> Constraint {
        Constraint::List(self.cons.clone())
    }

    fn items(&self) -> Option<&'a [Expression]> {
        match &self.expr.kind {
            ExprKind::Tuple(items) => Some(items),
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
}

impl ExpressionView for ListExpr<'_> {
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
        if let Some((_, child)) = child_at_pos(items, |e| e.range, pos) {
            return wrap(child, elem, self.ctx).completion_at_pos(pos);
        }
        let from = last_item_end_before(items, |e| e.range, pos)
            .unwrap_or(self.expr.range.start.byte + 1);
        if new_item_allowed(self.ctx.src, from, pos.byte) {
            let range = crate::base::Range::at(self.expr.range.file, pos);
            return vec![value_candidate(elem, range)];
        }
        Vec::new()
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        if let Some(items) = self.items() {
            if self.expr.range.interior_contains(pos) {
                if let (Some((_, child)), Some(elem)) =
                    (child_at_pos(items, |e| e.range, pos), self.cons.elem.as_deref())
                {
                    if let Some(hover) = wrap(child, elem, self.ctx).hover_at_pos(pos) {
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
        items
            .iter()
            .flat_map(|item| wrap(item, elem, self.ctx).semantic_tokens())
            .collect()
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        let (Some(items), Some(elem)) = (self.items(), self.cons.elem.as_deref()) else {
            return Vec::new();
        };
        items
            .iter()
            .flat_map(|item| wrap(item, elem, self.ctx).reference_origins(allow_self_refs))
            .collect()
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        let Some(tctx) = target_ctx else {
            return Vec::new();
        };
        let ty = if tctx.infer_type { self.infer_type() } else { None };
        let mut base = tctx.base_target(ty);
        if tctx.infer_type {
            if let (Some(items), Some(elem)) = (self.items(), self.cons.elem.as_deref()) {
                for (i, item) in items.iter().enumerate() {
                    let child_ctx = tctx.nested(tctx.addr.index_num(i as f64), item.range);
                    base.nested
                        .extend(wrap(item, elem, self.ctx).reference_targets(Some(&child_ctx)));
                }
            }
        }
        vec![base]
    }

    fn infer_type(&self) -> Option<Type> {
        if self.expr.is_unset() {
            return Some(Type::list(self.elem_type()));
        }
        let items = self.items()?;
        let elem_ty = items
            .first()
            .zip(self.cons.elem.as_deref())
            .and_then(|(item, elem)| wrap(item, elem, self.ctx).infer_type())
            .unwrap_or_else(|| self.elem_type());
        Some(Type::list(elem_ty))
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
        ExprContext::new(crate::syntax::FileFormat::Native, src)
    }

    fn string_list() -> Constraint {
        Constraint::list(Constraint::literal_type(Type::String))
    }

    #[test]
    fn test_empty_list_hover_spans_delimiters() {
        // items = []
        let cons = string_list();
        let expr = Expression::new(ExprKind::Tuple(Vec::new()), r(8, 10));
        let view = wrap(&expr, &cons, ctx("items = []"));

        let hover = view.hover_at_pos(Pos::new(0, 9, 9)).unwrap();
        assert_eq!(hover.content, "_list of string_");
        assert_eq!(hover.range, r(8, 10));
    }

    #[test]
    fn test_multiline_empty_list_hover_spans_delimiters() {
        let cons = string_list();
        let range = Range::from_coords(FileId::new(0), (0, 8, 8), (2, 1, 12));
        let expr = Expression::new(ExprKind::Tuple(Vec::new()), range);
        let view = wrap(&expr, &cons, ctx("items = [\n\n]"));

        let hover = view.hover_at_pos(Pos::new(1, 0, 10)).unwrap();
        assert_eq!(hover.range, range);
        assert_eq!(hover.content, "_list of string_");
    }

    #[test]
    fn test_hover_recurses_into_item() {
        // items = ["a"]
        let cons = string_list();
        let item = Expression::literal(Value::string("a"), r(9, 12));
        let expr = Expression::new(ExprKind::Tuple(vec![item]), r(8, 13));
        let view = wrap(&expr, &cons, ctx("items = [\"a\"]"));

        let hover = view.hover_at_pos(Pos::new(0, 10, 10)).unwrap();
        assert_eq!(hover.content, "`\"a\"` _string_");
        assert_eq!(hover.range, r(9, 12));
    }

    #[test]
    fn test_unset_completion_offers_whole_container() {
        let cons = string_list();
        let expr = Expression::unset(r(8, 8));
        let view = wrap(&expr, &cons, ctx("items = "));

        let candidates = view.completion_at_pos(Pos::new(0, 8, 8));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label.as_str(), "[ ]");
        assert_eq!(candidates[0].detail.as_deref(), Some("list of string"));
    }

    #[test]
    fn test_gap_completion_offers_new_item() {
        // items = ["a", ]
        let cons = string_list();
        let item = Expression::literal(Value::string("a"), r(9, 12));
        let expr = Expression::new(ExprKind::Tuple(vec![item]), r(8, 15));
        let view = wrap(&expr, &cons, ctx("items = [\"a\", ]"));

        let candidates = view.completion_at_pos(Pos::new(0, 14, 14));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label.as_str(), "string");
    }

    #[test]
    fn test_gap_with_trailing_garbage_suppresses() {
        // items = ["a" x ]
        let cons = string_list();
        let item = Expression::literal(Value::string("a"), r(9, 12));
        let expr = Expression::new(ExprKind::Tuple(vec![item]), r(8, 16));
        let view = wrap(&expr, &cons, ctx("items = [\"a\" x ]"));

        assert!(view.completion_at_pos(Pos::new(0, 15, 15)).is_empty());
    }

    #[test]
    fn test_tokens_and_ranges_nest() {
        let cons = string_list();
        let item = Expression::literal(Value::string("a"), r(9, 12));
        let expr = Expression::new(ExprKind::Tuple(vec![item]), r(8, 13));
        let view = wrap(&expr, &cons, ctx("items = [\"a\"]"));

        let tokens = view.semantic_tokens();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].range.is_sub_range_of(&expr.range));
    }

    #[test]
    fn test_infer_type() {
        let cons = string_list();
        let expr = Expression::new(ExprKind::Tuple(Vec::new()), r(0, 2));
        let view = wrap(&expr, &cons, ctx("[]"));
        assert_eq!(view.infer_type(), Some(Type::list(Type::String)));
    }

    #[test]
    fn test_wrong_shape_is_silent() {
        let cons = string_list();
        let expr = Expression::literal(Value::Bool(true), r(0, 4));
        let view = wrap(&expr, &cons, ctx("true"));
        assert!(view.semantic_tokens().is_empty());
        assert!(view.completion_at_pos(Pos::new(0, 2, 2)).is_empty());
    }
}
