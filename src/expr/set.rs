//! Set constrained expressions.
//!
//! Sets share the list traversal but their elements are not independently
//! addressable, so no nested reference targets are produced.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{Constraint, Set};
use crate::syntax::{Expression, ExprKind};
use crate::types::Type;

use super::{
    child_at_pos, container_candidate, container_hover, last_item_end_before, new_item_allowed,
    value_candidate, wrap, Candidate, ExprContext, ExpressionView, HoverData, SemanticToken,
    TargetContext,
};

pub(super) struct SetExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a Set,
    pub ctx: ExprContext<'a>,
}

impl<'a> SetExpr<'a> {
    fn constraint(&self) -> Constraint {
        Constraint::Set(self.cons.clone())
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

impl ExpressionView for SetExpr<'_> {
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
        vec![tctx.base_target(ty)]
    }

    fn infer_type(&self) -> Option<Type> {
        if self.expr.is_unset() {
            return Some(Type::set(self.elem_type()));
        }
        self.items()?;
        Some(Type::set(self.elem_type()))
    }
}
