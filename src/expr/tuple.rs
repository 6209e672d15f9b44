//! Tuple constrained expressions.
//!
//! Unlike lists, every position carries its own sub-constraint; items
//! beyond the declared positions are ignored.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{Constraint, Tuple};
use crate::syntax::{Expression, ExprKind};
use crate::types::Type;

use super::{
    child_at_pos, container_candidate, container_hover, last_item_end_before, new_item_allowed,
    value_candidate, wrap, Candidate, ExprContext, ExpressionView, HoverData, SemanticToken,
    TargetContext,
};

pub(super) struct TupleExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a Tuple,
    pub ctx: ExprContext<'a>,
}

impl<'a> TupleExpr<'a> {
    fn constraint(&self) -> Constraint {
        Constraint::Tuple(self.cons.clone())
    }

    fn items(&self) -> Option<&'a [Expression]> {
        match &self.expr.kind {
            ExprKind::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl ExpressionView for TupleExpr<'_> {
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
        if let Some((i, child)) = child_at_pos(items, |e| e.range, pos) {
            let Some(elem) = self.cons.elems.get(i) else {
                return Vec::new();
            };
            return wrap(child, elem, self.ctx).completion_at_pos(pos);
        }
        // The next position's constraint drives the new-item candidate.
        let Some(next) = self.cons.elems.get(items.len()) else {
            return Vec::new();
        };
        let from = last_item_end_before(items, |e| e.range, pos)
            .unwrap_or(self.expr.range.start.byte + 1);
        if new_item_allowed(self.ctx.src, from, pos.byte) {
            let range = crate::base::Range::at(self.expr.range.file, pos);
            return vec![value_candidate(next, range)];
        }
        Vec::new()
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        if let Some(items) = self.items() {
            if self.expr.range.interior_contains(pos) {
                if let Some((i, child)) = child_at_pos(items, |e| e.range, pos) {
                    if let Some(elem) = self.cons.elems.get(i) {
                        if let Some(hover) = wrap(child, elem, self.ctx).hover_at_pos(pos) {
                            return Some(hover);
                        }
                    }
                }
            }
        } else if !self.expr.is_unset() {
            return None;
        }
        Some(container_hover(&self.constraint(), self.expr.range))
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        let Some(items) = self.items() else {
            return Vec::new();
        };
        items
            .iter()
            .zip(self.cons.elems.iter())
            .flat_map(|(item, elem)| wrap(item, elem, self.ctx).semantic_tokens())
            .collect()
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        let Some(items) = self.items() else {
            return Vec::new();
        };
        items
            .iter()
            .zip(self.cons.elems.iter())
            .flat_map(|(item, elem)| wrap(item, elem, self.ctx).reference_origins(allow_self_refs))
            .collect()
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        let Some(tctx) = target_ctx else {
            return Vec::new();
        };
        let ty = if tctx.infer_type { self.infer_type() } else { None };
        let mut base = tctx.base_target(ty);
        if tctx.infer_type {
            if let Some(items) = self.items() {
                for (i, (item, elem)) in items.iter().zip(self.cons.elems.iter()).enumerate() {
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
            return self.constraint().declared_type();
        }
        let items = self.items()?;
        Some(Type::Tuple(
            items
                .iter()
                .zip(self.cons.elems.iter())
                .map(|(item, elem)| {
                    wrap(item, elem, self.ctx)
                        .infer_type()
                        .or_else(|| elem.declared_type())
                        .unwrap_or(Type::Dynamic)
                })
                .collect(),
        ))
    }
}
