//! Reference constrained expressions.

use crate::base::Pos;
use crate::refs::{
    Address, OriginConstraint, ReferenceOrigin, ReferenceTarget,
};
use crate::schema::Reference;
use crate::syntax::{Expression, ExprKind};
use crate::types::Type;

use super::{
    hover_primitive, Candidate, CandidateKind, ExprContext, ExpressionView, HoverData,
    SemanticToken, TargetContext, TextEdit, TokenType,
};

pub(super) struct ReferenceExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a Reference,
    pub ctx: ExprContext<'a>,
}

impl ReferenceExpr<'_> {
    fn origin_constraint(&self) -> OriginConstraint {
        OriginConstraint {
            of_type: self.cons.of_type.clone(),
            of_scope: self.cons.of_scope.clone(),
        }
    }

    fn display_name(&self) -> String {
        if let Some(ref name) = self.cons.name {
            return name.to_string();
        }
        match self.cons.of_type {
            Some(ref ty) if !ty.is_dynamic() => ty.friendly_name(),
            _ => "reference".to_string(),
        }
    }

    /// Whether a collected target is acceptable here, mirroring the
    /// matcher's constraint rules.
    fn target_acceptable(&self, target: &ReferenceTarget) -> bool {
        if let Some(ref scope) = self.cons.of_scope {
            if target.scope_id.as_ref() != Some(scope) {
                return false;
            }
        }
        match (&self.cons.of_type, &target.ty) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(want), Some(have)) => want.matches(have),
        }
    }
}

impl ExpressionView for ReferenceExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return Vec::new();
        }
        let Some(targets) = self.ctx.targets else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for target in targets.deep_iter() {
            if !self.target_acceptable(target) {
                continue;
            }
            let addr = target.addr.to_string();
            if out
                .iter()
                .any(|c: &Candidate| c.label.as_str() == addr.as_str())
            {
                continue;
            }
            let detail = target
                .ty
                .as_ref()
                .map(|t| t.friendly_name())
                .unwrap_or_else(|| self.display_name());
            out.push(
                Candidate::new(
                    addr.clone(),
                    CandidateKind::Reference,
                    TextEdit::new(self.expr.range, addr),
                )
                .with_detail(detail),
            );
        }
        out
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        let ExprKind::Traversal(traversal) = &self.expr.kind else {
            return None;
        };
        let addr = Address::from_traversal(traversal)?;
        Some(HoverData {
            content: hover_primitive(&addr.to_string(), &self.display_name()),
            range: self.expr.range,
        })
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        let ExprKind::Traversal(traversal) = &self.expr.kind else {
            return Vec::new();
        };
        if Address::from_traversal(traversal).is_none() {
            return Vec::new();
        }
        traversal
            .steps
            .iter()
            .map(|step| SemanticToken::new(TokenType::ReferenceStep, step.range()))
            .collect()
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        let ExprKind::Traversal(traversal) = &self.expr.kind else {
            return Vec::new();
        };
        let Some(addr) = Address::from_traversal(traversal) else {
            // Unparseable traversals are skipped, not fatal.
            return Vec::new();
        };
        if !allow_self_refs && addr.root_name().map(|n| n.as_str()) == Some("self") {
            return Vec::new();
        }
        vec![ReferenceOrigin::local(
            addr,
            self.expr.range,
            vec![self.origin_constraint()],
        )]
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        if let Some(tctx) = target_ctx {
            let ty = if tctx.infer_type {
                self.cons.of_type.clone()
            } else {
                None
            };
            return vec![tctx.base_target(ty)];
        }
        // A reference with an address schema declares a target at the
        // written address rather than merely using one.
        let Some(ref addr_schema) = self.cons.address else {
            return Vec::new();
        };
        let ExprKind::Traversal(traversal) = &self.expr.kind else {
            return Vec::new();
        };
        let Some(addr) = Address::from_traversal(traversal) else {
            return Vec::new();
        };
        vec![
            ReferenceTarget::new(addr)
                .with_scope(addr_schema.scope_id.clone())
                .with_range(self.expr.range)
                .with_def_range(self.expr.range),
        ]
    }

    fn infer_type(&self) -> Option<Type> {
        self.cons.of_type.clone()
    }
}
