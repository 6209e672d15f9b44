//! Literal-type constrained expressions.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{constraint_for_type, LiteralType};
use crate::syntax::{Expression, ExprKind, Value};
use crate::types::Type;

use super::{
    hover_type_only, hover_value, wrap, Candidate, CandidateKind, ExprContext, ExpressionView,
    HoverData, SemanticToken, TargetContext, TextEdit, TokenType,
};

pub(super) struct LiteralTypeExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a LiteralType,
    pub ctx: ExprContext<'a>,
}

impl<'a> LiteralTypeExpr<'a> {
    /// Literal values of complex types reuse the generic container
    /// traversal by reconstructing the equivalent constraint.
    fn reconstructed(&self) -> Option<crate::schema::Constraint> {
        constraint_for_type(&self.cons.ty)
    }

    fn value_matches(&self, value: &Value) -> bool {
        matches!(value, Value::Null) || value.ty().matches(&self.cons.ty)
    }

    fn literal_token_type(&self, value: &Value) -> Option<TokenType> {
        match value {
            Value::Bool(_) => Some(TokenType::Bool),
            Value::Number(_) => Some(TokenType::Number),
            Value::String(_) => Some(TokenType::String),
            Value::Null => None,
        }
    }
}

impl ExpressionView for LiteralTypeExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        if let Some(cons) = self.reconstructed() {
            return wrap(self.expr, &cons, self.ctx).completion_at_pos(pos);
        }
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return Vec::new();
        }
        let range = self.expr.range;
        match self.cons.ty {
            Type::Bool => vec![
                Candidate::new("true", CandidateKind::Bool, TextEdit::new(range, "true"))
                    .with_detail("bool"),
                Candidate::new("false", CandidateKind::Bool, TextEdit::new(range, "false"))
                    .with_detail("bool"),
            ],
            Type::Number => vec![
                Candidate::new(
                    "0",
                    CandidateKind::Number,
                    TextEdit::new(range, "0").with_snippet("${1:0}"),
                )
                .with_detail("number"),
            ],
            Type::String => vec![
                Candidate::new(
                    "\"value\"",
                    CandidateKind::String,
                    TextEdit::new(range, "\"value\"").with_snippet("\"${1:value}\""),
                )
                .with_detail("string"),
            ],
            _ => Vec::new(),
        }
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if let Some(cons) = self.reconstructed() {
            return wrap(self.expr, &cons, self.ctx).hover_at_pos(pos);
        }
        if !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        match &self.expr.kind {
            ExprKind::Literal(value) if self.value_matches(value) => Some(HoverData {
                content: hover_value(value),
                range: self.expr.range,
            }),
            ExprKind::Template(_) if self.cons.ty.matches(&Type::String) => {
                let s = self.expr.static_string()?;
                Some(HoverData {
                    content: hover_value(&Value::String(s)),
                    range: self.expr.range,
                })
            }
            ExprKind::Unset => Some(HoverData {
                content: hover_type_only(&self.cons.ty.friendly_name()),
                range: self.expr.range,
            }),
            _ => None,
        }
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        if let Some(cons) = self.reconstructed() {
            return wrap(self.expr, &cons, self.ctx).semantic_tokens();
        }
        match &self.expr.kind {
            ExprKind::Literal(value) if self.value_matches(value) => self
                .literal_token_type(value)
                .map(|tt| vec![SemanticToken::new(tt, self.expr.range)])
                .unwrap_or_default(),
            ExprKind::Template(_) if self.cons.ty.matches(&Type::String) => {
                if self.expr.static_string().is_some() {
                    vec![SemanticToken::new(TokenType::String, self.expr.range)]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        if let Some(cons) = self.reconstructed() {
            return wrap(self.expr, &cons, self.ctx).reference_origins(allow_self_refs);
        }
        Vec::new()
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
        if let Some(cons) = self.reconstructed() {
            return wrap(self.expr, &cons, self.ctx).infer_type();
        }
        match &self.expr.kind {
            ExprKind::Literal(value) if self.value_matches(value) => match value {
                Value::Null => Some(self.cons.ty.clone()),
                other => Some(other.ty()),
            },
            ExprKind::Template(_) if self.expr.static_string().is_some() => Some(Type::String),
            ExprKind::Unset => Some(self.cons.ty.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::schema::Constraint;
    use crate::syntax::FileFormat;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn view_ctx(src: &str) -> ExprContext<'_> {
        ExprContext::new(FileFormat::Native, src)
    }

    #[test]
    fn test_bool_literal_hover() {
        let src = "enabled = true";
        let cons = Constraint::literal_type(Type::Bool);
        let expr = Expression::literal(Value::Bool(true), r(10, 14));
        let view = wrap(&expr, &cons, view_ctx(src));

        let hover = view.hover_at_pos(Pos::new(0, 12, 12)).unwrap();
        assert_eq!(hover.content, "`true` _bool_");
        assert_eq!(hover.range, r(10, 14));
    }

    #[test]
    fn test_multiline_string_hover_is_fenced() {
        let cons = Constraint::literal_type(Type::String);
        let expr = Expression::literal(
            Value::string("one\ntwo"),
            Range::from_coords(FileId::new(0), (0, 6, 6), (2, 4, 17)),
        );
        let view = wrap(&expr, &cons, view_ctx(""));

        let hover = view.hover_at_pos(Pos::new(1, 1, 9)).unwrap();
        assert_eq!(hover.content, "```\none\ntwo\n```\n_string_");
    }

    #[test]
    fn test_type_mismatch_yields_nothing() {
        let cons = Constraint::literal_type(Type::Number);
        let expr = Expression::literal(Value::string("nope"), r(0, 6));
        let view = wrap(&expr, &cons, view_ctx("\"nope\""));

        assert!(view.hover_at_pos(Pos::new(0, 2, 2)).is_none());
        assert!(view.semantic_tokens().is_empty());
        assert!(view.infer_type().is_none());
    }

    #[test]
    fn test_bool_completion_for_unset() {
        let cons = Constraint::literal_type(Type::Bool);
        let expr = Expression::unset(r(10, 10));
        let view = wrap(&expr, &cons, view_ctx("enabled = "));

        let candidates = view.completion_at_pos(Pos::new(0, 10, 10));
        let labels: Vec<_> = candidates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["true", "false"]);
    }

    #[test]
    fn test_complex_type_delegates_to_container() {
        // list(bool) literal typed as Tuple node gets the container hover.
        let cons = Constraint::literal_type(Type::list(Type::Bool));
        let expr = Expression::new(ExprKind::Tuple(Vec::new()), r(8, 10));
        let view = wrap(&expr, &cons, view_ctx("items = []"));

        let hover = view.hover_at_pos(Pos::new(0, 9, 9)).unwrap();
        assert_eq!(hover.content, "_list of bool_");
        assert_eq!(hover.range, r(8, 10));
    }

    #[test]
    fn test_unset_token_list_is_empty() {
        let cons = Constraint::literal_type(Type::Bool);
        let expr = Expression::unset(r(4, 4));
        let view = wrap(&expr, &cons, view_ctx("a = "));
        assert!(view.semantic_tokens().is_empty());
    }
}
