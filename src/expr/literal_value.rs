//! Literal-value constrained expressions.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::LiteralValue;
use crate::syntax::{Expression, ExprKind, Value};
use crate::types::Type;

use super::{
    hover_value, output::kind_for_constraint, Candidate, ExprContext, ExpressionView, HoverData,
    SemanticToken, TargetContext, TextEdit, TokenType,
};

pub(super) struct LiteralValueExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a LiteralValue,
    #[allow(dead_code)]
    pub ctx: ExprContext<'a>,
}

impl LiteralValueExpr<'_> {
    fn matches(&self) -> bool {
        match &self.expr.kind {
            ExprKind::Literal(value) => value == &self.cons.value,
            ExprKind::Template(_) | ExprKind::Symbol(_) => self
                .expr
                .static_string()
                .map(|s| Value::String(s) == self.cons.value)
                .unwrap_or(false),
            _ => false,
        }
    }
}

impl ExpressionView for LiteralValueExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return Vec::new();
        }
        let display = self.cons.value.to_string();
        let constraint = crate::schema::Constraint::LiteralValue(self.cons.clone());
        let mut candidate = Candidate::new(
            display.clone(),
            kind_for_constraint(&constraint),
            TextEdit::new(self.expr.range, display),
        )
        .with_detail(self.cons.value.ty().friendly_name());
        if let Some(ref description) = self.cons.description {
            candidate = candidate.with_description(description.clone());
        }
        vec![candidate]
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.range.contains_or_ends_at(pos) || !self.matches() {
            return None;
        }
        let mut content = hover_value(&self.cons.value);
        if let Some(ref description) = self.cons.description {
            content.push_str("\n\n");
            content.push_str(description);
        }
        Some(HoverData {
            content,
            range: self.expr.range,
        })
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        if !self.matches() {
            return Vec::new();
        }
        let token_type = match self.cons.value {
            Value::Bool(_) => TokenType::Bool,
            Value::Number(_) => TokenType::Number,
            Value::String(_) => TokenType::String,
            Value::Null => return Vec::new(),
        };
        vec![SemanticToken::new(token_type, self.expr.range)]
    }

    fn reference_origins(&self, _allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        Vec::new()
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        let Some(tctx) = target_ctx else {
            return Vec::new();
        };
        let ty = if tctx.infer_type { self.infer_type() } else { None };
        vec![tctx.base_target(ty)]
    }

    fn infer_type(&self) -> Option<Type> {
        if self.matches() || self.expr.is_unset() {
            Some(self.cons.value.ty())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::schema::Constraint;
    use crate::syntax::FileFormat;
    use crate::expr::wrap;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn ctx(src: &str) -> ExprContext<'_> {
        ExprContext::new(FileFormat::Native, src)
    }

    #[test]
    fn test_matching_value_hover() {
        let cons = Constraint::literal_value(Value::string("standard"));
        let expr = Expression::literal(Value::string("standard"), r(8, 18));
        let view = wrap(&expr, &cons, ctx("class = \"standard\""));

        let hover = view.hover_at_pos(Pos::new(0, 10, 10)).unwrap();
        assert_eq!(hover.content, "`\"standard\"` _string_");
        assert_eq!(view.semantic_tokens().len(), 1);
    }

    #[test]
    fn test_wrong_value_yields_nothing() {
        let cons = Constraint::literal_value(Value::string("standard"));
        let expr = Expression::literal(Value::string("premium"), r(8, 17));
        let view = wrap(&expr, &cons, ctx("class = \"premium\""));

        assert!(view.hover_at_pos(Pos::new(0, 10, 10)).is_none());
        assert!(view.semantic_tokens().is_empty());
    }

    #[test]
    fn test_completion_offers_exact_value() {
        let cons = Constraint::literal_value(Value::number(8080.0));
        let expr = Expression::unset(r(7, 7));
        let view = wrap(&expr, &cons, ctx("port = "));

        let candidates = view.completion_at_pos(Pos::new(0, 7, 7));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label.as_str(), "8080");
        assert_eq!(candidates[0].edit.new_text, "8080");
    }
}
