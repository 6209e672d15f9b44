//! Union-of-constraints expressions.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::OneOf;
use crate::syntax::Expression;
use crate::types::Type;

use super::{
    wrap, Candidate, ExprContext, ExpressionView, HoverData, SemanticToken, TargetContext,
};

/// Members are consulted in declared order with no backtracking: for
/// semantic tokens (and the other single-answer queries) the first member
/// producing a non-empty answer wins, even if a later member would also
/// match. This is a deliberate product policy rather than exhaustive
/// disambiguation; completion is the exception and aggregates candidates
/// across all members.
pub(super) struct OneOfExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a OneOf,
    pub ctx: ExprContext<'a>,
}

impl ExpressionView for OneOfExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = Vec::new();
        for member in &self.cons.members {
            for candidate in wrap(self.expr, member, self.ctx).completion_at_pos(pos) {
                if !out.iter().any(|c| c.label == candidate.label) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        self.cons
            .members
            .iter()
            .find_map(|member| wrap(self.expr, member, self.ctx).hover_at_pos(pos))
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        for member in &self.cons.members {
            let tokens = wrap(self.expr, member, self.ctx).semantic_tokens();
            if !tokens.is_empty() {
                return tokens;
            }
        }
        Vec::new()
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        for member in &self.cons.members {
            let origins = wrap(self.expr, member, self.ctx).reference_origins(allow_self_refs);
            if !origins.is_empty() {
                return origins;
            }
        }
        Vec::new()
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        for member in &self.cons.members {
            let targets = wrap(self.expr, member, self.ctx).reference_targets(target_ctx);
            if !targets.is_empty() {
                return targets;
            }
        }
        Vec::new()
    }

    fn infer_type(&self) -> Option<Type> {
        self.cons
            .members
            .iter()
            .find_map(|member| wrap(self.expr, member, self.ctx).infer_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::schema::Constraint;
    use crate::syntax::{FileFormat, Value};
    use crate::expr::TokenType;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn ctx(src: &str) -> ExprContext<'_> {
        ExprContext::new(FileFormat::Native, src)
    }

    #[test]
    fn test_first_member_with_tokens_wins() {
        let cons = Constraint::one_of(vec![
            Constraint::keyword("auto"),
            Constraint::literal_type(Type::String),
        ]);
        // The keyword member does not match a string literal, so the
        // literal-type member answers.
        let expr = Expression::literal(Value::string("auto"), r(7, 13));
        let view = wrap(&expr, &cons, ctx("mode = \"auto\""));

        let tokens = view.semantic_tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::String);

        // A bare symbol is answered by the keyword member instead.
        let expr = Expression::symbol("auto", r(7, 11));
        let view = wrap(&expr, &cons, ctx("mode = auto"));
        let tokens = view.semantic_tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Keyword);
    }

    #[test]
    fn test_completion_aggregates_members() {
        let cons = Constraint::one_of(vec![
            Constraint::keyword("auto"),
            Constraint::literal_type(Type::Bool),
        ]);
        let expr = Expression::unset(r(7, 7));
        let view = wrap(&expr, &cons, ctx("mode = "));

        let labels: Vec<_> = view
            .completion_at_pos(Pos::new(0, 7, 7))
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["auto", "true", "false"]);
    }

    #[test]
    fn test_hover_takes_first_answer() {
        let cons = Constraint::one_of(vec![
            Constraint::literal_value(Value::string("x")),
            Constraint::literal_type(Type::String),
        ]);
        let expr = Expression::literal(Value::string("y"), r(0, 3));
        let view = wrap(&expr, &cons, ctx("\"y\""));

        // First member rejects "y"; second member answers.
        let hover = view.hover_at_pos(Pos::new(0, 1, 1)).unwrap();
        assert_eq!(hover.content, "`\"y\"` _string_");
    }
}
