//! Keyword constrained expressions.

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::Keyword;
use crate::syntax::{Expression, ExprKind};

use super::{
    hover_primitive, Candidate, CandidateKind, ExprContext, ExpressionView, HoverData,
    SemanticToken, TargetContext, TextEdit, TokenType,
};

pub(super) struct KeywordExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a Keyword,
    #[allow(dead_code)]
    pub ctx: ExprContext<'a>,
}

impl KeywordExpr<'_> {
    fn matches(&self) -> bool {
        matches!(&self.expr.kind, ExprKind::Symbol(s) if s == &self.cons.keyword)
    }

    fn display_name(&self) -> &str {
        self.cons.name.as_deref().unwrap_or("keyword")
    }
}

impl ExpressionView for KeywordExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        let reachable = self.expr.is_unset()
            || matches!(self.expr.kind, ExprKind::Symbol(_))
                && self.expr.range.contains_or_ends_at(pos);
        if !reachable {
            return Vec::new();
        }
        let mut candidate = Candidate::new(
            self.cons.keyword.clone(),
            CandidateKind::Keyword,
            TextEdit::new(self.expr.range, self.cons.keyword.to_string()),
        )
        .with_detail(self.display_name());
        if let Some(ref description) = self.cons.description {
            candidate = candidate.with_description(description.clone());
        }
        vec![candidate]
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.matches() || !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        let mut content = hover_primitive(&self.cons.keyword, self.display_name());
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
        if self.matches() {
            vec![SemanticToken::new(TokenType::Keyword, self.expr.range)]
        } else {
            Vec::new()
        }
    }

    fn reference_origins(&self, _allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        Vec::new()
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        target_ctx.map(|t| vec![t.base_target(None)]).unwrap_or_default()
    }
}
