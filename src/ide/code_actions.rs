//! Code actions — pluggable per-range edit providers.
//!
//! The engine itself ships no actions; embedders register providers and
//! every provider is invoked uniformly for each request.

use smol_str::SmolStr;

use crate::base::{FileId, Range};
use crate::expr::TextEdit;
use crate::path::PathContext;

/// A proposed edit with a human-facing title.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeAction {
    pub title: String,
    /// Editor-facing action kind, e.g. `refactor.rewrite`.
    pub kind: SmolStr,
    pub edits: Vec<TextEdit>,
}

/// Everything a provider may inspect for one request.
pub struct CodeActionContext<'a> {
    pub path: &'a PathContext,
    pub file: FileId,
    pub range: Range,
}

/// A pluggable source of code actions.
pub trait CodeActionProvider: Send + Sync {
    fn actions(&self, ctx: &CodeActionContext<'_>) -> Vec<CodeAction>;
}

/// Invoke every provider for the given path and range, in order.
pub fn code_actions(
    providers: &[Box<dyn CodeActionProvider>],
    path: &PathContext,
    file: FileId,
    range: Range,
) -> Vec<CodeAction> {
    let ctx = CodeActionContext { path, file, range };
    providers
        .iter()
        .flat_map(|provider| provider.actions(&ctx))
        .collect()
}
