//! Query surface — high-level APIs for LSP handlers.
//!
//! This module is the interface between the schema-driven engine and the
//! LSP server. Each function corresponds to one editor request and follows
//! the same shape: take a [`PathContext`](crate::path::PathContext), a file
//! and (usually) a position, return data or a typed
//! [`Error`](crate::error::Error).
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take data in, return data out
//! 2. **No LSP types**: results use our own types, converted at the LSP
//!    boundary
//! 3. **Synchronous**: a query completes or returns an error; callers
//!    needing cancellation bound calls externally

mod code_actions;
mod completion;
mod hover;
mod references;
mod semantic_tokens;
mod signature;

pub use code_actions::{code_actions, CodeAction, CodeActionContext, CodeActionProvider};
pub use completion::completion_at_pos;
pub use hover::hover_at_pos;
pub use references::{
    collect_reference_origins, collect_reference_targets, find_references_across_paths,
    find_references_at_pos, goto_definition_across_paths, goto_definition_at_pos,
};
pub use semantic_tokens::semantic_tokens;
pub use signature::{signature_at_pos, ParameterData, SignatureData};

// Result data produced by the expression layer is part of this surface.
pub use crate::expr::{
    Candidate, CandidateKind, HoverData, SemanticToken, TextEdit, TokenModifier, TokenType,
};

use crate::schema::{resolver, BlockSchema, BodySchema};
use crate::syntax::Block;

/// The effective schema for a block's body: its static body merged with
/// the dependent body resolved from the block's labels and attributes.
pub(crate) fn merged_block_body(block: &Block, schema: &BlockSchema) -> BodySchema {
    let base = schema.body.clone().unwrap_or_default();
    match resolver::dependent_body_schema(block, schema) {
        Some((dependent, _key)) => base.merged_with(dependent),
        None => base,
    }
}
