//! Semantic token implementation.
//!
//! Walks a file's whole body against the schema, classifying names and
//! delegating expression values to the dispatcher. Unknown attributes and
//! blocks are skipped — this is a collection pass, not validation.

use smol_str::SmolStr;

use crate::base::FileId;
use crate::error::{Error, Result};
use crate::expr::{wrap, ExprContext, ExpressionView, SemanticToken, TokenModifier, TokenType};
use crate::path::PathContext;
use crate::schema::BodySchema;
use crate::syntax::Body;

use super::merged_block_body;

/// Get semantic tokens for a whole file, sorted by position.
pub fn semantic_tokens(path: &PathContext, file: FileId) -> Result<Vec<SemanticToken>> {
    let schema = path.schema().ok_or(Error::NoSchema)?;
    let parsed = path
        .file(file)
        .ok_or_else(|| Error::FileNotFound(SmolStr::new(format!("#{}", file.raw()))))?;
    let ctx = ExprContext::new(parsed.format, &parsed.src).with_functions(path.functions());

    let mut tokens = Vec::new();
    body_tokens(&parsed.body, &schema, ctx, &mut tokens);
    tokens.sort_by_key(|t| t.range.start.byte);
    Ok(tokens)
}

fn body_tokens(
    body: &Body,
    schema: &BodySchema,
    ctx: ExprContext<'_>,
    out: &mut Vec<SemanticToken>,
) {
    for attr in body.attributes.values() {
        let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
            continue;
        };
        let mut token = SemanticToken::new(TokenType::AttrName, attr.name_range);
        if attr_schema.is_deprecated {
            token = token.with_modifier(TokenModifier::Deprecated);
        }
        out.push(token);
        out.extend(wrap(&attr.value, &attr_schema.constraint, ctx).semantic_tokens());
    }

    for block in &body.blocks {
        let Some(block_schema) = schema.blocks.get(&block.block_type) else {
            continue;
        };
        out.push(SemanticToken::new(TokenType::BlockType, block.type_range));
        for (index, label) in block.labels.iter().enumerate() {
            let mut token = SemanticToken::new(TokenType::BlockLabel, label.range);
            if block_schema
                .labels
                .get(index)
                .map(|l| l.is_dep_key)
                .unwrap_or(false)
            {
                token = token.with_modifier(TokenModifier::DepKey);
            }
            out.push(token);
        }
        if let Some(ref block_body) = block.body {
            let merged = merged_block_body(block, block_schema);
            body_tokens(block_body, &merged, ctx, out);
        }
    }
}
