//! Hover implementation.

use smol_str::SmolStr;

use crate::base::{FileId, Pos};
use crate::error::{Error, Result};
use crate::expr::{
    attribute_detail, literal_mismatch, wrap, ExprContext, ExpressionView, HoverData,
};
use crate::path::PathContext;
use crate::schema::BodySchema;
use crate::syntax::Body;

use super::merged_block_body;

/// Get hover data for a position.
pub fn hover_at_pos(path: &PathContext, file: FileId, pos: Pos) -> Result<HoverData> {
    let schema = path.schema().ok_or(Error::NoSchema)?;
    let parsed = path
        .file(file)
        .ok_or_else(|| Error::FileNotFound(SmolStr::new(format!("#{}", file.raw()))))?;
    let ctx = ExprContext::new(parsed.format, &parsed.src).with_functions(path.functions());
    body_hover(&parsed.body, &schema, pos, ctx, path)
}

fn body_hover(
    body: &Body,
    schema: &BodySchema,
    pos: Pos,
    ctx: ExprContext<'_>,
    path: &PathContext,
) -> Result<HoverData> {
    if let Some(attr) = body.attribute_at(pos) {
        let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
            return Err(Error::unknown_attribute(&attr.name, pos));
        };
        if attr.name_range.contains_or_ends_at(pos) {
            let mut content = format!("**{}** _{}_", attr.name, attribute_detail(attr_schema));
            if attr_schema.is_deprecated {
                content.push_str("\n\n**Deprecated**");
            }
            if let Some(ref description) = attr_schema.description {
                content.push_str("\n\n");
                content.push_str(description);
            }
            return Ok(HoverData {
                content,
                range: attr.name_range,
            });
        }
        if let Some(expected) = literal_mismatch(&attr.value, &attr_schema.constraint) {
            return Err(Error::ConstraintMismatch { expected });
        }
        return wrap(&attr.value, &attr_schema.constraint, ctx)
            .hover_at_pos(pos)
            .ok_or_else(|| Error::unrecognized(pos));
    }

    if let Some(block) = body.block_at(pos) {
        let Some(block_schema) = schema.blocks.get(&block.block_type) else {
            return Err(Error::unknown_block(&block.block_type, pos));
        };
        if block.type_range.contains_or_ends_at(pos) {
            let mut content = format!("**{}** _block_", block.block_type);
            if let Some(ref description) = block_schema.description {
                content.push_str("\n\n");
                content.push_str(description);
            }
            if let Some(url) = path.doc_url(&block.block_type) {
                content.push_str(&format!("\n\n[`{}` documentation]({url})", block.block_type));
            }
            return Ok(HoverData {
                content,
                range: block.type_range,
            });
        }
        for (index, label) in block.labels.iter().enumerate() {
            if label.range.contains_or_ends_at(pos) {
                let Some(label_schema) = block_schema.labels.get(index) else {
                    return Err(Error::unrecognized(pos));
                };
                let mut content = format!("**{}** _{}_", label.value, label_schema.name);
                if let Some(ref description) = label_schema.description {
                    content.push_str("\n\n");
                    content.push_str(description);
                }
                return Ok(HoverData {
                    content,
                    range: label.range,
                });
            }
        }
        if let Some(ref block_body) = block.body {
            if block_body
                .range
                .map(|r| r.interior_contains(pos))
                .unwrap_or(false)
            {
                let merged = merged_block_body(block, block_schema);
                return body_hover(block_body, &merged, pos, ctx, path);
            }
        }
        return Err(Error::outside_body(&block.block_type, pos));
    }

    Err(Error::unrecognized(pos))
}
