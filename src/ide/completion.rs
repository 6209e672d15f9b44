//! Completion implementation.

use smol_str::SmolStr;

use crate::base::{FileId, Pos, Range};
use crate::error::{Error, Result};
use crate::expr::{
    attribute_detail, raw_slice, wrap, Candidate, CandidateKind, ExprContext, ExpressionView,
    TextEdit,
};
use crate::path::PathContext;
use crate::schema::{BlockSchema, BodySchema};
use crate::syntax::Body;

use super::merged_block_body;

/// Get completion candidates at a position.
///
/// Routing: a position inside an attribute value defers to the value's
/// constraint; a position on a name (attribute, block type, label)
/// completes names; a position at body level offers the declared
/// attributes and blocks that fit there.
pub fn completion_at_pos(path: &PathContext, file: FileId, pos: Pos) -> Result<Vec<Candidate>> {
    let schema = path.schema().ok_or(Error::NoSchema)?;
    let parsed = path
        .file(file)
        .ok_or_else(|| Error::FileNotFound(SmolStr::new(format!("#{}", file.raw()))))?;
    let ctx = ExprContext::new(parsed.format, &parsed.src)
        .with_functions(path.functions())
        .with_targets(path.targets());
    body_completion(&parsed.body, &schema, file, pos, ctx)
}

fn body_completion(
    body: &Body,
    schema: &BodySchema,
    file: FileId,
    pos: Pos,
    ctx: ExprContext<'_>,
) -> Result<Vec<Candidate>> {
    if let Some(attr) = body.attribute_at(pos) {
        if attr.name_range.contains_or_ends_at(pos) {
            let prefix = raw_slice(ctx.src, attr.name_range.start.byte, pos.byte);
            return Ok(attribute_candidates(
                schema,
                body,
                attr.name_range,
                prefix,
                true,
            ));
        }
        let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
            return Err(Error::unknown_attribute(&attr.name, pos));
        };
        return Ok(wrap(&attr.value, &attr_schema.constraint, ctx).completion_at_pos(pos));
    }

    if let Some(block) = body.block_at(pos) {
        if block.type_range.contains_or_ends_at(pos) {
            let prefix = raw_slice(ctx.src, block.type_range.start.byte, pos.byte);
            return Ok(block_candidates(schema, block.type_range, prefix, true));
        }
        let Some(block_schema) = schema.blocks.get(&block.block_type) else {
            return Err(Error::unknown_block(&block.block_type, pos));
        };
        for (index, label) in block.labels.iter().enumerate() {
            if label.range.contains_or_ends_at(pos) {
                return Ok(label_candidates(block_schema, index, label.range));
            }
        }
        if let Some(ref block_body) = block.body {
            if block_body
                .range
                .map(|r| r.interior_contains(pos))
                .unwrap_or(false)
            {
                let merged = merged_block_body(block, block_schema);
                return body_completion(block_body, &merged, file, pos, ctx);
            }
        }
        return Err(Error::outside_body(&block.block_type, pos));
    }

    // Body level: everything declared and not yet present.
    let at = Range::at(file, pos);
    let mut out = attribute_candidates(schema, body, at, "", false);
    out.extend(block_candidates(schema, at, "", false));
    Ok(out)
}

/// Candidates for declared attributes not present in the body.
fn attribute_candidates(
    schema: &BodySchema,
    body: &Body,
    range: Range,
    prefix: &str,
    replace_name_only: bool,
) -> Vec<Candidate> {
    schema
        .attributes
        .iter()
        .filter(|(name, _)| !body.attributes.contains_key(name.as_str()) && name.starts_with(prefix))
        .map(|(name, attr_schema)| {
            let edit = if replace_name_only {
                TextEdit::new(range, name.to_string())
            } else {
                TextEdit::new(range, format!("{name} = ")).with_snippet(format!(
                    "{name} = {}",
                    attr_schema.constraint.snippet(1)
                ))
            };
            let mut candidate = Candidate::new(name.clone(), CandidateKind::Attribute, edit)
                .with_detail(attribute_detail(attr_schema));
            if let Some(ref description) = attr_schema.description {
                candidate = candidate.with_description(description.clone());
            }
            candidate
        })
        .collect()
}

/// Candidates for declared block types. Blocks may repeat, so none are
/// filtered out by presence.
fn block_candidates(
    schema: &BodySchema,
    range: Range,
    prefix: &str,
    replace_name_only: bool,
) -> Vec<Candidate> {
    schema
        .blocks
        .iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, block_schema)| {
            let edit = if replace_name_only {
                TextEdit::new(range, name.to_string())
            } else {
                TextEdit::new(range, format!("{name} {{}}"))
                    .with_snippet(block_snippet(name, block_schema))
            };
            let mut candidate = Candidate::new(name.clone(), CandidateKind::Block, edit)
                .with_detail("block");
            if let Some(ref description) = block_schema.description {
                candidate = candidate.with_description(description.clone());
            }
            candidate
        })
        .collect()
}

/// Snippet inserting a whole block with placeholders for its labels.
fn block_snippet(name: &str, schema: &BlockSchema) -> String {
    let mut out = String::from(name);
    let mut placeholder = 1;
    for label in &schema.labels {
        out.push_str(&format!(" \"${{{placeholder}:{}}}\"", label.name));
        placeholder += 1;
    }
    out.push_str(&format!(" {{\n  ${{{placeholder}}}\n}}"));
    out
}

/// Candidates for a dependency-key label, drawn from the values registered
/// in the dependent-body map at the same label index.
fn label_candidates(schema: &BlockSchema, index: usize, range: Range) -> Vec<Candidate> {
    let is_dep_key = schema
        .labels
        .get(index)
        .map(|l| l.is_dep_key)
        .unwrap_or(false);
    if !is_dep_key {
        return Vec::new();
    }
    let mut out: Vec<Candidate> = Vec::new();
    for key in schema.dependent_body.keys() {
        for label_dep in key.labels() {
            if label_dep.index != index {
                continue;
            }
            if out.iter().any(|c| c.label == label_dep.value) {
                continue;
            }
            out.push(
                Candidate::new(
                    label_dep.value.clone(),
                    CandidateKind::Label,
                    TextEdit::new(range, format!("\"{}\"", label_dep.value)),
                )
                .triggers_suggest(),
            );
        }
    }
    out.sort_by(|a, b| a.label.cmp(&b.label));
    out
}
