//! Reference collection and resolution.
//!
//! The collectors walk every file's body against the schema, re-resolving
//! the dependent body schema at each block boundary, and feed the
//! [`matching`](crate::refs::matching) layer. The query functions answer
//! go-to-definition and find-references from previously collected sets.

use smol_str::SmolStr;
use tracing::debug;

use crate::base::{FileId, Pos};
use crate::error::{Error, Result};
use crate::expr::{wrap, ExprContext, ExpressionView, TargetContext};
use crate::path::PathContext;
use crate::refs::{
    match_targets, targeting, Address, ReferenceOrigin, ReferenceOrigins, ReferenceTarget,
    ReferenceTargets, Step,
};
use crate::schema::{AddrStep, BodySchema};
use crate::syntax::{Attribute, Body};

use super::merged_block_body;

/// Collect every reference origin declared by the path's files.
///
/// Store the result with
/// [`PathContext::set_origins`](crate::path::PathContext::set_origins) so
/// the query functions can use it.
pub fn collect_reference_origins(path: &PathContext) -> Result<ReferenceOrigins> {
    let schema = path.schema().ok_or(Error::NoSchema)?;
    let mut origins = ReferenceOrigins::new();
    for (_, parsed) in path.files() {
        let ctx = ExprContext::new(parsed.format, &parsed.src).with_functions(path.functions());
        body_origins(&parsed.body, &schema, ctx, &mut origins);
    }
    debug!(path = %path.name(), count = origins.len(), "collected reference origins");
    Ok(origins)
}

fn body_origins(
    body: &Body,
    schema: &BodySchema,
    ctx: ExprContext<'_>,
    out: &mut ReferenceOrigins,
) {
    for attr in body.attributes.values() {
        let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
            continue;
        };
        out.extend(
            wrap(&attr.value, &attr_schema.constraint, ctx).reference_origins(schema.self_refs),
        );
    }
    for block in &body.blocks {
        let Some(block_schema) = schema.blocks.get(&block.block_type) else {
            continue;
        };
        if let Some(ref block_body) = block.body {
            let merged = merged_block_body(block, block_schema);
            body_origins(block_body, &merged, ctx, out);
        }
    }
}

/// Collect every reference target declared by the path's files.
///
/// Store the result with
/// [`PathContext::set_targets`](crate::path::PathContext::set_targets).
pub fn collect_reference_targets(path: &PathContext) -> Result<ReferenceTargets> {
    let schema = path.schema().ok_or(Error::NoSchema)?;
    let mut targets = ReferenceTargets::new();
    for (_, parsed) in path.files() {
        let ctx = ExprContext::new(parsed.format, &parsed.src).with_functions(path.functions());
        body_targets(&parsed.body, &schema, ctx, &mut targets);
    }
    debug!(path = %path.name(), count = targets.len(), "collected reference targets");
    Ok(targets)
}

fn body_targets(
    body: &Body,
    schema: &BodySchema,
    ctx: ExprContext<'_>,
    out: &mut ReferenceTargets,
) {
    for attr in body.attributes.values() {
        let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
            continue;
        };
        if let Some(ref addr_schema) = attr_schema.address {
            let Some(addr) = build_address(&addr_schema.steps, attr) else {
                continue;
            };
            let mut tctx = TargetContext::new(addr);
            tctx.scope_id = addr_schema.scope_id.clone();
            tctx.infer_type = addr_schema.infer_type;
            tctx.range = Some(attr.range);
            tctx.def_range = Some(attr.name_range);
            if addr_schema.local_only {
                tctx.visible_in = body.range;
            }
            for target in
                wrap(&attr.value, &attr_schema.constraint, ctx).reference_targets(Some(&tctx))
            {
                out.push(target);
            }
        } else {
            // Constraint-declared addresses (reference-as-target) surface
            // even without an attribute address descriptor.
            for target in wrap(&attr.value, &attr_schema.constraint, ctx).reference_targets(None) {
                out.push(target);
            }
        }
    }
    for block in &body.blocks {
        let Some(block_schema) = schema.blocks.get(&block.block_type) else {
            continue;
        };
        if let Some(ref block_body) = block.body {
            let merged = merged_block_body(block, block_schema);
            body_targets(block_body, &merged, ctx, out);
        }
    }
}

/// Build a target address from configured steps and the document attribute.
fn build_address(steps: &[AddrStep], attr: &Attribute) -> Option<Address> {
    let mut out = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let name = match step {
            AddrStep::Static(name) => name.clone(),
            AddrStep::AttrName => attr.name.clone(),
        };
        out.push(if i == 0 {
            Step::Root(name)
        } else {
            Step::Attr(name)
        });
    }
    if out.is_empty() {
        return None;
    }
    Some(Address(out))
}

/// Resolve the definition(s) for the symbol usage at a position.
///
/// Looks up the collected origin under the cursor and matches it against
/// the path's collected targets.
pub fn goto_definition_at_pos<'p>(
    path: &'p PathContext,
    file: FileId,
    pos: Pos,
) -> Result<Vec<&'p ReferenceTarget>> {
    let origins = path.origins().at_pos(file, pos);
    if origins.is_empty() {
        return Err(Error::NoOriginFound);
    }
    let mut out = Vec::new();
    for origin in origins {
        if let ReferenceOrigin::Path(_) = origin {
            // Cross-path origins resolve via goto_definition_across_paths.
            continue;
        }
        out.extend(match_targets(origin, path.targets()));
    }
    if out.is_empty() {
        return Err(Error::NoTargetFound);
    }
    Ok(out)
}

/// Like [`goto_definition_at_pos`], additionally resolving path-qualified
/// origins against the explicitly passed set of known paths.
///
/// The scan is linear in path and symbol count; paths are passed as a
/// read-only parameter rather than consulted through any global registry.
pub fn goto_definition_across_paths(
    path: &PathContext,
    file: FileId,
    pos: Pos,
    known_paths: &[&PathContext],
) -> Result<Vec<(SmolStr, ReferenceTarget)>> {
    let origins = path.origins().at_pos(file, pos);
    if origins.is_empty() {
        return Err(Error::NoOriginFound);
    }
    let mut out = Vec::new();
    for origin in origins {
        match origin {
            ReferenceOrigin::Local(_) => {
                for target in match_targets(origin, path.targets()) {
                    out.push((path.name().clone(), target.clone()));
                }
            }
            ReferenceOrigin::Path(path_origin) => {
                for other in known_paths {
                    if other.name() != &path_origin.target_path {
                        continue;
                    }
                    for target in match_targets(origin, other.targets()) {
                        out.push((other.name().clone(), target.clone()));
                    }
                }
            }
        }
    }
    if out.is_empty() {
        return Err(Error::NoTargetFound);
    }
    Ok(out)
}

/// Like [`find_references_at_pos`], additionally scanning the explicitly
/// passed paths for path-qualified origins addressing this unit.
///
/// Local origins of other units address their own unit and are not
/// consulted; only their path-qualified origins naming this unit count.
pub fn find_references_across_paths(
    path: &PathContext,
    file: FileId,
    pos: Pos,
    known_paths: &[&PathContext],
) -> Result<Vec<(SmolStr, ReferenceOrigin)>> {
    let targets = path.targets().at_def_pos(file, pos);
    if targets.is_empty() {
        return Err(Error::NoTargetFound);
    }
    let mut out: Vec<(SmolStr, ReferenceOrigin)> = Vec::new();
    let mut push = |name: &SmolStr, origin: &ReferenceOrigin| {
        if !out.iter().any(|(n, o)| n == name && o == origin) {
            out.push((name.clone(), origin.clone()));
        }
    };
    for target in &targets {
        for origin in targeting(target, path.origins()) {
            push(path.name(), origin);
        }
        for other in known_paths {
            if other.name() == path.name() {
                continue;
            }
            for origin in other.origins().iter() {
                let ReferenceOrigin::Path(path_origin) = origin else {
                    continue;
                };
                if &path_origin.target_path != path.name() {
                    continue;
                }
                let singleton = ReferenceTargets(vec![(*target).clone()]);
                if !match_targets(origin, &singleton).is_empty() {
                    push(other.name(), origin);
                }
            }
        }
    }
    if out.is_empty() {
        return Err(Error::NoReferenceFound);
    }
    Ok(out)
}

/// Find every usage of the symbol defined at a position.
///
/// The inverse of [`goto_definition_at_pos`]: locates the collected target
/// whose defining name contains the cursor and returns every origin
/// addressing it (or any of its nested parts).
pub fn find_references_at_pos<'p>(
    path: &'p PathContext,
    file: FileId,
    pos: Pos,
) -> Result<Vec<&'p ReferenceOrigin>> {
    let targets = path.targets().at_def_pos(file, pos);
    if targets.is_empty() {
        return Err(Error::NoTargetFound);
    }
    let mut out: Vec<&ReferenceOrigin> = Vec::new();
    for target in targets {
        for origin in targeting(target, path.origins()) {
            if !out.iter().any(|o| std::ptr::eq(*o, origin)) {
                out.push(origin);
            }
        }
    }
    if out.is_empty() {
        return Err(Error::NoReferenceFound);
    }
    Ok(out)
}
