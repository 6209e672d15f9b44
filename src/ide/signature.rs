//! Signature help implementation.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{FileId, Pos};
use crate::error::{Error, Result};
use crate::path::PathContext;
use crate::syntax::{Expression, ExprKind, FuncCall, TemplatePart};
use crate::types::FunctionSignature;

/// One parameter as shown in signature help.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterData {
    pub label: String,
    pub description: Option<Arc<str>>,
}

/// Signature help for the innermost call at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureData {
    pub name: SmolStr,
    /// The rendered signature, e.g. `join(sep string, …parts string) → string`.
    pub label: String,
    pub description: Option<Arc<str>>,
    pub parameters: Vec<ParameterData>,
    pub active_parameter: usize,
}

/// Get signature help at a position.
///
/// Finds the innermost function call whose argument list contains the
/// position and pairs it with the path's function table.
pub fn signature_at_pos(path: &PathContext, file: FileId, pos: Pos) -> Result<SignatureData> {
    let parsed = path
        .file(file)
        .ok_or_else(|| Error::FileNotFound(SmolStr::new(format!("#{}", file.raw()))))?;

    let call = parsed
        .body
        .attributes
        .values()
        .filter(|attr| attr.value.range.contains_or_ends_at(pos))
        .find_map(|attr| innermost_call(&attr.value, pos))
        .ok_or_else(|| Error::unrecognized(pos))?;

    let Some(signature) = path.functions().get(&call.name) else {
        return Err(Error::Positional {
            pos,
            msg: format!("unknown function {:?}", call.name.as_str()),
        });
    };

    Ok(SignatureData {
        name: call.name.clone(),
        label: signature.render(&call.name),
        description: signature.description.clone(),
        parameters: parameter_data(signature),
        active_parameter: active_parameter(call, signature, pos),
    })
}

/// Depth-first search for the innermost call whose argument list contains
/// the position.
fn innermost_call<'e>(expr: &'e Expression, pos: Pos) -> Option<&'e FuncCall> {
    if !expr.range.contains_or_ends_at(pos) {
        return None;
    }
    match &expr.kind {
        ExprKind::FuncCall(call) => {
            for arg in &call.args {
                if let Some(inner) = innermost_call(arg, pos) {
                    return Some(inner);
                }
            }
            if call.args_range.contains_or_ends_at(pos) {
                Some(call)
            } else {
                None
            }
        }
        ExprKind::Tuple(items) => items.iter().find_map(|item| innermost_call(item, pos)),
        ExprKind::Object(items) => items
            .iter()
            .find_map(|item| innermost_call(&item.value, pos)),
        ExprKind::Template(parts) => parts.iter().find_map(|part| match part {
            TemplatePart::Interp { expr, .. } => innermost_call(expr, pos),
            TemplatePart::Literal { .. } => None,
        }),
        ExprKind::Paren(inner) => innermost_call(inner, pos),
        ExprKind::For(f) => innermost_call(&f.collection, pos)
            .or_else(|| f.key_expr.as_ref().and_then(|e| innermost_call(e, pos)))
            .or_else(|| innermost_call(&f.value_expr, pos))
            .or_else(|| f.cond_expr.as_ref().and_then(|e| innermost_call(e, pos))),
        _ => None,
    }
}

fn parameter_data(signature: &FunctionSignature) -> Vec<ParameterData> {
    let mut out: Vec<ParameterData> = signature
        .params
        .iter()
        .map(|p| ParameterData {
            label: format!("{} {}", p.name, p.ty.friendly_name()),
            description: p.description.clone(),
        })
        .collect();
    if let Some(ref vp) = signature.var_param {
        out.push(ParameterData {
            label: format!("…{} {}", vp.name, vp.ty.friendly_name()),
            description: vp.description.clone(),
        });
    }
    out
}

/// Index of the parameter the cursor is on: the argument containing the
/// position, or one past the last argument ending before it. Clamped to
/// the declared parameters, with the variadic tail absorbing overflow.
fn active_parameter(call: &FuncCall, signature: &FunctionSignature, pos: Pos) -> usize {
    let index = call
        .args
        .iter()
        .position(|arg| arg.range.contains_or_ends_at(pos))
        .unwrap_or_else(|| {
            call.args
                .iter()
                .filter(|arg| arg.range.end.byte < pos.byte)
                .count()
        });
    let max = if signature.var_param.is_some() {
        signature.params.len()
    } else {
        signature.params.len().saturating_sub(1)
    };
    index.min(max)
}
