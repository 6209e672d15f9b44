//! Dependent body schema resolution.
//!
//! A block's applicable nested schema may depend on its labels and on the
//! statically known values of some of its attributes. This module collects
//! those dependency values from a concrete block, builds candidate
//! [`SchemaKey`]s, and resolves the registered body schema.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::refs::Address;
use crate::syntax::{Block, Expression, ExprKind};

use super::{
    AttributeDependent, BlockSchema, BodySchema, DependentValue, LabelDependent, SchemaKey,
};

/// Resolve the dependent body schema for a block.
///
/// Matching is all-or-nothing per registered key: a candidate must supply
/// every dependency value encoded in the key, so resolution prefers the
/// largest candidate built from what is statically known and falls back to
/// less specific keys. A dependency-key attribute whose value is not
/// statically resolvable is treated as absent, not as an error.
pub fn dependent_body_schema<'a>(
    block: &Block,
    schema: &'a BlockSchema,
) -> Option<(&'a BodySchema, SchemaKey)> {
    if schema.dependent_body.is_empty() {
        return None;
    }

    enum Dep {
        Label(LabelDependent),
        Attr(AttributeDependent),
    }

    let mut declared: Vec<Dep> = Vec::new();

    for (index, label_schema) in schema.labels.iter().enumerate() {
        if !label_schema.is_dep_key {
            continue;
        }
        if let Some(value) = block.label_value(index) {
            declared.push(Dep::Label(LabelDependent {
                index,
                value: value.clone(),
            }));
        }
    }

    // Only attribute names that appear in some registered key can influence
    // resolution; this also bounds the subset enumeration below.
    let relevant_names: BTreeSet<_> = schema
        .dependent_body
        .keys()
        .flat_map(|k| k.attributes().iter().map(|a| a.name.clone()))
        .collect();

    if let Some(body) = &block.body {
        for name in &relevant_names {
            let Some(attr) = body.attributes.get(name) else {
                continue;
            };
            if let Some(value) = static_dependent_value(&attr.value) {
                declared.push(Dep::Attr(AttributeDependent {
                    name: name.clone(),
                    value,
                }));
            } else {
                trace!(attribute = %name, "dependency value not statically known, treating as absent");
            }
        }
    }

    if declared.is_empty() {
        return None;
    }

    // Candidate keys are the non-empty subsets of the declared values,
    // largest first so the most specific registered key wins. Declared
    // values are bounded by the registered keys, so the enumeration stays
    // small; 32+ dependency values would be a pathological schema.
    let n = declared.len().min(24);
    let mut masks: Vec<u64> = (1..(1u64 << n)).collect();
    masks.sort_by_key(|m| (std::cmp::Reverse(m.count_ones()), *m));

    for mask in masks {
        let mut labels = Vec::new();
        let mut attributes = Vec::new();
        for (i, dep) in declared.iter().enumerate() {
            if mask & (1 << i) == 0 {
                continue;
            }
            match dep {
                Dep::Label(l) => labels.push(l.clone()),
                Dep::Attr(a) => attributes.push(a.clone()),
            }
        }
        let key = SchemaKey::new(labels, attributes);
        if let Some(body) = schema.dependent_body.get(&key) {
            debug!(block = %block.block_type, deps = key.len(), "resolved dependent body schema");
            return Some((body, key));
        }
    }

    None
}

/// The dependency value an expression statically supplies: a literal, the
/// string a literal-only template denotes, or a traversal's address.
fn static_dependent_value(expr: &Expression) -> Option<DependentValue> {
    match &expr.kind {
        ExprKind::Literal(value) => Some(DependentValue::Literal(value.clone())),
        ExprKind::Template(_) | ExprKind::Symbol(_) => expr
            .static_string()
            .map(|s| DependentValue::Literal(crate::syntax::Value::String(s))),
        ExprKind::Traversal(traversal) => {
            Address::from_traversal(traversal).map(DependentValue::Address)
        }
        _ => None,
    }
}
