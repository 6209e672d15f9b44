//! Object constrained expressions.
//!
//! Every key is declared by the schema with its own sub-constraint; unknown
//! keys are skipped. Completion in a between-items gap (or on a key) offers
//! the declared attributes that are not present yet.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::{AttributeSchema, Constraint, Object};
use crate::syntax::{Expression, ExprKind, FileFormat, ObjectItem};
use crate::types::{ObjectType, Type};

use super::{
    attribute_detail, child_at_pos, container_candidate, descriptor_name, hover_fenced,
    last_item_end_before, map::classify_key, map::KeyKind, new_item_allowed, raw_slice, wrap,
    Candidate, CandidateKind, ExprContext, ExpressionView, HoverData, SemanticToken,
    TargetContext, TextEdit, TokenModifier, TokenType,
};

pub(super) struct ObjectExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a Object,
    pub ctx: ExprContext<'a>,
}

impl<'a> ObjectExpr<'a> {
    fn constraint(&self) -> Constraint {
        Constraint::Object(self.cons.clone())
    }

    fn items(&self) -> Option<&'a [ObjectItem]> {
        match &self.expr.kind {
            ExprKind::Object(items) => Some(items),
            _ => None,
        }
    }

    fn interpolated_keys_active(&self) -> bool {
        self.cons.allow_interpolated_keys && self.ctx.format == FileFormat::Native
    }

    /// Names of declared attributes present among the items.
    fn present_names(&self) -> FxHashSet<SmolStr> {
        self.items()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match classify_key(&item.key) {
                        KeyKind::Literal(name) => Some(name),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attr_candidate(
        &self,
        name: &SmolStr,
        schema: &AttributeSchema,
        range: crate::base::Range,
        replace_key_only: bool,
    ) -> Candidate {
        let edit = if replace_key_only {
            TextEdit::new(range, name.to_string())
        } else {
            TextEdit::new(range, format!("{name} = "))
                .with_snippet(format!("{name} = {}", schema.constraint.snippet(1)))
        };
        let mut candidate =
            Candidate::new(name.clone(), CandidateKind::Attribute, edit)
                .with_detail(attribute_detail(schema));
        if let Some(ref description) = schema.description {
            candidate = candidate.with_description(description.clone());
        }
        candidate
    }

    /// Candidates for declared-but-absent attributes, optionally filtered
    /// by a typed prefix.
    fn missing_attr_candidates(
        &self,
        range: crate::base::Range,
        prefix: &str,
        replace_key_only: bool,
    ) -> Vec<Candidate> {
        let present = self.present_names();
        self.cons
            .attributes
            .iter()
            .filter(|(name, _)| !present.contains(name.as_str()) && name.starts_with(prefix))
            .map(|(name, schema)| self.attr_candidate(name, schema, range, replace_key_only))
            .collect()
    }

    /// The whole-object descriptor: a fenced block of sorted members
    /// followed by the type name; optional-and-absent members are suffixed.
    fn descriptor_hover(&self) -> HoverData {
        if self.cons.attributes.is_empty() {
            return super::container_hover(&self.constraint(), self.expr.range);
        }
        let present = self.present_names();
        let mut names: Vec<&SmolStr> = self.cons.attributes.keys().collect();
        names.sort();
        let mut block = String::from("{\n");
        for name in names {
            let schema = &self.cons.attributes[name];
            block.push_str("  ");
            block.push_str(name);
            block.push_str(" = ");
            block.push_str(&descriptor_name(&schema.constraint));
            if schema.is_optional && !present.contains(name) {
                block.push_str(" # optional");
            }
            block.push('\n');
        }
        block.push('}');
        let mut content = hover_fenced(&block, "object");
        if let Some(description) = self.cons.description.as_ref() {
            content.push_str("\n\n");
            content.push_str(description);
        }
        HoverData {
            content,
            range: self.expr.range,
        }
    }
}

impl ExpressionView for ObjectExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        if self.expr.is_unset() {
            return vec![container_candidate(&self.constraint(), self.expr.range)];
        }
        let Some(items) = self.items() else {
            return Vec::new();
        };
        if !self.expr.range.interior_contains(pos) {
            return Vec::new();
        }
        if let Some((_, item)) = child_at_pos(items, |i| i.range, pos) {
            if item.key.range.contains_or_ends_at(pos) {
                let prefix =
                    raw_slice(self.ctx.src, item.key.range.start.byte, pos.byte).trim_matches('"');
                return self.missing_attr_candidates(item.key.range, prefix, true);
            }
            if item.value.range.contains_or_ends_at(pos) || item.value.is_unset() {
                if let KeyKind::Literal(name) = classify_key(&item.key) {
                    if let Some(schema) = self.cons.attributes.get(&name) {
                        return wrap(&item.value, &schema.constraint, self.ctx)
                            .completion_at_pos(pos);
                    }
                }
            }
            return Vec::new();
        }
        let from = last_item_end_before(items, |i| i.range, pos)
            .unwrap_or(self.expr.range.start.byte + 1);
        if new_item_allowed(self.ctx.src, from, pos.byte) {
            let range = crate::base::Range::at(self.expr.range.file, pos);
            return self.missing_attr_candidates(range, "", false);
        }
        Vec::new()
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.is_unset() && !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        if let Some(items) = self.items() {
            if self.expr.range.interior_contains(pos) {
                if let Some((_, item)) = child_at_pos(items, |i| i.range, pos) {
                    if let Some(hover) = self.item_hover(item, pos) {
                        return Some(hover);
                    }
                }
            }
        } else if !self.expr.is_unset() {
            return None;
        }
        Some(self.descriptor_hover())
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        let Some(items) = self.items() else {
            return Vec::new();
        };
        let mut tokens = Vec::new();
        for item in items {
            match classify_key(&item.key) {
                KeyKind::Literal(name) => {
                    let Some(schema) = self.cons.attributes.get(&name) else {
                        continue;
                    };
                    let mut token = SemanticToken::new(TokenType::ObjectKey, item.key.range);
                    if schema.is_deprecated {
                        token = token.with_modifier(TokenModifier::Deprecated);
                    }
                    tokens.push(token);
                    tokens.extend(
                        wrap(&item.value, &schema.constraint, self.ctx).semantic_tokens(),
                    );
                }
                KeyKind::Interpolated(inner) if self.interpolated_keys_active() => {
                    let string_expr = Constraint::any(Type::String);
                    tokens.extend(wrap(inner, &string_expr, self.ctx).semantic_tokens());
                }
                _ => continue,
            }
        }
        tokens
    }

    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        let Some(items) = self.items() else {
            return Vec::new();
        };
        let mut origins = Vec::new();
        for item in items {
            match classify_key(&item.key) {
                KeyKind::Literal(name) => {
                    if let Some(schema) = self.cons.attributes.get(&name) {
                        origins.extend(
                            wrap(&item.value, &schema.constraint, self.ctx)
                                .reference_origins(allow_self_refs),
                        );
                    }
                }
                KeyKind::Interpolated(inner) if self.interpolated_keys_active() => {
                    let string_expr = Constraint::any(Type::String);
                    origins.extend(
                        wrap(inner, &string_expr, self.ctx).reference_origins(allow_self_refs),
                    );
                }
                _ => continue,
            }
        }
        origins
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        let Some(tctx) = target_ctx else {
            return Vec::new();
        };
        let ty = if tctx.infer_type { self.infer_type() } else { None };
        let mut base = tctx.base_target(ty);
        if tctx.infer_type {
            if let Some(items) = self.items() {
                for item in items {
                    let KeyKind::Literal(name) = classify_key(&item.key) else {
                        continue;
                    };
                    let Some(schema) = self.cons.attributes.get(&name) else {
                        continue;
                    };
                    let child_ctx = tctx.nested(tctx.addr.attr(name), item.value.range);
                    base.nested.extend(
                        wrap(&item.value, &schema.constraint, self.ctx)
                            .reference_targets(Some(&child_ctx)),
                    );
                }
            }
        }
        vec![base]
    }

    fn infer_type(&self) -> Option<Type> {
        if self.expr.is_unset() {
            return self.constraint().declared_type();
        }
        let items = self.items()?;
        let mut object = ObjectType::default();
        for (name, schema) in &self.cons.attributes {
            let present = items.iter().find(|item| {
                matches!(classify_key(&item.key), KeyKind::Literal(k) if &k == name)
            });
            let ty = present
                .and_then(|item| wrap(&item.value, &schema.constraint, self.ctx).infer_type())
                .or_else(|| schema.constraint.declared_type())
                .unwrap_or(Type::Dynamic);
            object.attributes.insert(name.clone(), ty);
            if schema.is_optional {
                object.optional.insert(name.clone());
            }
        }
        Some(Type::Object(object))
    }
}

impl ObjectExpr<'_> {
    fn item_hover(&self, item: &ObjectItem, pos: Pos) -> Option<HoverData> {
        match classify_key(&item.key) {
            KeyKind::Literal(name) => {
                let schema = self.cons.attributes.get(&name)?;
                if item.key.range.contains_or_ends_at(pos) {
                    let mut content = format!("**{name}** _{}_", attribute_detail(schema));
                    if let Some(ref description) = schema.description {
                        content.push_str("\n\n");
                        content.push_str(description);
                    }
                    return Some(HoverData {
                        content,
                        range: item.key.range,
                    });
                }
                if item.value.range.contains_or_ends_at(pos) {
                    return wrap(&item.value, &schema.constraint, self.ctx).hover_at_pos(pos);
                }
                None
            }
            KeyKind::Interpolated(inner) if self.interpolated_keys_active() => {
                if item.key.range.contains_or_ends_at(pos) {
                    let string_expr = Constraint::any(Type::String);
                    return wrap(inner, &string_expr, self.ctx).hover_at_pos(pos);
                }
                None
            }
            _ => None,
        }
    }
}
