//! Body, block, attribute, and label schemas.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::refs::ScopeId;

use super::{Constraint, SchemaKey};

/// Schema for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    pub constraint: Constraint,
    pub is_optional: bool,
    pub is_sensitive: bool,
    pub is_deprecated: bool,
    pub description: Option<Arc<str>>,
    /// When set, values of this attribute become reference targets.
    pub address: Option<AttributeAddrSchema>,
}

impl AttributeSchema {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            is_optional: false,
            is_sensitive: false,
            is_deprecated: false,
            description: None,
            address: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.is_deprecated = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_address(mut self, address: AttributeAddrSchema) -> Self {
        self.address = Some(address);
        self
    }
}

/// How to build the reference-target address for an attribute's value.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeAddrSchema {
    pub steps: Vec<AddrStep>,
    pub scope_id: Option<ScopeId>,
    /// Attach the value's inferred type to the target, making it matchable
    /// by typed origins and addressable part by part.
    pub infer_type: bool,
    /// Restrict the target's visibility to the enclosing block body.
    pub local_only: bool,
}

impl AttributeAddrSchema {
    pub fn new(steps: Vec<AddrStep>) -> Self {
        Self {
            steps,
            scope_id: None,
            infer_type: false,
            local_only: false,
        }
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope_id = Some(scope);
        self
    }

    pub fn inferring_type(mut self) -> Self {
        self.infer_type = true;
        self
    }

    pub fn local(mut self) -> Self {
        self.local_only = true;
        self
    }
}

/// One step of an attribute address descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum AddrStep {
    /// A fixed name, e.g. the `local` in `local.<name>`.
    Static(SmolStr),
    /// The document attribute's own name.
    AttrName,
}

/// Schema for one block label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSchema {
    pub name: SmolStr,
    /// Whether this label participates in dependent-body selection.
    pub is_dep_key: bool,
    pub description: Option<Arc<str>>,
}

impl LabelSchema {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            is_dep_key: false,
            description: None,
        }
    }

    pub fn dep_key(mut self) -> Self {
        self.is_dep_key = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for one block type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockSchema {
    pub labels: Vec<LabelSchema>,
    /// The body every instance of this block has, regardless of keys.
    pub body: Option<BodySchema>,
    /// Bodies keyed by dependency values; resolved per block instance.
    pub dependent_body: IndexMap<SchemaKey, BodySchema>,
    pub description: Option<Arc<str>>,
}

impl BlockSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: LabelSchema) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_body(mut self, body: BodySchema) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_dependent_body(mut self, key: SchemaKey, body: BodySchema) -> Self {
        self.dependent_body.insert(key, body);
        self
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for a body: its attributes and nested blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodySchema {
    pub attributes: IndexMap<SmolStr, AttributeSchema>,
    pub blocks: IndexMap<SmolStr, BlockSchema>,
    /// Fallback accepting any attribute name, e.g. for free-form bodies.
    pub any_attribute: Option<Box<AttributeSchema>>,
    /// Permit `self.*` origins inside this body.
    pub self_refs: bool,
    pub description: Option<Arc<str>>,
}

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<SmolStr>, schema: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), schema);
        self
    }

    pub fn with_block(mut self, name: impl Into<SmolStr>, schema: BlockSchema) -> Self {
        self.blocks.insert(name.into(), schema);
        self
    }

    pub fn with_any_attribute(mut self, schema: AttributeSchema) -> Self {
        self.any_attribute = Some(Box::new(schema));
        self
    }

    pub fn with_self_refs(mut self) -> Self {
        self.self_refs = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The schema for a named attribute, falling back to the any-attribute
    /// schema when one is declared.
    pub fn attribute_schema(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes
            .get(name)
            .or(self.any_attribute.as_deref())
    }

    /// A copy of this schema with `overlay`'s attributes and blocks merged
    /// over it. Used to combine a block's static body with a resolved
    /// dependent body; overlay entries win on name collision.
    pub fn merged_with(&self, overlay: &BodySchema) -> BodySchema {
        let mut merged = self.clone();
        for (name, attr) in &overlay.attributes {
            merged.attributes.insert(name.clone(), attr.clone());
        }
        for (name, block) in &overlay.blocks {
            merged.blocks.insert(name.clone(), block.clone());
        }
        if overlay.any_attribute.is_some() {
            merged.any_attribute = overlay.any_attribute.clone();
        }
        merged.self_refs = merged.self_refs || overlay.self_refs;
        merged
    }
}
