//! Expression constraints.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::refs::ScopeId;
use crate::syntax::Value;
use crate::types::{ObjectType, Type};

use super::AttributeSchema;

/// A schema-declared description of the acceptable expression shape at one
/// document position.
///
/// Constraints nest arbitrarily; the closed set of variants keeps dispatch
/// exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Any expression producing a value of the given type.
    Any(AnyExpression),
    /// A literal of a given type (the shape is free, the type fixed).
    LiteralType(LiteralType),
    /// One exact literal value.
    LiteralValue(LiteralValue),
    /// A bare keyword.
    Keyword(Keyword),
    /// A traversal addressing a reference target.
    Reference(Reference),
    /// A bracketed sequence with one shared element constraint.
    List(List),
    /// Like `List`, but duplicate elements are meaningless.
    Set(Set),
    /// Free-form string keys, one shared element constraint.
    Map(Map),
    /// A bracketed sequence with one constraint per position.
    Tuple(Tuple),
    /// Declared keys, one constraint per key.
    Object(Object),
    /// Any of several constraints, tried in declared order.
    OneOf(OneOf),
    /// A type expression, e.g. `list(string)`.
    TypeDeclaration(TypeDeclaration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnyExpression {
    pub of: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralType {
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralValue {
    pub value: Value,
    pub description: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub keyword: SmolStr,
    /// Friendly name shown instead of the generic "keyword".
    pub name: Option<SmolStr>,
    pub description: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Only targets of this type are acceptable.
    pub of_type: Option<Type>,
    /// Only targets in this scope are acceptable.
    pub of_scope: Option<ScopeId>,
    /// Friendly name shown instead of the generic "reference".
    pub name: Option<SmolStr>,
    /// When set, the written traversal itself becomes an addressable target.
    pub address: Option<ReferenceAddrSchema>,
}

/// Declares that a reference expression defines a target at the written
/// address (rather than merely using one).
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceAddrSchema {
    pub scope_id: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    /// Constraint for every element; `None` accepts nothing inside.
    pub elem: Option<Box<Constraint>>,
    pub description: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Set {
    pub elem: Option<Box<Constraint>>,
    pub description: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    pub elem: Option<Box<Constraint>>,
    /// Friendly name shown instead of the generic "map".
    pub name: Option<SmolStr>,
    pub description: Option<Arc<str>>,
    /// Permit `(expr)` keys, retyped as plain string expressions.
    pub allow_interpolated_keys: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple {
    pub elems: Vec<Constraint>,
    pub description: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    /// Declared attribute name → schema, in declaration order.
    pub attributes: IndexMap<SmolStr, AttributeSchema>,
    pub description: Option<Arc<str>>,
    /// Permit `(expr)` keys, retyped as plain string expressions.
    pub allow_interpolated_keys: bool,
}

/// Members are consulted in declared order. For semantic tokens the first
/// member producing a non-empty token list answers and no later member is
/// consulted; there is no backtracking. Authors order members accordingly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OneOf {
    pub members: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeDeclaration {
    pub description: Option<Arc<str>>,
}

impl Constraint {
    /// Shorthand for an any-typed constraint.
    pub fn any(of: Type) -> Self {
        Constraint::Any(AnyExpression { of })
    }

    /// Shorthand for a literal-type constraint.
    pub fn literal_type(ty: Type) -> Self {
        Constraint::LiteralType(LiteralType { ty })
    }

    /// Shorthand for a literal-value constraint.
    pub fn literal_value(value: Value) -> Self {
        Constraint::LiteralValue(LiteralValue {
            value,
            description: None,
        })
    }

    /// Shorthand for a keyword constraint.
    pub fn keyword(kw: impl Into<SmolStr>) -> Self {
        Constraint::Keyword(Keyword {
            keyword: kw.into(),
            name: None,
            description: None,
        })
    }

    /// Shorthand for a list with the given element constraint.
    pub fn list(elem: Constraint) -> Self {
        Constraint::List(List {
            elem: Some(Box::new(elem)),
            description: None,
        })
    }

    /// Shorthand for a set with the given element constraint.
    pub fn set(elem: Constraint) -> Self {
        Constraint::Set(Set {
            elem: Some(Box::new(elem)),
            description: None,
        })
    }

    /// Shorthand for a map with the given element constraint.
    pub fn map(elem: Constraint) -> Self {
        Constraint::Map(Map {
            elem: Some(Box::new(elem)),
            name: None,
            description: None,
            allow_interpolated_keys: false,
        })
    }

    /// Shorthand for a union of constraints.
    pub fn one_of(members: Vec<Constraint>) -> Self {
        Constraint::OneOf(OneOf { members })
    }

    /// The human-facing name of the constraint, used in whole-container
    /// descriptors and completion labels.
    pub fn friendly_name(&self) -> String {
        match self {
            Constraint::Any(c) => c.of.friendly_name(),
            Constraint::LiteralType(c) => c.ty.friendly_name(),
            Constraint::LiteralValue(c) => c.value.ty().friendly_name(),
            Constraint::Keyword(c) => c
                .name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "keyword".to_string()),
            Constraint::Reference(c) => c
                .name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "reference".to_string()),
            Constraint::List(_) => "list".to_string(),
            Constraint::Set(_) => "set".to_string(),
            Constraint::Map(c) => c
                .name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "map".to_string()),
            Constraint::Tuple(_) => "tuple".to_string(),
            Constraint::Object(_) => "object".to_string(),
            Constraint::OneOf(c) => c
                .members
                .first()
                .map(|m| m.friendly_name())
                .unwrap_or_else(|| "expression".to_string()),
            Constraint::TypeDeclaration(_) => "type".to_string(),
        }
    }

    pub fn description(&self) -> Option<&Arc<str>> {
        match self {
            Constraint::LiteralValue(c) => c.description.as_ref(),
            Constraint::Keyword(c) => c.description.as_ref(),
            Constraint::List(c) => c.description.as_ref(),
            Constraint::Set(c) => c.description.as_ref(),
            Constraint::Map(c) => c.description.as_ref(),
            Constraint::Tuple(c) => c.description.as_ref(),
            Constraint::Object(c) => c.description.as_ref(),
            Constraint::TypeDeclaration(c) => c.description.as_ref(),
            _ => None,
        }
    }

    /// Insertion text for a fresh value of this shape, with `${n}` snippet
    /// placeholders starting at `next_placeholder`.
    pub fn snippet(&self, next_placeholder: usize) -> String {
        match self {
            Constraint::Any(c) => type_snippet(&c.of, next_placeholder),
            Constraint::LiteralType(c) => type_snippet(&c.ty, next_placeholder),
            Constraint::LiteralValue(c) => c.value.to_string(),
            Constraint::Keyword(c) => c.keyword.to_string(),
            Constraint::Reference(_) => format!("${{{next_placeholder}}}"),
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => {
                format!("[ ${{{next_placeholder}}} ]")
            }
            Constraint::Map(_) | Constraint::Object(_) => {
                format!("{{\n  ${{{next_placeholder}}}\n}}")
            }
            Constraint::OneOf(c) => c
                .members
                .first()
                .map(|m| m.snippet(next_placeholder))
                .unwrap_or_else(|| format!("${{{next_placeholder}}}")),
            Constraint::TypeDeclaration(_) => format!("${{{next_placeholder}}}"),
        }
    }

    /// The value type this constraint produces, when one is statically
    /// declared. Used for target typing and hover details.
    pub fn declared_type(&self) -> Option<Type> {
        match self {
            Constraint::Any(c) => Some(c.of.clone()),
            Constraint::LiteralType(c) => Some(c.ty.clone()),
            Constraint::LiteralValue(c) => Some(c.value.ty()),
            Constraint::Keyword(_) => None,
            Constraint::Reference(c) => c.of_type.clone(),
            Constraint::List(c) => Some(Type::list(elem_type(&c.elem))),
            Constraint::Set(c) => Some(Type::set(elem_type(&c.elem))),
            Constraint::Map(c) => Some(Type::map(elem_type(&c.elem))),
            Constraint::Tuple(c) => Some(Type::Tuple(
                c.elems
                    .iter()
                    .map(|e| e.declared_type().unwrap_or(Type::Dynamic))
                    .collect(),
            )),
            Constraint::Object(c) => {
                let mut object = ObjectType::default();
                for (name, attr) in &c.attributes {
                    object.attributes.insert(
                        name.clone(),
                        attr.constraint.declared_type().unwrap_or(Type::Dynamic),
                    );
                    if attr.is_optional {
                        object.optional.insert(name.clone());
                    }
                }
                Some(Type::Object(object))
            }
            Constraint::OneOf(c) => c.members.first().and_then(|m| m.declared_type()),
            Constraint::TypeDeclaration(_) => None,
        }
    }
}

fn elem_type(elem: &Option<Box<Constraint>>) -> Type {
    elem.as_ref()
        .and_then(|e| e.declared_type())
        .unwrap_or(Type::Dynamic)
}

fn type_snippet(ty: &Type, n: usize) -> String {
    match ty {
        Type::Bool => format!("${{{n}:false}}"),
        Type::Number => format!("${{{n}:0}}"),
        Type::String => format!("\"${{{n}:value}}\""),
        Type::List(_) | Type::Set(_) | Type::Tuple(_) => format!("[ ${{{n}}} ]"),
        Type::Map(_) | Type::Object(_) => format!("{{\n  ${{{n}}}\n}}"),
        Type::Dynamic => format!("${{{n}}}"),
    }
}

/// Reconstruct an equivalent concrete constraint purely from a value type,
/// so the generic recursive algorithms apply to any-typed expressions.
///
/// Primitives (and the fully dynamic type) have no concrete container
/// reconstruction and return `None`; the any-typed view handles those
/// shapes directly.
pub fn constraint_for_type(ty: &Type) -> Option<Constraint> {
    match ty {
        Type::List(elem) => Some(Constraint::list(Constraint::any((**elem).clone()))),
        Type::Set(elem) => Some(Constraint::set(Constraint::any((**elem).clone()))),
        Type::Map(elem) => Some(Constraint::map(Constraint::any((**elem).clone()))),
        Type::Tuple(elems) => Some(Constraint::Tuple(Tuple {
            elems: elems
                .iter()
                .map(|e| Constraint::literal_type(e.clone()))
                .collect(),
            description: None,
        })),
        Type::Object(object) => {
            let mut attributes = IndexMap::new();
            for (name, attr_ty) in &object.attributes {
                let mut schema = AttributeSchema::new(Constraint::any(attr_ty.clone()));
                if object.is_optional(name) {
                    schema.is_optional = true;
                }
                attributes.insert(name.clone(), schema);
            }
            Some(Constraint::Object(Object {
                attributes,
                description: None,
                allow_interpolated_keys: false,
            }))
        }
        Type::Bool | Type::Number | Type::String | Type::Dynamic => None,
    }
}
