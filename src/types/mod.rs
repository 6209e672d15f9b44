//! Value type model.
//!
//! Types describe the shape of fully evaluated expression values. They are
//! used three ways: to parameterize any-typed constraints, to annotate
//! reference targets so origins can be matched by type, and to render the
//! `_typename_` part of hover text.

mod function;

pub use function::{FunctionSignature, Parameter};

/// Function name → signature, as supplied by the embedder per path.
pub type FunctionTable = rustc_hash::FxHashMap<smol_str::SmolStr, FunctionSignature>;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// The type of a fully evaluated expression value.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Unknown at analysis time; compatible with every other type.
    Dynamic,
    Bool,
    Number,
    String,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Tuple(Vec<Type>),
    Object(ObjectType),
}

/// An object type: named attributes, some of which may be optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    /// Attribute name → attribute type, in declaration order.
    pub attributes: IndexMap<SmolStr, Type>,
    /// Names of attributes that may be absent from a value of this type.
    pub optional: FxHashSet<SmolStr>,
}

impl ObjectType {
    pub fn new(attributes: IndexMap<SmolStr, Type>) -> Self {
        Self {
            attributes,
            optional: FxHashSet::default(),
        }
    }

    /// Mark an attribute as optional.
    pub fn with_optional(mut self, name: impl Into<SmolStr>) -> Self {
        self.optional.insert(name.into());
        self
    }

    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.contains(name)
    }
}

impl Type {
    /// Convenience constructor for `List(elem)`.
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    /// Convenience constructor for `Set(elem)`.
    pub fn set(elem: Type) -> Self {
        Type::Set(Box::new(elem))
    }

    /// Convenience constructor for `Map(elem)`.
    pub fn map(elem: Type) -> Self {
        Type::Map(Box::new(elem))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Bool | Type::Number | Type::String)
    }

    /// The human-facing name used in hover text and completion details.
    pub fn friendly_name(&self) -> String {
        match self {
            Type::Dynamic => "any type".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Number => "number".to_string(),
            Type::String => "string".to_string(),
            Type::List(elem) => format!("list of {}", elem.friendly_name()),
            Type::Set(elem) => format!("set of {}", elem.friendly_name()),
            Type::Map(elem) => format!("map of {}", elem.friendly_name()),
            Type::Tuple(_) => "tuple".to_string(),
            Type::Object(_) => "object".to_string(),
        }
    }

    /// Two types are compatible when equal or when either is fully dynamic.
    pub fn matches(&self, other: &Type) -> bool {
        self.is_dynamic() || other.is_dynamic() || self == other
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.friendly_name())
    }
}
