//! Schema: author-supplied description of what a document may contain.
//!
//! A schema tree mirrors the document tree: a [`BodySchema`] describes
//! attributes and blocks, each attribute carries a [`Constraint`] describing
//! the expression shapes acceptable for its value, and a [`BlockSchema`] may
//! swap in a different nested body depending on the block's labels and
//! attributes (see [`resolver`]).
//!
//! Schema values are immutable configuration: traversal never mutates them.

mod body;
mod constraint;
mod key;
pub mod resolver;

pub use body::{
    AddrStep, AttributeAddrSchema, AttributeSchema, BlockSchema, BodySchema, LabelSchema,
};
pub use constraint::{
    constraint_for_type, AnyExpression, Keyword, List, LiteralType, LiteralValue, Map, Object,
    OneOf, Reference, ReferenceAddrSchema, Set, Tuple, TypeDeclaration,
};
pub use constraint::Constraint;
pub use key::{AttributeDependent, DependentValue, LabelDependent, SchemaKey};
