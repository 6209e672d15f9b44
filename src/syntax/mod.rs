//! Syntax: AST node types for parsed Strata bodies.
//!
//! Parsing text into these nodes happens outside this crate (the host embeds
//! a parser for the native syntax and one for the JSON mapping). The engine
//! borrows nodes for the duration of one query and never mutates them.
//!
//! Every node carries its source [`Range`](crate::base::Range); editor
//! features substitute text directly against those ranges.

mod body;
mod expr;
mod file;
mod value;

pub use body::{Attribute, Block, Body, Label};
pub use expr::{
    Expression, ExprKind, ForExpr, FuncCall, ObjectItem, TemplatePart, Traversal, TraverseStep,
};
pub use file::{FileFormat, ParsedFile, JSON_EXT, NATIVE_EXT};
pub use value::{Number, Value};

/// Whether a key can be written bare (as an identifier) or needs quoting.
pub fn is_bare_key(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| unicode_ident::is_xid_continue(c) || c == '-')
}
