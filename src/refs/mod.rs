//! Reference model: addresses, origins, targets, and matching.
//!
//! A *target* is a point where a symbol is defined and addressable; an
//! *origin* is a point where a symbol is used. Collection walks parsed
//! bodies against the schema (see `ide::references`); matching is pure and
//! lives here.

mod address;
mod matching;
mod origin;
mod target;

pub use address::{Address, IndexKey, Step};
pub use matching::{match_targets, targeting};
pub use origin::{LocalOrigin, OriginConstraint, PathOrigin, ReferenceOrigin, ReferenceOrigins};
pub use target::{ReferenceTarget, ReferenceTargets};

use smol_str::SmolStr;

/// An identifier grouping targets into a namespace-like scope
/// (e.g. everything addressable as a "variable").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(pub SmolStr);

impl ScopeId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}
