//! Reference origins.

use smol_str::SmolStr;

use crate::base::{FileId, Pos, Range};
use crate::types::Type;

use super::{Address, ScopeId};

/// A constraint an origin places on acceptable targets.
///
/// An origin may carry several; a target satisfying any one of them matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OriginConstraint {
    pub of_type: Option<Type>,
    pub of_scope: Option<ScopeId>,
}

impl OriginConstraint {
    pub fn of_type(ty: Type) -> Self {
        Self {
            of_type: Some(ty),
            of_scope: None,
        }
    }

    pub fn of_scope(scope: ScopeId) -> Self {
        Self {
            of_type: None,
            of_scope: Some(scope),
        }
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.of_scope = Some(scope);
        self
    }
}

/// A symbol usage addressing a target within the same analysis unit.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOrigin {
    pub addr: Address,
    pub range: Range,
    pub constraints: Vec<OriginConstraint>,
}

/// A symbol usage addressing a target in another analysis unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOrigin {
    pub range: Range,
    pub target_addr: Address,
    /// Name of the analysis unit the target lives in.
    pub target_path: SmolStr,
    pub constraints: Vec<OriginConstraint>,
}

/// A point where a symbol is used.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceOrigin {
    Local(LocalOrigin),
    Path(PathOrigin),
}

impl ReferenceOrigin {
    pub fn local(addr: Address, range: Range, constraints: Vec<OriginConstraint>) -> Self {
        ReferenceOrigin::Local(LocalOrigin {
            addr,
            range,
            constraints,
        })
    }

    pub fn range(&self) -> Range {
        match self {
            ReferenceOrigin::Local(o) => o.range,
            ReferenceOrigin::Path(o) => o.range,
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            ReferenceOrigin::Local(o) => &o.addr,
            ReferenceOrigin::Path(o) => &o.target_addr,
        }
    }

    pub fn constraints(&self) -> &[OriginConstraint] {
        match self {
            ReferenceOrigin::Local(o) => &o.constraints,
            ReferenceOrigin::Path(o) => &o.constraints,
        }
    }
}

/// All origins collected from one analysis unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceOrigins(pub Vec<ReferenceOrigin>);

impl ReferenceOrigins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, origin: ReferenceOrigin) {
        self.0.push(origin);
    }

    pub fn extend(&mut self, origins: impl IntoIterator<Item = ReferenceOrigin>) {
        self.0.extend(origins);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceOrigin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Origins whose range contains the position.
    pub fn at_pos(&self, file: FileId, pos: Pos) -> Vec<&ReferenceOrigin> {
        self.0
            .iter()
            .filter(|o| {
                let range = o.range();
                range.file == file && range.contains_or_ends_at(pos)
            })
            .collect()
    }
}

impl std::ops::Index<usize> for ReferenceOrigins {
    type Output = ReferenceOrigin;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for ReferenceOrigins {
    type Item = ReferenceOrigin;
    type IntoIter = std::vec::IntoIter<ReferenceOrigin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
