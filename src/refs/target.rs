//! Reference targets.

use smol_str::SmolStr;

use crate::base::{FileId, Pos, Range};
use crate::types::Type;

use super::{Address, ScopeId};

/// A point where a symbol is defined and addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTarget {
    pub addr: Address,
    /// Human-facing name shown in completion details.
    pub name: Option<SmolStr>,
    pub scope_id: Option<ScopeId>,
    /// Value type, when the declaring constraint is type-aware.
    pub ty: Option<Type>,
    /// Range of the whole definition; `None` for externally declared targets.
    pub range: Option<Range>,
    /// Range of just the defining name.
    pub def_range: Option<Range>,
    /// When set, only origins inside this range may address the target.
    pub visible_in: Option<Range>,
    /// Independently addressable parts of a composite value.
    pub nested: Vec<ReferenceTarget>,
}

impl ReferenceTarget {
    pub fn new(addr: Address) -> Self {
        Self {
            addr,
            name: None,
            scope_id: None,
            ty: None,
            range: None,
            def_range: None,
            visible_in: None,
            nested: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope_id = Some(scope);
        self
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_def_range(mut self, range: Range) -> Self {
        self.def_range = Some(range);
        self
    }

    pub fn with_visible_in(mut self, range: Range) -> Self {
        self.visible_in = Some(range);
        self
    }

    pub fn with_nested(mut self, nested: Vec<ReferenceTarget>) -> Self {
        self.nested = nested;
        self
    }

    /// This target and every nested target, depth-first.
    pub fn walk(&self, f: &mut dyn FnMut(&ReferenceTarget)) {
        f(self);
        for nested in &self.nested {
            nested.walk(f);
        }
    }
}

/// All targets collected from one analysis unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTargets(pub Vec<ReferenceTarget>);

impl ReferenceTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: ReferenceTarget) {
        self.0.push(target);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceTarget> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level and nested targets, depth-first.
    pub fn deep_iter(&self) -> Vec<&ReferenceTarget> {
        let mut out = Vec::new();
        fn visit<'t>(target: &'t ReferenceTarget, out: &mut Vec<&'t ReferenceTarget>) {
            out.push(target);
            for nested in &target.nested {
                visit(nested, out);
            }
        }
        for target in &self.0 {
            visit(target, &mut out);
        }
        out
    }

    /// Targets (including nested ones) whose defining name contains the position.
    pub fn at_def_pos(&self, file: FileId, pos: Pos) -> Vec<&ReferenceTarget> {
        self.deep_iter()
            .into_iter()
            .filter(|t| {
                t.def_range
                    .map(|r| r.file == file && r.contains_or_ends_at(pos))
                    .unwrap_or(false)
            })
            .collect()
    }
}

impl IntoIterator for ReferenceTargets {
    type Item = ReferenceTarget;
    type IntoIter = std::vec::IntoIter<ReferenceTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
