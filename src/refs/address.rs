//! Symbol addresses.

use smol_str::SmolStr;

use crate::syntax::{Number, Traversal, TraverseStep, Value};

/// An ordered sequence of typed steps identifying a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Address(pub Vec<Step>);

/// One step of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// The root name.
    Root(SmolStr),
    /// An attribute access.
    Attr(SmolStr),
    /// An index access; numeric keys compare by value, not text.
    Index(IndexKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Num(Number),
    Str(SmolStr),
}

impl Address {
    pub fn root(name: impl Into<SmolStr>) -> Self {
        Self(vec![Step::Root(name.into())])
    }

    /// Convert a traversal into an address.
    ///
    /// Returns `None` when a step is not expressible (an index that is not
    /// a number or string literal); callers skip such traversals instead of
    /// failing the surrounding walk.
    pub fn from_traversal(traversal: &Traversal) -> Option<Address> {
        let mut steps = Vec::with_capacity(traversal.steps.len());
        for step in &traversal.steps {
            match step {
                TraverseStep::Root { name, .. } => steps.push(Step::Root(name.clone())),
                TraverseStep::Attr { name, .. } => steps.push(Step::Attr(name.clone())),
                TraverseStep::Index { key, .. } => match key {
                    Value::Number(n) => steps.push(Step::Index(IndexKey::Num(*n))),
                    Value::String(s) => steps.push(Step::Index(IndexKey::Str(s.clone()))),
                    _ => return None,
                },
            }
        }
        if steps.is_empty() {
            return None;
        }
        Some(Address(steps))
    }

    /// Extend with an attribute step.
    pub fn attr(&self, name: impl Into<SmolStr>) -> Address {
        let mut steps = self.0.clone();
        steps.push(Step::Attr(name.into()));
        Address(steps)
    }

    /// Extend with a numeric index step.
    pub fn index_num(&self, n: f64) -> Address {
        let mut steps = self.0.clone();
        steps.push(Step::Index(IndexKey::Num(Number(n))));
        Address(steps)
    }

    /// Extend with a string index step.
    pub fn index_str(&self, key: impl Into<SmolStr>) -> Address {
        let mut steps = self.0.clone();
        steps.push(Step::Index(IndexKey::Str(key.into())));
        Address(steps)
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The root name, when the address starts with one.
    pub fn root_name(&self) -> Option<&SmolStr> {
        match self.0.first() {
            Some(Step::Root(name)) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in &self.0 {
            match step {
                Step::Root(name) => write!(f, "{name}")?,
                Step::Attr(name) => write!(f, ".{name}")?,
                Step::Index(IndexKey::Num(n)) => write!(f, "[{n}]")?,
                Step::Index(IndexKey::Str(s)) => write!(f, "[\"{s}\"]")?,
            }
        }
        Ok(())
    }
}
