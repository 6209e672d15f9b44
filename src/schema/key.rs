//! Canonical schema keys for dependent-body lookup.

use smol_str::SmolStr;

use crate::refs::Address;
use crate::syntax::Value;

/// A canonical, order-independent encoding of the dependency values that
/// select one dependent body schema.
///
/// The constructor sorts label dependents by index and attribute dependents
/// by name, so two keys built from the same values in any order are equal
/// and hash identically. Lookup is therefore a plain map hit, never an
/// ambiguity search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    labels: Vec<LabelDependent>,
    attributes: Vec<AttributeDependent>,
}

/// A label whose literal text selects the dependent body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelDependent {
    pub index: usize,
    pub value: SmolStr,
}

/// An attribute whose statically known value selects the dependent body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeDependent {
    pub name: SmolStr,
    pub value: DependentValue,
}

/// The expected value of a dependency-key attribute: a literal, or the
/// fully qualified address the attribute must reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependentValue {
    Literal(Value),
    Address(Address),
}

impl SchemaKey {
    pub fn new(
        mut labels: Vec<LabelDependent>,
        mut attributes: Vec<AttributeDependent>,
    ) -> Self {
        labels.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.value.cmp(&b.value)));
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        Self { labels, attributes }
    }

    /// A key selected by a single label value.
    pub fn for_label(index: usize, value: impl Into<SmolStr>) -> Self {
        Self::new(
            vec![LabelDependent {
                index,
                value: value.into(),
            }],
            Vec::new(),
        )
    }

    pub fn labels(&self) -> &[LabelDependent] {
        &self.labels
    }

    pub fn attributes(&self) -> &[AttributeDependent] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.attributes.is_empty()
    }

    /// Total number of dependency values encoded.
    pub fn len(&self) -> usize {
        self.labels.len() + self.attributes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalization_makes_order_irrelevant() {
        let a = SchemaKey::new(
            vec![
                LabelDependent {
                    index: 1,
                    value: "b".into(),
                },
                LabelDependent {
                    index: 0,
                    value: "a".into(),
                },
            ],
            vec![
                AttributeDependent {
                    name: "zeta".into(),
                    value: DependentValue::Literal(Value::Bool(true)),
                },
                AttributeDependent {
                    name: "alpha".into(),
                    value: DependentValue::Literal(Value::string("x")),
                },
            ],
        );
        let b = SchemaKey::new(
            vec![
                LabelDependent {
                    index: 0,
                    value: "a".into(),
                },
                LabelDependent {
                    index: 1,
                    value: "b".into(),
                },
            ],
            vec![
                AttributeDependent {
                    name: "alpha".into(),
                    value: DependentValue::Literal(Value::string("x")),
                },
                AttributeDependent {
                    name: "zeta".into(),
                    value: DependentValue::Literal(Value::Bool(true)),
                },
            ],
        );
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let hash = |k: &SchemaKey| {
            let mut h = DefaultHasher::new();
            k.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_numeric_dependent_values_compare_by_value() {
        let a = SchemaKey::new(
            Vec::new(),
            vec![AttributeDependent {
                name: "count".into(),
                value: DependentValue::Literal(Value::number(1.0)),
            }],
        );
        let b = SchemaKey::new(
            Vec::new(),
            vec![AttributeDependent {
                name: "count".into(),
                value: DependentValue::Literal(Value::number(1.0)),
            }],
        );
        assert_eq!(a, b);
    }
}
