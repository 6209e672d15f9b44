//! Bodies, blocks, attributes, labels.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{Pos, Range};

use super::Expression;

/// A document body: attributes and nested blocks.
///
/// `range` spans the body's delimiters; for a file's top-level body it spans
/// the whole file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub attributes: IndexMap<SmolStr, Attribute>,
    pub blocks: Vec<Block>,
    pub range: Option<Range>,
}

impl Body {
    pub fn new(range: Range) -> Self {
        Self {
            attributes: IndexMap::new(),
            blocks: Vec::new(),
            range: Some(range),
        }
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.insert(attr.name.clone(), attr);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// The attribute whose name or value contains the position.
    pub fn attribute_at(&self, pos: Pos) -> Option<&Attribute> {
        self.attributes
            .values()
            .find(|a| a.range.contains_or_ends_at(pos))
    }

    /// The block whose range contains the position.
    pub fn block_at(&self, pos: Pos) -> Option<&Block> {
        self.blocks.iter().find(|b| b.range.contains_or_ends_at(pos))
    }
}

/// A named attribute: `name = <expression>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: SmolStr,
    pub name_range: Range,
    pub value: Expression,
    /// Spans from the first character of the name to the end of the value.
    pub range: Range,
}

impl Attribute {
    pub fn new(name: impl Into<SmolStr>, name_range: Range, value: Expression) -> Self {
        let name = name.into();
        let range = Range::new(name_range.file, name_range.start, value.range.end);
        Self {
            name,
            name_range,
            value,
            range,
        }
    }
}

/// A block: `type "label0" "label1" { <body> }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub block_type: SmolStr,
    pub type_range: Range,
    pub labels: Vec<Label>,
    /// `None` for a block whose body failed to parse.
    pub body: Option<Body>,
    /// Spans from the type name to the closing delimiter.
    pub range: Range,
}

impl Block {
    pub fn new(block_type: impl Into<SmolStr>, type_range: Range, range: Range) -> Self {
        Self {
            block_type: block_type.into(),
            type_range,
            labels: Vec::new(),
            body: None,
            range,
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn label_value(&self, index: usize) -> Option<&SmolStr> {
        self.labels.get(index).map(|l| &l.value)
    }
}

/// A block label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub value: SmolStr,
    pub range: Range,
}

impl Label {
    pub fn new(value: impl Into<SmolStr>, range: Range) -> Self {
        Self {
            value: value.into(),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::syntax::Value;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    #[test]
    fn test_attribute_range_spans_name_to_value() {
        // name = true
        let attr = Attribute::new(
            "name",
            r(0, 4),
            Expression::literal(Value::Bool(true), r(7, 11)),
        );
        assert_eq!(attr.range, r(0, 11));
    }

    #[test]
    fn test_lookup_at_position() {
        let body = Body::new(r(0, 30))
            .with_attribute(Attribute::new(
                "a",
                r(2, 3),
                Expression::literal(Value::Bool(true), r(6, 10)),
            ))
            .with_block(Block::new("blk", r(12, 15), r(12, 25)));

        assert_eq!(
            body.attribute_at(Pos::new(0, 7, 7)).map(|a| a.name.as_str()),
            Some("a")
        );
        assert!(body.attribute_at(Pos::new(0, 20, 20)).is_none());
        assert_eq!(
            body.block_at(Pos::new(0, 20, 20)).map(|b| b.block_type.as_str()),
            Some("blk")
        );
    }
}
