//! Data produced by expression views: completion candidates, hover data,
//! semantic tokens, and the context for building reference targets.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::Range;
use crate::refs::{Address, ReferenceTarget, ScopeId};
use crate::schema::Constraint;
use crate::types::Type;

/// Kind of completion candidate, used by editors to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Attribute,
    Block,
    Label,
    Keyword,
    Bool,
    Number,
    String,
    List,
    Set,
    Map,
    Tuple,
    Object,
    Reference,
    Function,
    Type,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Attribute => "attribute",
            CandidateKind::Block => "block",
            CandidateKind::Label => "label",
            CandidateKind::Keyword => "keyword",
            CandidateKind::Bool => "bool",
            CandidateKind::Number => "number",
            CandidateKind::String => "string",
            CandidateKind::List => "list",
            CandidateKind::Set => "set",
            CandidateKind::Map => "map",
            CandidateKind::Tuple => "tuple",
            CandidateKind::Object => "object",
            CandidateKind::Reference => "reference",
            CandidateKind::Function => "function",
            CandidateKind::Type => "type",
        }
    }
}

/// The candidate kind a constraint's values complete as.
pub(crate) fn kind_for_constraint(cons: &Constraint) -> CandidateKind {
    match cons {
        Constraint::Any(c) => kind_for_type(&c.of),
        Constraint::LiteralType(c) => kind_for_type(&c.ty),
        Constraint::LiteralValue(c) => kind_for_type(&c.value.ty()),
        Constraint::Keyword(_) => CandidateKind::Keyword,
        Constraint::Reference(_) => CandidateKind::Reference,
        Constraint::List(_) => CandidateKind::List,
        Constraint::Set(_) => CandidateKind::Set,
        Constraint::Map(_) => CandidateKind::Map,
        Constraint::Tuple(_) => CandidateKind::Tuple,
        Constraint::Object(_) => CandidateKind::Object,
        Constraint::OneOf(c) => c
            .members
            .first()
            .map(kind_for_constraint)
            .unwrap_or(CandidateKind::Attribute),
        Constraint::TypeDeclaration(_) => CandidateKind::Type,
    }
}

fn kind_for_type(ty: &Type) -> CandidateKind {
    match ty {
        Type::Bool => CandidateKind::Bool,
        Type::Number => CandidateKind::Number,
        Type::String => CandidateKind::String,
        Type::List(_) => CandidateKind::List,
        Type::Set(_) => CandidateKind::Set,
        Type::Map(_) => CandidateKind::Map,
        Type::Tuple(_) => CandidateKind::Tuple,
        Type::Object(_) => CandidateKind::Object,
        Type::Dynamic => CandidateKind::Attribute,
    }
}

/// An exact text substitution, optionally with a snippet variant carrying
/// `${n}` placeholder markers.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
    pub snippet: Option<String>,
}

impl TextEdit {
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// A completion candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The text shown in the completion list.
    pub label: SmolStr,
    /// Detail text shown after the label (e.g. `required, string`).
    pub detail: Option<String>,
    /// Documentation shown in the detail popup.
    pub description: Option<Arc<str>>,
    pub kind: CandidateKind,
    pub edit: TextEdit,
    /// Ask the editor to immediately re-trigger completion after applying.
    pub trigger_suggest: bool,
    /// Overrides label-based sorting when present.
    pub sort_text: Option<String>,
}

impl Candidate {
    pub fn new(label: impl Into<SmolStr>, kind: CandidateKind, edit: TextEdit) -> Self {
        Self {
            label: label.into(),
            detail: None,
            description: None,
            kind,
            edit,
            trigger_suggest: false,
            sort_text: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sort_text(mut self, sort_text: impl Into<String>) -> Self {
        self.sort_text = Some(sort_text.into());
        self
    }

    pub fn triggers_suggest(mut self) -> Self {
        self.trigger_suggest = true;
        self
    }
}

/// Result of a hover query: markdown plus the range it documents.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverData {
    pub content: String,
    pub range: Range,
}

/// Semantic token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    AttrName,
    BlockType,
    BlockLabel,
    Bool,
    Number,
    String,
    Keyword,
    ReferenceStep,
    MapKey,
    ObjectKey,
    TypeName,
    FunctionName,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::AttrName => "attrName",
            TokenType::BlockType => "blockType",
            TokenType::BlockLabel => "blockLabel",
            TokenType::Bool => "bool",
            TokenType::Number => "number",
            TokenType::String => "string",
            TokenType::Keyword => "keyword",
            TokenType::ReferenceStep => "referenceStep",
            TokenType::MapKey => "mapKey",
            TokenType::ObjectKey => "objectKey",
            TokenType::TypeName => "typeName",
            TokenType::FunctionName => "functionName",
        }
    }
}

/// Extra facts about a token, rendered as modifiers by editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenModifier {
    /// The named schema element is deprecated.
    Deprecated,
    /// The token participates in dependent-body selection.
    DepKey,
}

/// One classified token.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticToken {
    pub token_type: TokenType,
    pub modifiers: Vec<TokenModifier>,
    pub range: Range,
}

impl SemanticToken {
    pub fn new(token_type: TokenType, range: Range) -> Self {
        Self {
            token_type,
            modifiers: Vec::new(),
            range,
        }
    }

    pub fn with_modifier(mut self, modifier: TokenModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// Context for building reference targets out of an expression.
///
/// The collector computes the address and metadata from the attribute's
/// address descriptor; the expression view fills in the value type and
/// nested targets for composite values.
#[derive(Debug, Clone)]
pub struct TargetContext {
    pub addr: Address,
    pub name: Option<SmolStr>,
    pub scope_id: Option<ScopeId>,
    /// Attach the value's inferred type and make parts addressable.
    pub infer_type: bool,
    pub range: Option<Range>,
    pub def_range: Option<Range>,
    pub visible_in: Option<Range>,
}

impl TargetContext {
    pub fn new(addr: Address) -> Self {
        Self {
            addr,
            name: None,
            scope_id: None,
            infer_type: false,
            range: None,
            def_range: None,
            visible_in: None,
        }
    }

    /// The target this context describes, before nesting is attached.
    pub fn base_target(&self, ty: Option<Type>) -> ReferenceTarget {
        let mut target = ReferenceTarget::new(self.addr.clone());
        target.name = self.name.clone();
        target.scope_id = self.scope_id.clone();
        target.ty = ty;
        target.range = self.range;
        target.def_range = self.def_range;
        target.visible_in = self.visible_in;
        target
    }

    /// A derived context for one part of a composite value.
    pub(crate) fn nested(&self, addr: Address, range: Range) -> TargetContext {
        TargetContext {
            addr,
            name: None,
            scope_id: self.scope_id.clone(),
            infer_type: self.infer_type,
            range: Some(range),
            def_range: None,
            visible_in: self.visible_in,
        }
    }
}
