//! Expression dispatch — position queries against constrained expressions.
//!
//! [`wrap`] pairs a borrowed AST node with the constraint governing it and
//! returns a capability view answering one query: completion, hover,
//! semantic tokens, reference origins, reference targets, or type
//! inference. Dispatch is structural — first by constraint variant, then by
//! the concrete node shape each view understands.
//!
//! Container views (list, set, map, tuple, object) share the same
//! three-phase traversal:
//!
//! 1. an unset placeholder answers with one whole-container descriptor;
//! 2. a cursor strictly inside the delimiters scans declared children in
//!    document order and recurses into the first child containing (or
//!    ending exactly at) the cursor, stopping once a child starts past it;
//! 3. anything else answers with the whole-container descriptor and its
//!    full range.

mod any;
mod keyword;
mod list;
mod literal_type;
mod literal_value;
mod map;
mod object;
mod one_of;
mod output;
mod reference;
mod set;
mod tuple;
mod type_decl;

pub use output::{
    Candidate, CandidateKind, HoverData, SemanticToken, TargetContext, TextEdit, TokenModifier,
    TokenType,
};

use crate::base::{Pos, Range};
use crate::refs::{ReferenceOrigin, ReferenceTarget, ReferenceTargets};
use crate::schema::{AttributeSchema, Constraint};
use crate::syntax::{Expression, ExprKind, FileFormat, Value};
use crate::types::{FunctionTable, Type};

/// Borrowed per-query context shared by every view in one dispatch tree.
#[derive(Clone, Copy)]
pub struct ExprContext<'a> {
    pub format: FileFormat,
    /// The file's source text; raw slices classify text between nodes.
    pub src: &'a str,
    /// Known function signatures, when the unit declares any.
    pub functions: Option<&'a FunctionTable>,
    /// Collected targets, for reference completion.
    pub targets: Option<&'a ReferenceTargets>,
}

impl<'a> ExprContext<'a> {
    pub fn new(format: FileFormat, src: &'a str) -> Self {
        Self {
            format,
            src,
            functions: None,
            targets: None,
        }
    }

    pub fn with_functions(mut self, functions: &'a FunctionTable) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_targets(mut self, targets: &'a ReferenceTargets) -> Self {
        self.targets = Some(targets);
        self
    }
}

/// A capability view over one (expression, constraint) pair.
///
/// Methods answer position queries; all of them return empty results for
/// node shapes the constraint does not recognize, so sibling branches of a
/// union keep trying. Only [`ExpressionView::infer_type`] is optional in
/// the sense of defaulting to `None`.
pub trait ExpressionView {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate>;
    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData>;
    fn semantic_tokens(&self) -> Vec<SemanticToken>;
    fn reference_origins(&self, allow_self_refs: bool) -> Vec<ReferenceOrigin>;
    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget>;

    /// The value type this expression produces, when statically known.
    fn infer_type(&self) -> Option<Type> {
        None
    }
}

/// Pair an expression with its constraint, producing the view that answers
/// position queries for it.
pub fn wrap<'a>(
    expr: &'a Expression,
    constraint: &'a Constraint,
    ctx: ExprContext<'a>,
) -> Box<dyn ExpressionView + 'a> {
    match constraint {
        Constraint::Any(cons) => Box::new(any::AnyExpr { expr, cons, ctx }),
        Constraint::LiteralType(cons) => Box::new(literal_type::LiteralTypeExpr { expr, cons, ctx }),
        Constraint::LiteralValue(cons) => {
            Box::new(literal_value::LiteralValueExpr { expr, cons, ctx })
        }
        Constraint::Keyword(cons) => Box::new(keyword::KeywordExpr { expr, cons, ctx }),
        Constraint::Reference(cons) => Box::new(reference::ReferenceExpr { expr, cons, ctx }),
        Constraint::List(cons) => Box::new(list::ListExpr { expr, cons, ctx }),
        Constraint::Set(cons) => Box::new(set::SetExpr { expr, cons, ctx }),
        Constraint::Map(cons) => Box::new(map::MapExpr { expr, cons, ctx }),
        Constraint::Tuple(cons) => Box::new(tuple::TupleExpr { expr, cons, ctx }),
        Constraint::Object(cons) => Box::new(object::ObjectExpr { expr, cons, ctx }),
        Constraint::OneOf(cons) => Box::new(one_of::OneOfExpr { expr, cons, ctx }),
        Constraint::TypeDeclaration(cons) => {
            Box::new(type_decl::TypeDeclExpr { expr, cons, ctx })
        }
    }
}

/// The friendly name of a static literal's clash with its constraint, when
/// the two cannot agree. Used to surface constraint-mismatch errors at the
/// query layer; recursive traversal itself never errors on mismatches.
pub fn literal_mismatch(expr: &Expression, constraint: &Constraint) -> Option<String> {
    match (&expr.kind, constraint) {
        (ExprKind::Literal(value), Constraint::LiteralType(cons)) => {
            if value.ty().matches(&cons.ty) || matches!(value, Value::Null) {
                None
            } else {
                Some(cons.ty.friendly_name())
            }
        }
        (ExprKind::Literal(value), Constraint::LiteralValue(cons)) => {
            if value == &cons.value {
                None
            } else {
                Some(cons.value.to_string())
            }
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Shared traversal helpers
// ---------------------------------------------------------------------------

/// Slice raw source text by byte offsets, tolerating out-of-bounds ranges.
pub(crate) fn raw_slice(src: &str, from: usize, to: usize) -> &str {
    if from > to {
        return "";
    }
    src.get(from..to).unwrap_or("")
}

/// Whether a new item may be offered between existing items.
///
/// The raw text between the last matched item and the cursor must be empty
/// or exactly one comma once trimmed; any other trailing text (an
/// incomplete item, a stray token) suppresses suggestions.
pub(crate) fn new_item_allowed(src: &str, from_byte: usize, to_byte: usize) -> bool {
    let text = raw_slice(src, from_byte, to_byte).trim();
    text.is_empty() || text == ","
}

/// Scan children in document order for the first one containing the cursor
/// or ending exactly at it. Stops once a child's start is past the cursor.
pub(crate) fn child_at_pos<T>(
    items: &[T],
    range_of: impl Fn(&T) -> Range,
    pos: Pos,
) -> Option<(usize, &T)> {
    for (i, item) in items.iter().enumerate() {
        let range = range_of(item);
        if range.start.byte > pos.byte {
            break;
        }
        if range.contains_or_ends_at(pos) {
            return Some((i, item));
        }
    }
    None
}

/// Byte offset of the end of the last item lying entirely before the cursor.
pub(crate) fn last_item_end_before<T>(
    items: &[T],
    range_of: impl Fn(&T) -> Range,
    pos: Pos,
) -> Option<usize> {
    items
        .iter()
        .map(range_of)
        .filter(|r| r.end.byte <= pos.byte)
        .map(|r| r.end.byte)
        .last()
}

// ---------------------------------------------------------------------------
// Shared rendering helpers
// ---------------------------------------------------------------------------

/// Hover text for a primitive literal: `` `literal` _typename_ ``.
pub(crate) fn hover_primitive(display: &str, type_name: &str) -> String {
    format!("`{display}` _{type_name}_")
}

/// Hover text for an empty container or a bare type: `_typename_`.
pub(crate) fn hover_type_only(type_name: &str) -> String {
    format!("_{type_name}_")
}

/// Hover text for multi-line content: a fenced block followed by the
/// type name.
pub(crate) fn hover_fenced(content: &str, type_name: &str) -> String {
    format!("```\n{content}\n```\n_{type_name}_")
}

/// Hover text for a literal value, fencing multi-line strings (quotes
/// stripped) and rendering everything else inline.
pub(crate) fn hover_value(value: &Value) -> String {
    if let Value::String(s) = value {
        if s.contains('\n') {
            return hover_fenced(s, "string");
        }
    }
    hover_primitive(&value.to_string(), &value.ty().friendly_name())
}

/// The display name a constraint's whole-container descriptor uses: the
/// declared value type when one exists, the variant's name otherwise.
pub(crate) fn descriptor_name(constraint: &Constraint) -> String {
    constraint
        .declared_type()
        .map(|t| t.friendly_name())
        .unwrap_or_else(|| constraint.friendly_name())
}

/// The whole-container descriptor as hover data.
pub(crate) fn container_hover(constraint: &Constraint, range: Range) -> HoverData {
    let mut content = hover_type_only(&descriptor_name(constraint));
    if let Some(description) = constraint.description() {
        content.push_str("\n\n");
        content.push_str(description);
    }
    HoverData { content, range }
}

/// The whole-container descriptor as a completion candidate.
pub(crate) fn container_candidate(constraint: &Constraint, range: Range) -> Candidate {
    let label = match constraint {
        Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => "[ ]",
        Constraint::Map(_) | Constraint::Object(_) => "{ }",
        _ => return value_candidate(constraint, range),
    };
    let mut candidate = Candidate::new(
        label,
        output::kind_for_constraint(constraint),
        TextEdit::new(range, label).with_snippet(constraint.snippet(1)),
    )
    .with_detail(descriptor_name(constraint));
    if let Some(description) = constraint.description() {
        candidate = candidate.with_description(description.clone());
    }
    candidate
}

/// A candidate inserting a fresh value of the given constraint at `range`.
pub(crate) fn value_candidate(constraint: &Constraint, range: Range) -> Candidate {
    let snippet = constraint.snippet(1);
    let plain = strip_placeholders(&snippet);
    let mut candidate = Candidate::new(
        constraint.friendly_name(),
        output::kind_for_constraint(constraint),
        TextEdit::new(range, plain).with_snippet(snippet),
    )
    .with_detail(descriptor_name(constraint));
    if let Some(description) = constraint.description() {
        candidate = candidate.with_description(description.clone());
    }
    candidate
}

/// Reduce a snippet to its plain insertion text: `${n:default}` markers
/// become their default, bare `${n}` markers disappear. Editors without
/// snippet support insert this text instead.
pub(crate) fn strip_placeholders(snippet: &str) -> String {
    let mut out = String::with_capacity(snippet.len());
    let mut rest = snippet;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                if let Some((_, default)) = after[..end].split_once(':') {
                    out.push_str(default);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Completion detail for an attribute: `required, string` style.
pub(crate) fn attribute_detail(schema: &AttributeSchema) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);
    parts.push(if schema.is_optional {
        "optional".to_string()
    } else {
        "required".to_string()
    });
    if schema.is_sensitive {
        parts.push("sensitive".to_string());
    }
    parts.push(descriptor_name(&schema.constraint));
    parts.join(", ")
}
