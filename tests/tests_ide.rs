//! End-to-end query tests: completion, hover, and semantic tokens against
//! hand-built bodies, the way an LSP handler would call the crate.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rstest::rstest;

use strata::base::{FileId, Pos, Range};
use strata::ide;
use strata::path::PathContext;
use strata::schema::{
    AttributeDependent, AttributeSchema, BlockSchema, BodySchema, Constraint, DependentValue,
    LabelDependent, LabelSchema, SchemaKey,
};
use strata::syntax::{Attribute, Block, Body, Expression, ExprKind, Label, Value};
use strata::types::Type;

// ---------------------------------------------------------------------------
// Helpers: ranges computed from the source text itself
// ---------------------------------------------------------------------------

fn pos_at(src: &str, byte: usize) -> Pos {
    let mut line = 0;
    let mut column = 0;
    for (i, ch) in src.char_indices() {
        if i == byte {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    Pos::new(line, column, byte)
}

fn span(file: FileId, src: &str, start: usize, end: usize) -> Range {
    Range::new(file, pos_at(src, start), pos_at(src, end))
}

/// Byte offset of a pattern's first occurrence.
fn loc(src: &str, pat: &str) -> usize {
    src.find(pat).unwrap_or_else(|| panic!("pattern {pat:?} not in source"))
}

const FILE: FileId = FileId(0);

// ---------------------------------------------------------------------------
// Provider fixture: dependent bodies selected by label + backend attribute
// ---------------------------------------------------------------------------

static PROVIDER_SCHEMA: Lazy<BodySchema> = Lazy::new(|| {
    let static_body = BodySchema::new().with_attribute(
        "backend",
        AttributeSchema::new(Constraint::literal_type(Type::String)).optional(),
    );
    let by_label = BodySchema::new().with_attribute(
        "region",
        AttributeSchema::new(Constraint::literal_type(Type::String)),
    );
    let by_label_and_backend = BodySchema::new().with_attribute(
        "bucket",
        AttributeSchema::new(Constraint::literal_type(Type::String)),
    );
    BodySchema::new().with_block(
        "provider",
        BlockSchema::new()
            .with_label(LabelSchema::new("name").dep_key())
            .with_body(static_body)
            .with_dependent_body(SchemaKey::for_label(0, "theircloud"), by_label)
            .with_dependent_body(
                SchemaKey::new(
                    vec![LabelDependent {
                        index: 0,
                        value: "theircloud".into(),
                    }],
                    vec![AttributeDependent {
                        name: "backend".into(),
                        value: DependentValue::Literal(Value::string("special")),
                    }],
                ),
                by_label_and_backend,
            ),
    )
});

/// provider "theircloud" { backend = "<backend>" }
fn provider_path(backend: Option<&str>) -> (PathContext, FileId, String) {
    let src = match backend {
        Some(b) => format!("provider \"theircloud\" {{\n  backend = \"{b}\"\n\n}}\n"),
        None => "provider \"theircloud\" {\n\n}\n".to_string(),
    };
    let label_start = loc(&src, "\"theircloud\"");
    let brace = loc(&src, "{");
    let close = loc(&src, "}");

    let mut body = Body::new(span(FILE, &src, brace, close + 1));
    if let Some(b) = backend {
        let name_start = loc(&src, "backend");
        let value_start = loc(&src, &format!("\"{b}\""));
        body = body.with_attribute(Attribute::new(
            "backend",
            span(FILE, &src, name_start, name_start + 7),
            Expression::literal(
                Value::string(b),
                span(FILE, &src, value_start, value_start + b.len() + 2),
            ),
        ));
    }
    let block = Block::new(
        "provider",
        span(FILE, &src, 0, 8),
        span(FILE, &src, 0, close + 1),
    )
    .with_label(Label::new(
        "theircloud",
        span(FILE, &src, label_start, label_start + 12),
    ))
    .with_body(body);

    let top = Body::new(span(FILE, &src, 0, src.len())).with_block(block);
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(PROVIDER_SCHEMA.clone()));
    let file = path.add_file("main.strata", src.clone(), top).unwrap();
    (path, file, src)
}

#[rstest]
#[case(None, "region")]
#[case(Some("special"), "bucket")]
#[case(Some("other"), "region")]
fn test_dependent_body_selected_by_keys(
    #[case] backend: Option<&str>,
    #[case] expected: &str,
) {
    let (path, file, src) = provider_path(backend);
    // Complete on the empty line inside the block body.
    let at = src.rfind("\n\n").unwrap() + 1;
    let candidates = ide::completion_at_pos(&path, file, pos_at(&src, at)).unwrap();
    let labels: Vec<_> = candidates.iter().map(|c| c.label.as_str()).collect();
    assert!(
        labels.contains(&expected),
        "expected {expected:?} among {labels:?}"
    );
}

#[test]
fn test_dep_key_label_token_and_completion() {
    let (path, file, src) = provider_path(None);

    let tokens = ide::semantic_tokens(&path, file).unwrap();
    let label_token = tokens
        .iter()
        .find(|t| t.token_type == ide::TokenType::BlockLabel)
        .unwrap();
    assert_eq!(label_token.modifiers, vec![ide::TokenModifier::DepKey]);

    // Completing inside the label offers the registered dependency values.
    let inside_label = loc(&src, "theircloud") + 2;
    let candidates = ide::completion_at_pos(&path, file, pos_at(&src, inside_label)).unwrap();
    let labels: Vec<_> = candidates.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["theircloud"]);
    assert!(candidates[0].trigger_suggest);
}

#[test]
fn test_position_between_header_and_brace() {
    let src = "provider \"theircloud\"  {\n\n}\n";
    let label_start = loc(src, "\"theircloud\"");
    let brace = loc(src, "{");
    let close = loc(src, "}");
    let block = Block::new(
        "provider",
        span(FILE, src, 0, 8),
        span(FILE, src, 0, close + 1),
    )
    .with_label(Label::new(
        "theircloud",
        span(FILE, src, label_start, label_start + 12),
    ))
    .with_body(Body::new(span(FILE, src, brace, close + 1)));
    let top = Body::new(span(FILE, src, 0, src.len())).with_block(block);
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(PROVIDER_SCHEMA.clone()));
    let file = path.add_file("main.strata", src, top).unwrap();

    // The second space, strictly between the label and the opening brace.
    let gap = pos_at(src, brace - 1);
    let err = ide::completion_at_pos(&path, file, gap).unwrap_err();
    assert_eq!(err.to_string(), "position outside of \"provider\" body");

    let err = ide::hover_at_pos(&path, file, gap).unwrap_err();
    assert_eq!(err.to_string(), "position outside of \"provider\" body");
}

#[test]
fn test_unknown_attribute_named_in_error() {
    let src = "mystery = true\n";
    let body = Body::new(span(FILE, src, 0, src.len())).with_attribute(Attribute::new(
        "mystery",
        span(FILE, src, 0, 7),
        Expression::literal(Value::Bool(true), span(FILE, src, 10, 14)),
    ));
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(PROVIDER_SCHEMA.clone()));
    let file = path.add_file("main.strata", src, body).unwrap();

    let err = ide::hover_at_pos(&path, file, pos_at(src, 12)).unwrap_err();
    assert_eq!(err.to_string(), "unknown attribute \"mystery\"");
}

// ---------------------------------------------------------------------------
// Container traversal through the full query surface
// ---------------------------------------------------------------------------

fn list_schema() -> BodySchema {
    BodySchema::new().with_attribute(
        "command",
        AttributeSchema::new(Constraint::list(Constraint::literal_type(Type::String))),
    )
}

#[test]
fn test_empty_multiline_list_hover_spans_delimiters() {
    let src = "command = [\n\n]\n";
    let open = loc(src, "[");
    let close = loc(src, "]");
    let value = Expression::new(ExprKind::Tuple(Vec::new()), span(FILE, src, open, close + 1));
    let body = Body::new(span(FILE, src, 0, src.len())).with_attribute(Attribute::new(
        "command",
        span(FILE, src, 0, 7),
        value,
    ));
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(list_schema()));
    let file = path.add_file("main.strata", src, body).unwrap();

    // Interior position on the empty line between the delimiters.
    let hover = ide::hover_at_pos(&path, file, pos_at(src, open + 1)).unwrap();
    assert_eq!(hover.content, "_list of string_");
    assert_eq!(hover.range, span(FILE, src, open, close + 1));
    assert_eq!(hover.range.start.line, 0);
    assert_eq!(hover.range.end.line, 2);
}

#[test]
fn test_list_item_queries_and_range_nesting() {
    let src = "command = [\"run\", \"serve\"]\n";
    let first = loc(src, "\"run\"");
    let second = loc(src, "\"serve\"");
    let open = loc(src, "[");
    let value_range = span(FILE, src, open, loc(src, "]") + 1);
    let value = Expression::new(
        ExprKind::Tuple(vec![
            Expression::literal(Value::string("run"), span(FILE, src, first, first + 5)),
            Expression::literal(Value::string("serve"), span(FILE, src, second, second + 7)),
        ]),
        value_range,
    );
    let body = Body::new(span(FILE, src, 0, src.len())).with_attribute(Attribute::new(
        "command",
        span(FILE, src, 0, 7),
        value,
    ));
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(list_schema()));
    let file = path.add_file("main.strata", src, body).unwrap();

    let hover = ide::hover_at_pos(&path, file, pos_at(src, second + 2)).unwrap();
    assert_eq!(hover.content, "`\"serve\"` _string_");

    // Every produced range nests within the enclosing expression's range.
    let tokens = ide::semantic_tokens(&path, file).unwrap();
    for token in tokens
        .iter()
        .filter(|t| t.token_type == ide::TokenType::String)
    {
        assert!(
            token.range.is_sub_range_of(&value_range),
            "token {token:?} escapes its expression"
        );
    }
    assert!(hover.range.is_sub_range_of(&value_range));
}

#[test]
fn test_multiline_string_hover_strips_quotes() {
    let schema = BodySchema::new().with_attribute(
        "motd",
        AttributeSchema::new(Constraint::literal_type(Type::String)),
    );
    let src = "motd = \"first\nsecond\"\n";
    let open = loc(src, "\"");
    let value = Expression::literal(
        Value::string("first\nsecond"),
        span(FILE, src, open, loc(src, "second\"") + 7),
    );
    let body = Body::new(span(FILE, src, 0, src.len())).with_attribute(Attribute::new(
        "motd",
        span(FILE, src, 0, 4),
        value,
    ));
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(schema));
    let file = path.add_file("main.strata", src, body).unwrap();

    let hover = ide::hover_at_pos(&path, file, pos_at(src, open + 3)).unwrap();
    assert_eq!(hover.content, "```\nfirst\nsecond\n```\n_string_");
}

#[test]
fn test_constraint_mismatch_is_an_error_not_a_fallback() {
    let schema = BodySchema::new().with_attribute(
        "replicas",
        AttributeSchema::new(Constraint::literal_type(Type::Number)),
    );
    let src = "replicas = \"three\"\n";
    let value_at = loc(src, "\"three\"");
    let body = Body::new(span(FILE, src, 0, src.len())).with_attribute(Attribute::new(
        "replicas",
        span(FILE, src, 0, 8),
        Expression::literal(Value::string("three"), span(FILE, src, value_at, value_at + 7)),
    ));
    let mut path = PathContext::new("root");
    path.set_schema(Arc::new(schema));
    let file = path.add_file("main.strata", src, body).unwrap();

    let err = ide::hover_at_pos(&path, file, pos_at(src, value_at + 2)).unwrap_err();
    assert_eq!(
        err,
        strata::Error::ConstraintMismatch {
            expected: "number".to_string()
        }
    );
}
