//! Type declaration expressions, e.g. `string` or `list(object({…}))`.

use indexmap::IndexMap;

use crate::base::Pos;
use crate::refs::{ReferenceOrigin, ReferenceTarget};
use crate::schema::TypeDeclaration;
use crate::syntax::{Expression, ExprKind, FuncCall};
use crate::types::{ObjectType, Type};

use super::{
    hover_type_only, Candidate, CandidateKind, ExprContext, ExpressionView, HoverData,
    SemanticToken, TargetContext, TextEdit, TokenType,
};

pub(super) struct TypeDeclExpr<'a> {
    pub expr: &'a Expression,
    pub cons: &'a TypeDeclaration,
    #[allow(dead_code)]
    pub ctx: ExprContext<'a>,
}

/// Names completable at a type position: primitives first, then
/// constructors with their snippet bodies.
const PRIMITIVE_TYPES: &[&str] = &["any", "bool", "number", "string"];
const TYPE_CONSTRUCTORS: &[(&str, &str)] = &[
    ("list", "list(${1})"),
    ("map", "map(${1})"),
    ("object", "object({\n  ${1:name} = ${2}\n})"),
    ("set", "set(${1})"),
    ("tuple", "tuple([${1}])"),
];

/// Parse a type expression into a value type, or `None` for shapes that do
/// not denote a type.
pub(super) fn parse_type(expr: &Expression) -> Option<Type> {
    match &expr.kind {
        ExprKind::Symbol(name) => match name.as_str() {
            "any" => Some(Type::Dynamic),
            "bool" => Some(Type::Bool),
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            _ => None,
        },
        ExprKind::FuncCall(call) => parse_constructor(call),
        ExprKind::Paren(inner) => parse_type(inner),
        _ => None,
    }
}

fn parse_constructor(call: &FuncCall) -> Option<Type> {
    match call.name.as_str() {
        "list" => Some(Type::list(element_of(call))),
        "set" => Some(Type::set(element_of(call))),
        "map" => Some(Type::map(element_of(call))),
        "tuple" => {
            let arg = call.args.first()?;
            let ExprKind::Tuple(items) = &arg.kind else {
                return None;
            };
            Some(Type::Tuple(
                items
                    .iter()
                    .map(|item| parse_type(item).unwrap_or(Type::Dynamic))
                    .collect(),
            ))
        }
        "object" => {
            let arg = call.args.first()?;
            let ExprKind::Object(items) = &arg.kind else {
                return None;
            };
            let mut attributes = IndexMap::new();
            let mut object = ObjectType::default();
            for item in items {
                let Some(name) = item.key.static_string() else {
                    continue;
                };
                // optional(T) marks the attribute optional and unwraps.
                let (ty_expr, optional) = match &item.value.kind {
                    ExprKind::FuncCall(inner) if inner.name == "optional" => {
                        (inner.args.first(), true)
                    }
                    _ => (Some(&item.value), false),
                };
                let ty = ty_expr.and_then(parse_type).unwrap_or(Type::Dynamic);
                attributes.insert(name.clone(), ty);
                if optional {
                    object.optional.insert(name);
                }
            }
            object.attributes = attributes;
            Some(Type::Object(object))
        }
        "optional" => call.args.first().and_then(parse_type),
        _ => None,
    }
}

fn element_of(call: &FuncCall) -> Type {
    call.args
        .first()
        .and_then(parse_type)
        .unwrap_or(Type::Dynamic)
}

fn collect_tokens(expr: &Expression, tokens: &mut Vec<SemanticToken>) {
    match &expr.kind {
        ExprKind::Symbol(_) => {
            if parse_type(expr).is_some() {
                tokens.push(SemanticToken::new(TokenType::TypeName, expr.range));
            }
        }
        ExprKind::FuncCall(call) => {
            if parse_constructor(call).is_none() {
                return;
            }
            tokens.push(SemanticToken::new(TokenType::TypeName, call.name_range));
            for arg in &call.args {
                match &arg.kind {
                    ExprKind::Tuple(items) => {
                        for item in items {
                            collect_tokens(item, tokens);
                        }
                    }
                    ExprKind::Object(items) => {
                        for item in items {
                            collect_tokens(&item.value, tokens);
                        }
                    }
                    _ => collect_tokens(arg, tokens),
                }
            }
        }
        ExprKind::Paren(inner) => collect_tokens(inner, tokens),
        _ => {}
    }
}

impl ExpressionView for TypeDeclExpr<'_> {
    fn completion_at_pos(&self, pos: Pos) -> Vec<Candidate> {
        let reachable = self.expr.is_unset()
            || matches!(self.expr.kind, ExprKind::Symbol(_))
                && self.expr.range.contains_or_ends_at(pos);
        if !reachable {
            return Vec::new();
        }
        let range = self.expr.range;
        let mut out: Vec<Candidate> = PRIMITIVE_TYPES
            .iter()
            .map(|name| {
                Candidate::new(*name, CandidateKind::Type, TextEdit::new(range, *name))
                    .with_detail("type")
            })
            .collect();
        out.extend(TYPE_CONSTRUCTORS.iter().map(|(name, snippet)| {
            Candidate::new(
                *name,
                CandidateKind::Type,
                TextEdit::new(range, format!("{name}()")).with_snippet(*snippet),
            )
            .with_detail("type")
        }));
        out
    }

    fn hover_at_pos(&self, pos: Pos) -> Option<HoverData> {
        if !self.expr.range.contains_or_ends_at(pos) {
            return None;
        }
        let ty = parse_type(self.expr)?;
        let mut content = hover_type_only(&ty.friendly_name());
        if let Some(ref description) = self.cons.description {
            content.push_str("\n\n");
            content.push_str(description);
        }
        Some(HoverData {
            content,
            range: self.expr.range,
        })
    }

    fn semantic_tokens(&self) -> Vec<SemanticToken> {
        let mut tokens = Vec::new();
        collect_tokens(self.expr, &mut tokens);
        tokens
    }

    fn reference_origins(&self, _allow_self_refs: bool) -> Vec<ReferenceOrigin> {
        Vec::new()
    }

    fn reference_targets(&self, target_ctx: Option<&TargetContext>) -> Vec<ReferenceTarget> {
        target_ctx.map(|t| vec![t.base_target(None)]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::expr::wrap;
    use crate::schema::Constraint;
    use crate::syntax::FileFormat;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn ctx(src: &str) -> ExprContext<'_> {
        ExprContext::new(FileFormat::Native, src)
    }

    fn type_decl() -> Constraint {
        Constraint::TypeDeclaration(TypeDeclaration::default())
    }

    #[test]
    fn test_primitive_type_hover() {
        let cons = type_decl();
        let expr = Expression::symbol("string", r(7, 13));
        let view = wrap(&expr, &cons, ctx("type = string"));

        let hover = view.hover_at_pos(Pos::new(0, 9, 9)).unwrap();
        assert_eq!(hover.content, "_string_");
    }

    #[test]
    fn test_constructor_type_hover() {
        // type = list(string)
        let cons = type_decl();
        let call = FuncCall {
            name: "list".into(),
            name_range: r(7, 11),
            args: vec![Expression::symbol("string", r(12, 18))],
            args_range: r(11, 19),
        };
        let expr = Expression::new(ExprKind::FuncCall(call), r(7, 19));
        let view = wrap(&expr, &cons, ctx("type = list(string)"));

        let hover = view.hover_at_pos(Pos::new(0, 8, 8)).unwrap();
        assert_eq!(hover.content, "_list of string_");

        let tokens = view.semantic_tokens();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.token_type == TokenType::TypeName));
    }

    #[test]
    fn test_object_type_with_optional() {
        let inner_call = FuncCall {
            name: "optional".into(),
            name_range: r(20, 28),
            args: vec![Expression::symbol("number", r(29, 35))],
            args_range: r(28, 36),
        };
        let items = vec![
            crate::syntax::ObjectItem {
                key: Expression::symbol("name", r(10, 14)),
                value: Expression::symbol("string", r(17, 23)),
                range: r(10, 23),
            },
            crate::syntax::ObjectItem {
                key: Expression::symbol("port", r(25, 29)),
                value: Expression::new(ExprKind::FuncCall(inner_call), r(20, 36)),
                range: r(25, 36),
            },
        ];
        let arg = Expression::new(ExprKind::Object(items), r(8, 38));
        let call = FuncCall {
            name: "object".into(),
            name_range: r(0, 6),
            args: vec![arg],
            args_range: r(6, 39),
        };
        let expr = Expression::new(ExprKind::FuncCall(call), r(0, 39));

        let ty = parse_type(&expr).unwrap();
        match ty {
            Type::Object(object) => {
                assert_eq!(object.attributes["name"], Type::String);
                assert_eq!(object.attributes["port"], Type::Number);
                assert!(object.is_optional("port"));
                assert!(!object.is_optional("name"));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_completion_offers_types() {
        let cons = type_decl();
        let expr = Expression::unset(r(7, 7));
        let view = wrap(&expr, &cons, ctx("type = "));

        let labels: Vec<_> = view
            .completion_at_pos(Pos::new(0, 7, 7))
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert!(labels.contains(&"string".into()));
        assert!(labels.contains(&"object".into()));
    }

    #[test]
    fn test_unknown_symbol_is_not_a_type() {
        let cons = type_decl();
        let expr = Expression::symbol("integer", r(0, 7));
        let view = wrap(&expr, &cons, ctx("integer"));
        assert!(view.hover_at_pos(Pos::new(0, 2, 2)).is_none());
        assert!(view.semantic_tokens().is_empty());
    }
}
