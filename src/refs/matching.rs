//! Origin/target matching.
//!
//! Matching is pure: origins and targets are compared by address, type, and
//! scope. Cross-unit concerns (path equality for path-qualified origins) are
//! handled by the caller, which knows which unit a target set belongs to.

use tracing::trace;

use super::{OriginConstraint, ReferenceOrigin, ReferenceTarget, ReferenceTargets};
use super::ReferenceOrigins;

/// Find every target an origin resolves to.
///
/// Nested targets are searched transitively, so a match may land on a
/// top-level target or any of its nested parts. For path-qualified origins
/// the caller must have established path equality; `targets` is assumed to
/// be the right unit's set.
pub fn match_targets<'t>(
    origin: &ReferenceOrigin,
    targets: &'t ReferenceTargets,
) -> Vec<&'t ReferenceTarget> {
    targets
        .deep_iter()
        .into_iter()
        .filter(|t| origin_matches_target(origin, t))
        .collect()
}

/// Find every origin addressing a target (or any of its nested parts).
///
/// This is the inverse of [`match_targets`]: `targeting(target)` equals the
/// union over all origins of `match_targets(origin, [target])`.
pub fn targeting<'o>(
    target: &ReferenceTarget,
    origins: &'o ReferenceOrigins,
) -> Vec<&'o ReferenceOrigin> {
    origins
        .iter()
        .filter(|o| {
            let mut hit = false;
            target.walk(&mut |t| hit = hit || origin_matches_target(o, t));
            hit
        })
        .collect()
}

fn origin_matches_target(origin: &ReferenceOrigin, target: &ReferenceTarget) -> bool {
    if origin.address() != &target.addr {
        return false;
    }
    if let Some(visible_in) = target.visible_in {
        // Visibility-restricted targets are only addressable from within
        // their declared range (and never from another unit).
        match origin {
            ReferenceOrigin::Local(o) => {
                if !o.range.is_sub_range_of(&visible_in) {
                    return false;
                }
            }
            ReferenceOrigin::Path(_) => return false,
        }
    }
    let constraints = origin.constraints();
    let matched = constraints.is_empty()
        || constraints.iter().any(|c| constraint_matches(c, target));
    if matched {
        trace!(addr = %target.addr, "origin matched target");
    }
    matched
}

/// A single origin constraint against a single target.
///
/// Scope: an origin that declares a scope requires the target's scope to
/// equal it; an origin without one matches any target scope. Type: declared
/// origin types require the target's type to be equal, or either side to be
/// fully dynamic; a typed origin never matches an untyped target.
fn constraint_matches(constraint: &OriginConstraint, target: &ReferenceTarget) -> bool {
    if let Some(ref scope) = constraint.of_scope {
        if target.scope_id.as_ref() != Some(scope) {
            return false;
        }
    }
    match (&constraint.of_type, &target.ty) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(want), Some(have)) => want.matches(have),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Range};
    use crate::refs::{Address, ScopeId};
    use crate::types::Type;

    fn r(start: usize, end: usize) -> Range {
        Range::from_coords(FileId::new(0), (0, start, start), (0, end, end))
    }

    fn origin(addr: Address, constraints: Vec<OriginConstraint>) -> ReferenceOrigin {
        ReferenceOrigin::local(addr, r(0, 10), constraints)
    }

    #[test]
    fn test_address_must_match() {
        let target = ReferenceTarget::new(Address::root("var").attr("a"));
        let targets = ReferenceTargets(vec![target]);

        let hit = origin(Address::root("var").attr("a"), vec![]);
        let miss = origin(Address::root("var").attr("b"), vec![]);

        assert_eq!(match_targets(&hit, &targets).len(), 1);
        assert!(match_targets(&miss, &targets).is_empty());
    }

    #[test]
    fn test_index_normalization() {
        let target = ReferenceTarget::new(Address::root("var").index_num(1.0));
        let targets = ReferenceTargets(vec![target]);

        let o = origin(Address::root("var").index_num(1.0), vec![]);
        assert_eq!(match_targets(&o, &targets).len(), 1);
    }

    #[test]
    fn test_type_constraint() {
        let target = ReferenceTarget::new(Address::root("x")).with_type(Type::String);
        let targets = ReferenceTargets(vec![target]);

        let typed_hit = origin(Address::root("x"), vec![OriginConstraint::of_type(Type::String)]);
        let typed_miss = origin(Address::root("x"), vec![OriginConstraint::of_type(Type::Number)]);
        let dynamic = origin(Address::root("x"), vec![OriginConstraint::of_type(Type::Dynamic)]);

        assert_eq!(match_targets(&typed_hit, &targets).len(), 1);
        assert!(match_targets(&typed_miss, &targets).is_empty());
        assert_eq!(match_targets(&dynamic, &targets).len(), 1);
    }

    #[test]
    fn test_typed_origin_needs_typed_target() {
        let untyped = ReferenceTarget::new(Address::root("x"));
        let targets = ReferenceTargets(vec![untyped]);

        let typed = origin(Address::root("x"), vec![OriginConstraint::of_type(Type::String)]);
        let unconstrained = origin(Address::root("x"), vec![OriginConstraint::default()]);

        assert!(match_targets(&typed, &targets).is_empty());
        assert_eq!(match_targets(&unconstrained, &targets).len(), 1);
    }

    #[test]
    fn test_scope_constraint() {
        let target = ReferenceTarget::new(Address::root("x")).with_scope(ScopeId::new("var"));
        let targets = ReferenceTargets(vec![target]);

        let scoped_hit = origin(
            Address::root("x"),
            vec![OriginConstraint::of_scope(ScopeId::new("var"))],
        );
        let scoped_miss = origin(
            Address::root("x"),
            vec![OriginConstraint::of_scope(ScopeId::new("out"))],
        );
        let unscoped = origin(Address::root("x"), vec![OriginConstraint::default()]);

        assert_eq!(match_targets(&scoped_hit, &targets).len(), 1);
        assert!(match_targets(&scoped_miss, &targets).is_empty());
        assert_eq!(match_targets(&unscoped, &targets).len(), 1);
    }

    #[test]
    fn test_nested_targets_searched_transitively() {
        let nested = ReferenceTarget::new(Address::root("obj").attr("inner"))
            .with_nested(vec![ReferenceTarget::new(
                Address::root("obj").attr("inner").attr("leaf"),
            )]);
        let top = ReferenceTarget::new(Address::root("obj")).with_nested(vec![nested]);
        let targets = ReferenceTargets(vec![top]);

        let o = origin(Address::root("obj").attr("inner").attr("leaf"), vec![]);
        assert_eq!(match_targets(&o, &targets).len(), 1);
    }

    #[test]
    fn test_visible_in_restricts_origins() {
        let target = ReferenceTarget::new(Address::root("self").attr("port"))
            .with_visible_in(r(0, 50));
        let targets = ReferenceTargets(vec![target]);

        let inside = ReferenceOrigin::local(Address::root("self").attr("port"), r(10, 20), vec![]);
        let outside = ReferenceOrigin::local(
            Address::root("self").attr("port"),
            Range::from_coords(FileId::new(0), (3, 0, 60), (3, 4, 64)),
            vec![],
        );

        assert_eq!(match_targets(&inside, &targets).len(), 1);
        assert!(match_targets(&outside, &targets).is_empty());
    }

    #[test]
    fn test_targeting_is_inverse_of_match() {
        let target = ReferenceTarget::new(Address::root("var").attr("a"))
            .with_type(Type::String)
            .with_nested(vec![
                ReferenceTarget::new(Address::root("var").attr("a").attr("b")).with_type(Type::Number),
            ]);

        let origins = ReferenceOrigins(vec![
            origin(Address::root("var").attr("a"), vec![OriginConstraint::of_type(Type::String)]),
            origin(Address::root("var").attr("a").attr("b"), vec![]),
            origin(Address::root("other"), vec![]),
        ]);

        let direct = targeting(&target, &origins);
        assert_eq!(direct.len(), 2);

        // Same result as matching each origin against the single target.
        let singleton = ReferenceTargets(vec![target.clone()]);
        let via_match: Vec<_> = origins
            .iter()
            .filter(|o| !match_targets(o, &singleton).is_empty())
            .collect();
        assert_eq!(direct, via_match);
    }
}
