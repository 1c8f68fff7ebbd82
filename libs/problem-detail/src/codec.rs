//! Conversion between exception type names and problem type slugs.
//!
//! The convention is plain kebab-case: every uppercase letter after the first
//! starts a new segment, so `ValidationFailedException` encodes to
//! `validation-failed` (the type suffix is dropped) and `validation-failed`
//! decodes back to `<prefix>ValidationFailed<suffix>`.

use crate::config::NamingConvention;
use crate::exception::ExceptionIdentity;
use crate::registry::ProblemTypeUri;
use crate::universe::TypeUniverse;

/// Fixed scheme of convention-derived problem types.
pub const URN_PROBLEM_TYPE_PREFIX: &str = "urn:problem-type:";

/// Last path segment of a fully-qualified type name, without generic arguments.
///
/// Handles both `a::b::Name` and `a.b.Name`.
pub fn simple_name(fully_qualified: &str) -> &str {
    let base = fully_qualified
        .split_once('<')
        .map_or(fully_qualified, |(head, _)| head);
    let base = base.rsplit("::").next().unwrap_or(base);
    base.rsplit('.').next().unwrap_or(base)
}

pub fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn kebab_to_camel(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut upper = true;
    for c in slug.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Slug for a simple type name, with the convention's type suffix stripped.
pub fn encode(simple_name: &str, convention: &NamingConvention) -> String {
    let slug = camel_to_kebab(simple_name);
    if convention.type_suffix.is_empty() {
        return slug;
    }
    let tail = format!("-{}", camel_to_kebab(&convention.type_suffix));
    match slug.strip_suffix(&tail) {
        Some(body) if !body.is_empty() => body.to_string(),
        _ => slug,
    }
}

/// Candidate fully-qualified type name for a slug.
pub fn decode(slug: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{}{suffix}", kebab_to_camel(slug))
}

/// Canonical URI derived from an identity by the naming convention.
pub fn type_uri(identity: &ExceptionIdentity, convention: &NamingConvention) -> ProblemTypeUri {
    ProblemTypeUri::from_slug(&encode(identity.simple_name(), convention))
}

/// Strips the URN prefix, returning the slug.
pub fn slug_of(uri: &str) -> Option<&str> {
    uri.strip_prefix(URN_PROBLEM_TYPE_PREFIX)
        .filter(|slug| !slug.is_empty())
}

/// Reconstructs the exception behind a convention-derived problem type.
///
/// Returns `None` when `uri` is not a `urn:problem-type:` URI or when no
/// candidate name is known to `universe` as an exception type.
pub fn resolve_type(
    uri: &str,
    convention: &NamingConvention,
    universe: &dyn TypeUniverse,
) -> Option<ExceptionIdentity> {
    let slug = slug_of(uri)?;
    let suffix = convention.suffix_for(slug);
    candidates(slug, convention, suffix)
        .into_iter()
        .find_map(|candidate| {
            let found = universe.lookup(&candidate);
            tracing::trace!(%candidate, found = found.is_some(), "problem type candidate");
            found
        })
}

fn candidates(slug: &str, convention: &NamingConvention, suffix: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(convention.namespaces.len() * 2);
    for prefix in &convention.namespaces {
        out.push(decode(slug, prefix, suffix));
        if !suffix.is_empty() {
            out.push(decode(slug, prefix, ""));
        } else if !convention.type_suffix.is_empty() {
            // `FooErrorException` encodes to `foo-error` as well
            out.push(decode(slug, prefix, &convention.type_suffix));
        }
    }
    out
}

/// Title for an exception type: the simple name without suffix, split into words.
pub fn humanize(simple_name: &str, convention: &NamingConvention) -> String {
    let body = if convention.type_suffix.is_empty() {
        simple_name
    } else {
        match simple_name.strip_suffix(convention.type_suffix.as_str()) {
            Some(body) if !body.is_empty() => body,
            _ => simple_name,
        }
    };
    let mut out = String::with_capacity(body.len() + 4);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Slug for a free-text phrase such as a status reason (`Bad Request` → `bad-request`).
pub fn slugify_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::{KnownTypes, NoTypes};

    #[test]
    fn simple_name_variants() {
        assert_eq!(simple_name("com.example.ValidationFailedException"), "ValidationFailedException");
        assert_eq!(simple_name("app::errors::NotFoundException"), "NotFoundException");
        assert_eq!(simple_name("app::Wrapper<app::Inner>"), "Wrapper");
        assert_eq!(simple_name("Bare"), "Bare");
    }

    #[test]
    fn encode_strips_suffix() {
        let c = NamingConvention::default();
        assert_eq!(encode("ValidationFailedException", &c), "validation-failed");
        assert_eq!(encode("OutOfMemoryError", &c), "out-of-memory-error");
        assert_eq!(encode("Exception", &c), "exception");
    }

    #[test]
    fn decode_builds_candidate() {
        assert_eq!(
            decode("validation-failed", "com.example.", "Exception"),
            "com.example.ValidationFailedException"
        );
        assert_eq!(decode("validation-failed", "", ""), "ValidationFailed");
    }

    #[test]
    fn round_trip_through_convention() {
        let c = NamingConvention::default();
        for name in ["ValidationFailedException", "NullPointerException", "HTTPTimeoutException", "Io2Exception"] {
            let slug = encode(name, &c);
            assert_eq!(decode(&slug, "", "Exception"), name, "slug {slug}");
        }
    }

    #[test]
    fn non_urn_is_not_resolved() {
        let c = NamingConvention::default();
        let types = KnownTypes::new();
        types.register_named("NotAUrnException");
        assert_eq!(resolve_type("not-a-urn", &c, &types), None);
        assert_eq!(resolve_type("https://example.com/validation-failed", &c, &types), None);
        assert_eq!(resolve_type("urn:problem-type:", &c, &types), None);
    }

    #[test]
    fn unknown_candidate_is_not_resolved() {
        let c = NamingConvention::default().with_namespaces(["java.lang."]);
        assert_eq!(resolve_type("urn:problem-type:validation-failed", &c, &NoTypes), None);
    }

    #[test]
    fn suffixed_candidate_wins_over_bare() {
        let c = NamingConvention::default().with_namespaces(["java.lang."]);
        let types = KnownTypes::new();
        types.register_named("java.lang.ValidationFailed");
        types.register_named("java.lang.ValidationFailedException");
        let found = resolve_type("urn:problem-type:validation-failed", &c, &types).unwrap();
        assert_eq!(found.name(), "java.lang.ValidationFailedException");
    }

    #[test]
    fn bare_candidate_is_tried_second() {
        let c = NamingConvention::default().with_namespaces(["java.lang."]);
        let types = KnownTypes::new();
        types.register_named("java.lang.ValidationFailed");
        let found = resolve_type("urn:problem-type:validation-failed", &c, &types).unwrap();
        assert_eq!(found.name(), "java.lang.ValidationFailed");
    }

    #[test]
    fn error_marker_uses_no_suffix() {
        let c = NamingConvention::default().with_namespaces(["java.lang."]);
        let types = KnownTypes::new();
        types.register_named("java.lang.OutOfMemoryError");
        let found = resolve_type("urn:problem-type:out-of-memory-error", &c, &types).unwrap();
        assert_eq!(found.name(), "java.lang.OutOfMemoryError");
    }

    #[test]
    fn namespaces_are_tried_in_order() {
        let c = NamingConvention::default().with_namespaces(["a::", "b::"]);
        let types = KnownTypes::new();
        types.register_named("b::NotFoundException");
        let found = resolve_type("urn:problem-type:not-found", &c, &types).unwrap();
        assert_eq!(found.name(), "b::NotFoundException");
    }

    #[test]
    fn non_exception_type_is_not_resolved() {
        let c = NamingConvention::default();
        let types = KnownTypes::new();
        types.register_other("StringException");
        assert_eq!(resolve_type("urn:problem-type:string", &c, &types), None);
    }

    #[test]
    fn suffixed_type_ending_in_error_round_trips() {
        let c = NamingConvention::default().with_namespace("app::");
        let types = KnownTypes::new();
        types.register_named("app::FooErrorException");
        let id = ExceptionIdentity::named("app::FooErrorException");
        assert_eq!(encode(id.simple_name(), &c), "foo-error");
        assert_eq!(resolve_type("urn:problem-type:foo-error", &c, &types), Some(id));
    }

    #[test]
    fn humanize_and_slugify() {
        let c = NamingConvention::default();
        assert_eq!(humanize("ValidationFailedException", &c), "Validation Failed");
        assert_eq!(humanize("OutOfMemoryError", &c), "Out Of Memory Error");
        assert_eq!(slugify_phrase("Bad Request"), "bad-request");
        assert_eq!(slugify_phrase("  I'm a  teapot "), "i'm-a-teapot");
    }
}
