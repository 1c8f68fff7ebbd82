//! Process-wide table of problem type URIs and the exceptions they stand for.
//!
//! Design goals:
//! - Populated at start-up (explicit `register` calls), read on every request.
//! - Explicit entries override the naming convention; the reverse direction
//!   (identity → URI) is computed by scanning, not stored.
//! - Sync hot path: lookups take a read lock only.
//!
//! Collisions:
//! - `register_as` is last-write-wins.
//! - `register` (convention-derived) keeps the first owner of a slug and logs a warning once per rejected type.

use std::{borrow::Borrow, collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::codec::{self, URN_PROBLEM_TYPE_PREFIX};
use crate::config::NamingConvention;
use crate::exception::ExceptionIdentity;
use crate::universe::TypeUniverse;

#[derive(Debug, thiserror::Error)]
#[error("invalid problem type URI '{uri}': {reason}")]
pub struct InvalidProblemType {
    pub uri: String,
    pub reason: String,
}

/// Absolute URI identifying a problem type; usually `urn:problem-type:<slug>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProblemTypeUri(Arc<str>);

impl ProblemTypeUri {
    pub fn parse(uri: &str) -> Result<Self, InvalidProblemType> {
        let invalid = |reason: String| InvalidProblemType {
            uri: uri.to_string(),
            reason,
        };
        if uri.starts_with(URN_PROBLEM_TYPE_PREFIX) && codec::slug_of(uri).is_none() {
            return Err(invalid("empty slug".to_string()));
        }
        url::Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
        Ok(Self(Arc::from(uri)))
    }

    pub fn from_slug(slug: &str) -> Self {
        Self(Arc::from(format!("{URN_PROBLEM_TYPE_PREFIX}{slug}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slug of a `urn:problem-type:` URI; `None` for other absolute URIs.
    pub fn slug(&self) -> Option<&str> {
        codec::slug_of(&self.0)
    }
}

impl fmt::Debug for ProblemTypeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProblemTypeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProblemTypeUri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProblemTypeUri {
    type Error = InvalidProblemType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProblemTypeUri> for String {
    fn from(value: ProblemTypeUri) -> Self {
        value.0.to_string()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    identity: ExceptionIdentity,
    explicit: bool,
}

/// Problem type URI → exception identity table.
pub struct ExceptionRegistry {
    map: RwLock<HashMap<ProblemTypeUri, Entry>>,
    rejected: RwLock<HashMap<ExceptionIdentity, ProblemTypeUri>>,
    convention: NamingConvention,
}

impl ExceptionRegistry {
    pub fn new(convention: NamingConvention) -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            rejected: RwLock::new(HashMap::new()),
            convention,
        }
    }

    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    /// Register `identity` under its convention-derived URI and return that URI.
    pub fn register(&self, identity: &ExceptionIdentity) -> ProblemTypeUri {
        let uri = codec::type_uri(identity, &self.convention);
        let mut w = self.map.write();
        match w.get(&uri) {
            Some(existing) if existing.identity == *identity => {}
            Some(existing) => {
                let first_time = self
                    .rejected
                    .write()
                    .insert(identity.clone(), uri.clone())
                    .is_none();
                if first_time {
                    tracing::warn!(
                        problem_type = %uri,
                        registered = %existing.identity,
                        rejected = %identity,
                        "problem type slug already taken; keeping first registration"
                    );
                }
            }
            None => {
                tracing::debug!(problem_type = %uri, exception = %identity, "registered problem type");
                w.insert(
                    uri.clone(),
                    Entry {
                        identity: identity.clone(),
                        explicit: false,
                    },
                );
            }
        }
        uri
    }

    /// Register `identity` under an explicit URI, replacing any previous owner.
    pub fn register_as(&self, identity: &ExceptionIdentity, uri: ProblemTypeUri) {
        let previous = self.map.write().insert(
            uri.clone(),
            Entry {
                identity: identity.clone(),
                explicit: true,
            },
        );
        match previous {
            Some(prev) if prev.identity != *identity => {
                tracing::debug!(
                    problem_type = %uri,
                    replaced = %prev.identity,
                    exception = %identity,
                    "problem type re-registered"
                );
            }
            _ => tracing::debug!(problem_type = %uri, exception = %identity, "registered problem type"),
        }
    }

    /// Exact-string lookup; no convention fallback.
    pub fn resolve(&self, uri: &str) -> Option<ExceptionIdentity> {
        self.map.read().get(uri).map(|e| e.identity.clone())
    }

    /// Registry lookup, then the naming convention against `universe`.
    pub fn resolve_or_derive(
        &self,
        uri: &str,
        universe: &dyn TypeUniverse,
    ) -> Option<ExceptionIdentity> {
        self.resolve(uri)
            .or_else(|| codec::resolve_type(uri, &self.convention, universe))
    }

    /// URI registered for `identity`: explicit entries first, then the smallest URI.
    pub fn type_uri_of(&self, identity: &ExceptionIdentity) -> Option<ProblemTypeUri> {
        self.map
            .read()
            .iter()
            .filter(|(_, e)| e.identity == *identity)
            .min_by(|(ua, ea), (ub, eb)| eb.explicit.cmp(&ea.explicit).then_with(|| ua.cmp(ub)))
            .map(|(uri, _)| uri.clone())
    }

    /// Identities whose convention URI was already owned by another type, sorted.
    pub fn collisions(&self) -> Vec<(ExceptionIdentity, ProblemTypeUri)> {
        let mut out: Vec<_> = self
            .rejected
            .read()
            .iter()
            .map(|(id, uri)| (id.clone(), uri.clone()))
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Snapshot of all entries, sorted by URI.
    pub fn entries(&self) -> Vec<(ProblemTypeUri, ExceptionIdentity)> {
        let mut out: Vec<_> = self
            .map
            .read()
            .iter()
            .map(|(k, e)| (k.clone(), e.identity.clone()))
            .collect();
        out.sort();
        out
    }
}

impl Default for ExceptionRegistry {
    fn default() -> Self {
        Self::new(NamingConvention::default())
    }
}

impl fmt::Debug for ExceptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionRegistry")
            .field("entries", &self.len())
            .field("convention", &self.convention)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::KnownTypes;

    fn id(name: &str) -> ExceptionIdentity {
        ExceptionIdentity::named(name)
    }

    #[test]
    fn register_then_resolve_round_trips() {
        let reg = ExceptionRegistry::default();
        let a = id("app::errors::ValidationFailedException");
        let uri = reg.register(&a);
        assert_eq!(uri.as_str(), "urn:problem-type:validation-failed");
        assert_eq!(reg.resolve(uri.as_str()), Some(a));
    }

    #[test]
    fn register_is_idempotent() {
        let reg = ExceptionRegistry::default();
        let a = id("app::NotFoundException");
        let first = reg.register(&a);
        let second = reg.register(&a);
        assert_eq!(first, second);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn explicit_registration_is_last_write_wins() {
        let reg = ExceptionRegistry::default();
        let uri = ProblemTypeUri::parse("urn:problem-type:shared").unwrap();
        reg.register_as(&id("a::FirstException"), uri.clone());
        reg.register_as(&id("b::SecondException"), uri.clone());
        assert_eq!(reg.resolve("urn:problem-type:shared"), Some(id("b::SecondException")));
    }

    #[test]
    fn convention_collision_keeps_first() {
        let reg = ExceptionRegistry::default();
        let a = id("a::NotFoundException");
        let b = id("b::NotFoundException");
        let uri_a = reg.register(&a);
        let uri_b = reg.register(&b);
        assert_eq!(uri_a, uri_b);
        assert_eq!(reg.resolve(uri_a.as_str()), Some(a));
        assert_eq!(reg.type_uri_of(&b), None);

        reg.register(&b);
        assert_eq!(reg.collisions(), vec![(b, uri_a)]);
    }

    #[test]
    fn unknown_uri_resolves_to_none() {
        let reg = ExceptionRegistry::default();
        assert_eq!(reg.resolve("urn:problem-type:nothing"), None);
        assert_eq!(reg.resolve("not-a-urn"), None);
    }

    #[test]
    fn reverse_lookup_prefers_explicit() {
        let reg = ExceptionRegistry::default();
        let a = id("app::LegacyThingException");
        reg.register(&a);
        let explicit = ProblemTypeUri::parse("https://errors.example.com/legacy").unwrap();
        reg.register_as(&a, explicit.clone());
        assert_eq!(reg.type_uri_of(&a), Some(explicit));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn resolve_or_derive_falls_back_to_convention() {
        let reg = ExceptionRegistry::new(NamingConvention::default().with_namespaces(["app::"]));
        let types = KnownTypes::new();
        types.register_named("app::ConflictException");
        assert_eq!(
            reg.resolve_or_derive("urn:problem-type:conflict", &types),
            Some(id("app::ConflictException"))
        );
        assert_eq!(reg.resolve_or_derive("urn:problem-type:missing", &types), None);
    }

    #[test]
    fn problem_type_uri_validation() {
        assert!(ProblemTypeUri::parse("urn:problem-type:ok").is_ok());
        assert!(ProblemTypeUri::parse("https://errors.example.com/x").is_ok());
        assert!(ProblemTypeUri::parse("relative/path").is_err());
        assert!(ProblemTypeUri::parse("urn:problem-type:").is_err());
        assert_eq!(ProblemTypeUri::from_slug("abc").slug(), Some("abc"));
        assert_eq!(ProblemTypeUri::parse("https://x.org/abc").unwrap().slug(), None);
    }

    #[test]
    fn entries_are_sorted() {
        let reg = ExceptionRegistry::default();
        reg.register(&id("ZuluException"));
        reg.register(&id("AlphaException"));
        let uris: Vec<_> = reg.entries().into_iter().map(|(u, _)| u.to_string()).collect();
        assert_eq!(uris, vec!["urn:problem-type:alpha", "urn:problem-type:zulu"]);
    }
}
