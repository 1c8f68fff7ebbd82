use serde::{Deserialize, Serialize};

/// Naming convention that ties exception type names to problem type slugs.
///
/// `ValidationFailedException` becomes `validation-failed` because the
/// `type_suffix` is stripped; `OutOfMemoryError` keeps its tail and becomes
/// `out-of-memory-error`, which the `error_marker` later decodes without a suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConvention {
    /// Namespace prefixes tried in order when reconstructing a type name from a slug,
    /// e.g. `"my_app::errors::"`. The empty prefix matches bare names.
    pub namespaces: Vec<String>,
    /// Type-name suffix stripped by `encode` and re-appended by `decode`.
    pub type_suffix: String,
    /// Slug ending that suppresses the suffix on decode.
    pub error_marker: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            namespaces: vec![String::new()],
            type_suffix: "Exception".to_string(),
            error_marker: "-error".to_string(),
        }
    }
}

impl NamingConvention {
    pub fn with_namespace(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !self.namespaces.contains(&prefix) {
            self.namespaces.push(prefix);
        }
        self
    }

    pub fn with_namespaces<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.type_suffix = suffix.into();
        self
    }

    /// Suffix to append on decode for the given slug.
    pub fn suffix_for(&self, slug: &str) -> &str {
        if !self.error_marker.is_empty() && slug.ends_with(&self.error_marker) {
            ""
        } else {
            &self.type_suffix
        }
    }
}
