use std::collections::BTreeMap;

use axum::http::StatusCode;
use problem_detail::{DeclaredMetadata, Exception, Extensions, KnownTypes};
use serde_json::json;

/// Namespace the naming convention uses to find the types below.
pub const NAMESPACE: &str = concat!(module_path!(), "::");

/// Bean-validation style failure: field path → message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} violations failed", .violations.len())]
pub struct ValidationFailedException {
    pub violations: BTreeMap<String, String>,
}

impl ValidationFailedException {
    pub fn new<I, K, V>(violations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            violations: violations
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Exception for ValidationFailedException {
    fn metadata(&self) -> DeclaredMetadata {
        DeclaredMetadata::new().with_status(StatusCode::BAD_REQUEST)
    }

    fn extensions(&self) -> Extensions {
        let mut ext = Extensions::new();
        ext.insert("violations".to_string(), json!(self.violations));
        ext
    }
}

/// Nothing declared: everything comes from the type name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct CustomException(pub String);

impl Exception for CustomException {}

/// Fully declared type, title and status.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Your current balance is {balance}, but that costs {cost}.")]
pub struct OutOfCreditsException {
    pub balance: i64,
    pub cost: i64,
    pub accounts: Vec<String>,
}

impl Exception for OutOfCreditsException {
    fn metadata(&self) -> DeclaredMetadata {
        DeclaredMetadata::new()
            .with_status(StatusCode::FORBIDDEN)
            .with_type("https://example.com/probs/out-of-credit")
            .with_title("You do not have enough credit.")
    }

    fn extensions(&self) -> Extensions {
        let mut ext = Extensions::new();
        ext.insert("balance".to_string(), json!(self.balance));
        ext.insert("accounts".to_string(), json!(self.accounts));
        ext
    }
}

/// Declares every demo exception so incoming problem types can be mapped back.
pub fn declare_types(types: &KnownTypes) {
    types.register::<ValidationFailedException>();
    types.register::<CustomException>();
    types.register::<OutOfCreditsException>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use problem_detail::TypeUniverse;

    #[test]
    fn namespace_matches_type_names() {
        let types = KnownTypes::new();
        declare_types(&types);
        let name = format!("{NAMESPACE}CustomException");
        assert!(types.lookup(&name).is_some(), "{name}");
    }

    #[test]
    fn validation_message_counts_violations() {
        let e = ValidationFailedException::new([("a", "x"), ("b", "y")]);
        assert_eq!(e.to_string(), "2 violations failed");
    }
}
