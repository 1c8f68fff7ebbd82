use http::{header::ACCEPT, HeaderMap, StatusCode};

use crate::problem::APPLICATION_PROBLEM_JSON;

const DEFAULT_SUBTYPE: &str = "json";

/// What the surrounding HTTP exchange knows about the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportContext {
    /// Status already decided by the transport; takes precedence over `Exception::transport_status`.
    pub fallback_status: Option<StatusCode>,
    /// Subtype of the client's preferred `application/*` media type.
    pub preferred_subtype: Option<String>,
}

impl TransportContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the preferred subtype from the `Accept` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            fallback_status: None,
            preferred_subtype: preferred_subtype(headers),
        }
    }

    pub fn with_fallback_status(mut self, status: StatusCode) -> Self {
        self.fallback_status = Some(status);
        self
    }

    pub fn with_preferred_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.preferred_subtype = Some(subtype.into());
        self
    }

    pub fn subtype(&self) -> &str {
        self.preferred_subtype.as_deref().unwrap_or(DEFAULT_SUBTYPE)
    }

    /// `application/problem+<subtype>`, as the client asked for it.
    pub fn preferred_media_type(&self) -> String {
        format!("application/problem+{}", self.subtype())
    }

    /// Media type the JSON body is sent as: the preferred one when it is a
    /// JSON flavour, otherwise `application/problem+json`.
    pub fn response_media_type(&self) -> String {
        let sub = self.subtype();
        if sub == DEFAULT_SUBTYPE || sub.ends_with("+json") {
            self.preferred_media_type()
        } else {
            APPLICATION_PROBLEM_JSON.to_string()
        }
    }
}

/// First `application/*` entry of the `Accept` header(s), in order of appearance.
fn preferred_subtype(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|range| {
            let essence = range.split(';').next()?.trim();
            let (ty, sub) = essence.split_once('/')?;
            if !ty.trim().eq_ignore_ascii_case("application") {
                return None;
            }
            let sub = sub.trim().to_ascii_lowercase();
            let sub = sub.strip_prefix("problem+").map(str::to_string).unwrap_or(sub);
            (!sub.is_empty() && sub != "*").then_some(sub)
        })
        .next()
}
