//! Exceptions as values: the thing that failed, its identity and its declared metadata.

use std::{fmt, sync::Arc};

use http::StatusCode;

use crate::codec;
use crate::diagnostics::LogLevel;

/// Extension members contributed by a concrete exception.
pub type Extensions = serde_json::Map<String, serde_json::Value>;

/// Fully-qualified name of an exception's runtime type.
///
/// Uses `std::any::type_name`, so identities look like
/// `my_app::errors::ValidationFailedException`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExceptionIdentity(Arc<str>);

impl ExceptionIdentity {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Arc::from(std::any::type_name::<T>()))
    }

    pub fn named(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Last path segment without generic arguments.
    pub fn simple_name(&self) -> &str {
        codec::simple_name(&self.0)
    }
}

impl fmt::Debug for ExceptionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ExceptionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative per-type overrides, the equivalent of annotations on an exception class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredMetadata {
    pub status: Option<StatusCode>,
    pub type_uri: Option<String>,
    pub title: Option<String>,
    pub log_level: Option<LogLevel>,
}

impl DeclaredMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_type(mut self, type_uri: impl Into<String>) -> Self {
        self.type_uri = Some(type_uri.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }
}

/// An error value that can be mapped to a problem detail document.
///
/// Only `Display` is required; everything else has a neutral default:
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error)]
/// #[error("{0} violations failed")]
/// struct ValidationFailedException(usize);
///
/// impl Exception for ValidationFailedException {
///     fn metadata(&self) -> DeclaredMetadata {
///         DeclaredMetadata::new().with_status(StatusCode::BAD_REQUEST)
///     }
/// }
/// ```
pub trait Exception: std::error::Error + Send + Sync + 'static {
    fn identity(&self) -> ExceptionIdentity {
        ExceptionIdentity::of::<Self>()
    }

    /// Message text; `None` or an empty string means "no message".
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn metadata(&self) -> DeclaredMetadata {
        DeclaredMetadata::default()
    }

    /// Status the error already carries at the transport level, used when the
    /// context does not supply one.
    fn transport_status(&self) -> Option<StatusCode> {
        None
    }

    /// Additional members copied verbatim into the document.
    fn extensions(&self) -> Extensions {
        Extensions::new()
    }
}

/// Exception carrying an HTTP status, with `HTTP <code> <reason>` as its default message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        }
    }

    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl Exception for HttpError {
    fn transport_status(&self) -> Option<StatusCode> {
        Some(self.status)
    }
}
