//! # problem-detail
//!
//! Turns application exceptions into RFC 7807 problem detail documents.
//!
//! The heart of the crate is the mapping between an exception type and a
//! problem type URI of the form `urn:problem-type:<slug>`:
//!
//! - [`codec`] converts type names to slugs and back (`ValidationFailedException`
//!   ⇄ `validation-failed`).
//! - [`ExceptionRegistry`] holds explicit URI → exception mappings and resolves
//!   incoming URIs, falling back to the naming convention.
//! - [`ProblemDetailBuilder`] resolves status, type, title, detail and extension
//!   members for a thrown exception.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use problem_detail::{ExceptionRegistry, ProblemDetailBuilder, TransportContext};
//!
//! let registry = Arc::new(ExceptionRegistry::default());
//! let builder = ProblemDetailBuilder::new(registry);
//! let problem = builder.build(&my_error, &TransportContext::default());
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod exception;
pub mod problem;
pub mod registry;
#[cfg(feature = "axum")]
pub mod response;
pub mod transport;
pub mod universe;

pub use builder::{has_default_message, ProblemDetailBuilder, ResolvedProblem};
pub use codec::{resolve_type, URN_PROBLEM_TYPE_PREFIX};
pub use config::NamingConvention;
pub use diagnostics::{DiagnosticRecord, DiagnosticSink, LogLevel, MemorySink, TracingSink};
pub use exception::{DeclaredMetadata, Exception, ExceptionIdentity, Extensions, HttpError};
pub use problem::{ProblemDetail, APPLICATION_PROBLEM_JSON};
pub use registry::{ExceptionRegistry, InvalidProblemType, ProblemTypeUri};
#[cfg(feature = "axum")]
pub use response::ProblemResponse;
pub use transport::TransportContext;
pub use universe::{KnownTypes, NoTypes, TypeUniverse};
