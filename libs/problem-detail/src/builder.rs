//! Resolution of a thrown exception into a [`ProblemDetail`].
//!
//! First applicable source wins:
//!
//! | member | declared metadata | transport context        | otherwise                          |
//! |--------|-------------------|--------------------------|------------------------------------|
//! | status | `status`          | `fallback_status`        | 500                                |
//! | type   | `type_uri`        | slug of the reason phrase | registry entry, else derived + registered |
//! | title  | `title`           | reason phrase            | humanized type name                |
//!
//! The transport status is the context's `fallback_status`, else the one the
//! exception carries itself ([`Exception::transport_status`]).
//!
//! The detail is the exception message unless it only echoes `HTTP <code> <reason>`.

use std::sync::Arc;

use http::StatusCode;
use uuid::Uuid;

use crate::codec;
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink, LogLevel, TracingSink};
use crate::exception::{DeclaredMetadata, Exception, ExceptionIdentity};
use crate::problem::{ProblemDetail, STANDARD_MEMBERS};
use crate::registry::{ExceptionRegistry, ProblemTypeUri};
use crate::transport::TransportContext;
use crate::universe::{NoTypes, TypeUniverse};

/// True when `message` is the auto-generated `HTTP <code> <reason>` text for `status`.
pub fn has_default_message(message: &str, status: StatusCode) -> bool {
    match status.canonical_reason() {
        Some(reason) => message == format!("HTTP {} {}", status.as_u16(), reason),
        None => false,
    }
}

/// Stateless mapper from exceptions to problem details; cheap to clone and share.
#[derive(Clone)]
pub struct ProblemDetailBuilder {
    registry: Arc<ExceptionRegistry>,
    universe: Arc<dyn TypeUniverse>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ProblemDetailBuilder {
    pub fn new(registry: Arc<ExceptionRegistry>) -> Self {
        Self {
            registry,
            universe: Arc::new(NoTypes),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_universe(mut self, universe: Arc<dyn TypeUniverse>) -> Self {
        self.universe = universe;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn registry(&self) -> &ExceptionRegistry {
        &self.registry
    }

    pub fn build(&self, exception: &dyn Exception, ctx: &TransportContext) -> ProblemDetail {
        self.resolve(exception, ctx).into_problem()
    }

    pub fn resolve(&self, exception: &dyn Exception, ctx: &TransportContext) -> ResolvedProblem {
        let identity = exception.identity();
        let metadata = exception.metadata();

        let transport_status = ctx.fallback_status.or_else(|| exception.transport_status());

        let status = metadata
            .status
            .or(transport_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let type_uri = self.type_uri(&identity, &metadata, transport_status);
        let title = self.title(&identity, &metadata, transport_status);
        let detail = exception
            .message()
            .filter(|m| !m.is_empty() && !has_default_message(m, status));

        let mut problem = ProblemDetail::new(status, type_uri, title)
            .with_instance(format!("urn:uuid:{}", Uuid::new_v4()));
        problem.detail = detail;
        for (name, value) in exception.extensions() {
            if STANDARD_MEMBERS.contains(&name.as_str()) {
                tracing::debug!(exception = %identity, member = %name, "dropping extension that shadows a standard member");
                continue;
            }
            problem.extensions.insert(name, value);
        }

        ResolvedProblem {
            log_level: metadata
                .log_level
                .unwrap_or_else(|| LogLevel::for_status(status)),
            media_type: ctx.response_media_type(),
            identity,
            problem,
            sink: Arc::clone(&self.sink),
        }
    }

    /// Reverse direction: the exception type a problem type URI stands for.
    pub fn map_type(&self, uri: &str) -> Option<ExceptionIdentity> {
        self.registry.resolve_or_derive(uri, self.universe.as_ref())
    }

    fn type_uri(
        &self,
        identity: &ExceptionIdentity,
        metadata: &DeclaredMetadata,
        transport_status: Option<StatusCode>,
    ) -> String {
        if let Some(declared) = metadata.type_uri.as_deref() {
            match ProblemTypeUri::parse(declared) {
                Ok(uri) => return uri.to_string(),
                Err(e) => tracing::warn!(exception = %identity, error = %e, "ignoring declared problem type"),
            }
        }
        if let Some(reason) = transport_status.and_then(|s| s.canonical_reason()) {
            return ProblemTypeUri::from_slug(&codec::slugify_phrase(reason)).to_string();
        }
        self.registry
            .type_uri_of(identity)
            .unwrap_or_else(|| self.registry.register(identity))
            .to_string()
    }

    fn title(
        &self,
        identity: &ExceptionIdentity,
        metadata: &DeclaredMetadata,
        transport_status: Option<StatusCode>,
    ) -> String {
        if let Some(title) = metadata.title.clone() {
            return title;
        }
        if let Some(reason) = transport_status.and_then(|s| s.canonical_reason()) {
            return reason.to_string();
        }
        codec::humanize(identity.simple_name(), self.registry.convention())
    }
}

impl std::fmt::Debug for ProblemDetailBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProblemDetailBuilder")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`ProblemDetailBuilder::resolve`]: the document plus what is needed to render and log it.
pub struct ResolvedProblem {
    problem: ProblemDetail,
    identity: ExceptionIdentity,
    media_type: String,
    log_level: LogLevel,
    sink: Arc<dyn DiagnosticSink>,
}

impl ResolvedProblem {
    pub fn problem(&self) -> &ProblemDetail {
        &self.problem
    }

    pub fn identity(&self) -> &ExceptionIdentity {
        &self.identity
    }

    pub fn status(&self) -> StatusCode {
        self.problem.status
    }

    /// Content type the document is rendered with.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Emits one diagnostic record; the document is left untouched.
    pub fn log(&self) -> &Self {
        self.sink.record(&DiagnosticRecord {
            level: self.log_level,
            identity: self.identity.clone(),
            status: self.problem.status,
            type_uri: self.problem.type_uri.clone(),
            title: self.problem.title.clone(),
            detail: self.problem.detail.clone(),
            instance: self.problem.instance.clone(),
        });
        self
    }

    pub fn into_problem(self) -> ProblemDetail {
        self.problem
    }
}

impl std::fmt::Debug for ResolvedProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProblem")
            .field("problem", &self.problem)
            .field("identity", &self.identity)
            .field("media_type", &self.media_type)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}
