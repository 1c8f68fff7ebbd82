use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use problem_detail::{
    Exception, HttpError, KnownTypes, ProblemDetailBuilder, ProblemResponse, TransportContext,
    URN_PROBLEM_TYPE_PREFIX,
};
use runtime::ProblemConfig;
use serde_json::{json, Value};

use crate::errors::{self, CustomException, OutOfCreditsException, ValidationFailedException};

type HandlerResult<T> = Result<T, ProblemResponse>;

#[derive(Clone)]
pub struct AppState {
    builder: ProblemDetailBuilder,
}

impl AppState {
    /// Registry from config, with the demo namespace added to the convention.
    pub fn from_config(config: &ProblemConfig) -> anyhow::Result<Self> {
        let mut config = config.clone();
        config.convention = config.convention.with_namespace(errors::NAMESPACE);
        let registry = Arc::new(config.build_registry()?);

        let types = Arc::new(KnownTypes::new());
        errors::declare_types(&types);

        tracing::info!(
            registered = registry.len(),
            known_types = types.len(),
            "problem detail mapping ready"
        );
        Ok(Self {
            builder: ProblemDetailBuilder::new(registry).with_universe(types),
        })
    }

    pub fn builder(&self) -> &ProblemDetailBuilder {
        &self.builder
    }

    fn problem(&self, e: &dyn Exception, ctx: TransportContext) -> ProblemResponse {
        let resolved = self.builder.resolve(e, &ctx);
        resolved.log();
        ProblemResponse(resolved)
    }

    fn http_problem(&self, e: &HttpError, headers: &HeaderMap) -> ProblemResponse {
        self.problem(e, TransportContext::from_headers(headers))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/validation/manual", post(validation_manual))
        .route("/standard/plain-bad-request", get(plain_bad_request))
        .route(
            "/standard/bad-request-with-message",
            get(bad_request_with_message),
        )
        .route("/custom/runtime", get(custom_runtime))
        .route("/custom/explicit-type", get(custom_explicit_type))
        .route("/problem-types/{slug}", get(problem_type))
        .fallback(not_found)
        .with_state(state)
}

async fn validation_manual(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<StatusCode> {
    let e = ValidationFailedException::new([
        ("firstName", "must not be null"),
        ("lastName", "must not be empty"),
        ("born", "must be a past date"),
        ("address[0].street", "must not be null"),
        ("address[0].zipCode", "must be greater than 0"),
        ("address[0].city", "must not be null"),
    ]);
    Err(state.problem(&e, TransportContext::from_headers(&headers)))
}

async fn plain_bad_request(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<StatusCode> {
    Err(state.http_problem(&HttpError::new(StatusCode::BAD_REQUEST), &headers))
}

async fn bad_request_with_message(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<StatusCode> {
    let e = HttpError::with_message(StatusCode::BAD_REQUEST, "some message");
    Err(state.http_problem(&e, &headers))
}

async fn custom_runtime(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<StatusCode> {
    let e = CustomException("some message".to_string());
    Err(state.problem(&e, TransportContext::from_headers(&headers)))
}

async fn custom_explicit_type(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<StatusCode> {
    let e = OutOfCreditsException {
        balance: 30,
        cost: 50,
        accounts: vec!["/account/12345".to_string(), "/account/67890".to_string()],
    };
    Err(state.problem(&e, TransportContext::from_headers(&headers)))
}

/// Maps `urn:problem-type:<slug>` back to the exception type it stands for.
async fn problem_type(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> HandlerResult<Json<Value>> {
    let uri = format!("{URN_PROBLEM_TYPE_PREFIX}{slug}");
    match state.builder.map_type(&uri) {
        Some(identity) => Ok(Json(json!({ "type": uri, "exception": identity.name() }))),
        None => {
            let e = HttpError::with_message(
                StatusCode::NOT_FOUND,
                format!("no exception type for '{uri}'"),
            );
            Err(state.http_problem(&e, &headers))
        }
    }
}

async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> ProblemResponse {
    state.http_problem(&HttpError::new(StatusCode::NOT_FOUND), &headers)
}
