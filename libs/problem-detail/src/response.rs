//! Axum integration: render a resolved problem as an HTTP response.

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::builder::ResolvedProblem;
use crate::problem::{ProblemDetail, APPLICATION_PROBLEM_JSON};

/// Response wrapper that renders a problem with its status and negotiated content type.
///
/// The body is always JSON; a non-JSON preference falls back to `application/problem+json`.
#[derive(Debug)]
pub struct ProblemResponse(pub ResolvedProblem);

impl From<ResolvedProblem> for ProblemResponse {
    fn from(p: ResolvedProblem) -> Self {
        Self(p)
    }
}

fn content_type(media_type: &str) -> HeaderValue {
    HeaderValue::from_str(media_type)
        .unwrap_or_else(|_| HeaderValue::from_static(APPLICATION_PROBLEM_JSON))
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let ct = content_type(self.0.media_type());
        let mut resp = self.0.into_problem().into_response();
        resp.headers_mut().insert(header::CONTENT_TYPE, ct);
        resp
    }
}

impl IntoResponse for ProblemDetail {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExceptionRegistry, HttpError, ProblemDetailBuilder, TransportContext};
    use axum::http::StatusCode;
    use std::sync::Arc;

    fn ct(resp: &Response) -> &str {
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let p = ProblemDetail::new(StatusCode::BAD_REQUEST, "urn:problem-type:bad-request", "Bad Request");
        let resp = p.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ct(&resp), APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn negotiated_media_type() {
        let builder = ProblemDetailBuilder::new(Arc::new(ExceptionRegistry::default()));
        let e = HttpError::new(StatusCode::NOT_FOUND);

        let ctx = TransportContext::default()
            .with_fallback_status(StatusCode::NOT_FOUND)
            .with_preferred_subtype("vnd.acme+json");
        let resp = ProblemResponse(builder.resolve(&e, &ctx)).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(ct(&resp), "application/problem+vnd.acme+json");

        let ctx = TransportContext::default().with_preferred_subtype("xml");
        let resp = ProblemResponse(builder.resolve(&e, &ctx)).into_response();
        assert_eq!(ct(&resp), APPLICATION_PROBLEM_JSON);
    }
}
