use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use memetee_core::{ErrorBody, RequestContext};
use memetee_ratelimit::{Admission, ScopedLimiter};

/// Per-resource rate limiting middleware
///
/// Applied as a route layer on each guarded endpoint with that
/// endpoint's scoped limiter.
pub async fn rate_limit_middleware(
    limiter: Arc<ScopedLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client_id = request
        .extensions()
        .get::<RequestContext>()
        .map_or_else(|| "unknown".to_owned(), |ctx| ctx.client_id().to_owned());

    match limiter.admit(&client_id).await {
        Ok(Admission::Allowed) => next.run(request).await,
        Ok(Admission::Rejected { retry_after }) => rate_limit_response(retry_after),
        Err(error) => {
            // A broken store must not take the endpoint down with it
            tracing::error!(
                scope = limiter.scope(),
                error = %error,
                "rate limiter unavailable, admitting request"
            );
            next.run(request).await
        }
    }
}

fn rate_limit_response(retry_after: u64) -> Response {
    let body = ErrorBody::new(
        "Too many requests, please try again in 5 minutes.".to_owned(),
        Some("RATE_LIMITED"),
    );

    let mut response =
        (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();

    if let Ok(val) = retry_after.to_string().parse() {
        response.headers_mut().insert("retry-after", val);
    }

    response
}
