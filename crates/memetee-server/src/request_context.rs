use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;

use memetee_core::RequestContext;

/// Middleware that attaches a `RequestContext` to every request
///
/// Runs innermost so handlers and the rate-limit layer can rely on the
/// extension being present.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let context = RequestContext {
        client_ip: extract_client_ip(&request),
    };
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Best-effort client IP: proxy headers first, then the socket peer
fn extract_client_ip(request: &Request) -> Option<String> {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
        && !first.trim().is_empty()
    {
        return Some(first.trim().to_string());
    }

    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(val) = real_ip.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}
