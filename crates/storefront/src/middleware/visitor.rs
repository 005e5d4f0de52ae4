//! Visitor cookie middleware and extractor.
//!
//! Every browser gets a long-lived `fs_visitor` cookie holding a random
//! [`VisitorId`]. Durable-scope slots are keyed by it, so they survive
//! browser restarts for as long as the cookie does.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use crate::error::AppError;
use crate::models::VisitorId;
use crate::state::AppState;

/// Visitor cookie name.
pub const VISITOR_COOKIE_NAME: &str = "fs_visitor";

/// Visitor cookie lifetime in days.
const VISITOR_COOKIE_DAYS: i64 = 365;

/// Find a valid visitor id among the request's cookies.
fn visitor_from_cookies(headers: &axum::http::HeaderMap) -> Option<VisitorId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == VISITOR_COOKIE_NAME)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// Build the `Set-Cookie` value for a newly issued visitor id.
fn visitor_cookie(visitor: VisitorId, secure: bool) -> String {
    Cookie::build((VISITOR_COOKIE_NAME, visitor.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(VISITOR_COOKIE_DAYS))
        .build()
        .to_string()
}

/// Middleware that resolves the visitor and stores it in request extensions.
///
/// A missing or malformed cookie yields a fresh id, which is set on the
/// response.
pub async fn visitor_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = visitor_from_cookies(request.headers());
    let visitor = existing.unwrap_or_else(VisitorId::generate);

    tracing::Span::current().record("visitor_id", tracing::field::display(visitor));
    request.extensions_mut().insert(visitor);

    let mut response = next.run(request).await;

    if existing.is_none() {
        tracing::debug!(%visitor, "Issued visitor cookie");
        match HeaderValue::from_str(&visitor_cookie(visitor, state.config().secure_cookies())) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode visitor cookie"),
        }
    }

    response
}

/// Extractor for the visitor resolved by [`visitor_middleware`].
impl<S> FromRequestParts<S> for VisitorId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().copied().ok_or_else(|| {
            AppError::Internal("visitor not found in request extensions".to_string())
        })
    }
}
