use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use cookie::Cookie;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::service::SessionService;
use crate::shared::{AppError, AppState};

/// Name of the cookie that carries the session token
pub const SESSION_COOKIE: &str = "session";

/// Session-loading middleware - resolves the session cookie and adds a
/// SessionContext to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::load_session))
/// Handlers can then extract Extension(ctx): Extension<SessionContext>.
#[instrument(skip(state, req, next))]
pub async fn load_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers());

    let service = SessionService::new(Arc::clone(&state.session_repository));
    let ctx = service.context_for_token(token.as_deref()).await?;

    debug!(
        logged_in = ctx.is_logged_in(),
        "Session context resolved for {}",
        req.uri()
    );

    // Add the context to request extensions for handlers to use
    req.extensions_mut().insert(ctx);

    // Continue to next middleware/handler
    Ok(next.run(req).await)
}

/// Extracts the session token from the Cookie header, if present
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    Cookie::split_parse(raw)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Renders the Set-Cookie value that installs a session token
pub fn session_cookie(token: &str) -> String {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
        .to_string()
}

/// Renders the Set-Cookie value that removes the session cookie
pub fn clear_session_cookie() -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );

        assert_eq!(session_token(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_session_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_round_trip() {
        let rendered = session_cookie("token-1");

        // The rendered value parses back to the same token
        let parsed = Cookie::parse(rendered.clone()).unwrap();
        assert_eq!(parsed.name(), SESSION_COOKIE);
        assert_eq!(parsed.value(), "token-1");
        assert!(rendered.contains("HttpOnly"));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, "token-1")).unwrap(),
        );
        assert_eq!(session_token(&headers), Some("token-1".to_string()));
    }

    #[test]
    fn test_clear_session_cookie_empties_value() {
        let rendered = clear_session_cookie();

        let parsed = Cookie::parse(rendered).unwrap();
        assert_eq!(parsed.name(), SESSION_COOKIE);
        assert_eq!(parsed.value(), "");
    }
}
