use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::credentials::AdminCredentials;
use super::pages::{DASHBOARD_PAGE, LOGIN_PAGE};
use super::session::{SessionError, SessionStore, SessionToken};
use crate::workflows::registration::router::rejection_response;

pub(crate) const SESSION_COOKIE: &str = "session";
const LOGIN_PATH: &str = "/admin/login";

/// Shared state for the admin pages: credential check plus the injected session store.
pub struct AdminState<S> {
    pub sessions: Arc<S>,
    pub credentials: AdminCredentials,
    pub session_ttl: chrono::Duration,
}

impl<S> Clone for AdminState<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            credentials: self.credentials.clone(),
            session_ttl: self.session_ttl,
        }
    }
}

/// Router builder for login, session-gated dashboard, and logout.
pub fn admin_router<S>(state: AdminState<S>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login_handler::<S>))
        .route("/admin/dashboard", get(dashboard_handler::<S>))
        .route("/admin/check-session", get(check_session_handler::<S>))
        .route("/admin/logout", get(logout_handler::<S>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

/// Extract the session token from any `Cookie` header on the request.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionToken(value.to_string()))
}

fn authenticated<S: SessionStore>(sessions: &S, headers: &HeaderMap) -> bool {
    let Some(token) = session_token(headers) else {
        return false;
    };
    match sessions.resolve(&token) {
        Ok(principal) => principal.is_some(),
        Err(err) => {
            error!(error = %err, "session lookup failed");
            false
        }
    }
}

fn redirect_to_login(clear_cookie: bool) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(LOGIN_PATH));
    if clear_cookie {
        response.headers_mut().insert(
            header::SET_COOKIE,
            HeaderValue::from_static("session=; Path=/; HttpOnly; Max-Age=0"),
        );
    }
    response
}

pub(crate) async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub(crate) async fn login_handler<S>(
    State(state): State<AdminState<S>>,
    body: Result<axum::Json<LoginRequest>, JsonRejection>,
) -> Response
where
    S: SessionStore + 'static,
{
    let request = match body {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    let issued = state
        .credentials
        .authenticate(&request.username, &request.password)
        .and_then(|principal| state.sessions.issue(principal));

    match issued {
        Ok(token) => {
            info!(username = %request.username, "admin signed in");
            let cookie = format!(
                "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                token.as_str(),
                state.session_ttl.num_seconds().max(0)
            );
            let mut response =
                (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response();
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                    response
                }
                Err(err) => {
                    error!(error = %err, "session cookie is not a valid header value");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Err(SessionError::AuthFailure) => {
            warn!(username = %request.username, "admin sign-in rejected");
            let payload = json!({ "success": false, "error": "Invalid credentials" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "admin sign-in failed");
            let payload = json!({ "success": false, "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(state): State<AdminState<S>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    if authenticated(state.sessions.as_ref(), &headers) {
        Html(DASHBOARD_PAGE).into_response()
    } else {
        redirect_to_login(false)
    }
}

pub(crate) async fn check_session_handler<S>(
    State(state): State<AdminState<S>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    let authenticated = authenticated(state.sessions.as_ref(), &headers);
    axum::Json(json!({ "authenticated": authenticated })).into_response()
}

pub(crate) async fn logout_handler<S>(
    State(state): State<AdminState<S>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    if let Some(token) = session_token(&headers) {
        if let Err(err) = state.sessions.revoke(&token) {
            error!(error = %err, "session revoke failed");
        }
    }
    redirect_to_login(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::session::InMemorySessionStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> AdminState<InMemorySessionStore> {
        AdminState {
            sessions: Arc::new(InMemorySessionStore::new(chrono::Duration::hours(1))),
            credentials: AdminCredentials::new("admin", "letmein"),
            session_ttl: chrono::Duration::hours(1),
        }
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::post(LOGIN_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .expect("request builds")
    }

    fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).expect("request builds")
    }

    fn session_cookie(response: &Response) -> String {
        let raw = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("set-cookie present");
        raw.split(';').next().unwrap_or_default().to_string()
    }

    #[test]
    fn session_token_is_read_from_any_cookie_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(
            session_token(&headers).map(|token| token.0),
            Some("abc-123".to_string())
        );

        headers.insert(header::COOKIE, HeaderValue::from_static("session=; other=1"));
        assert!(session_token(&headers).is_none());
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn login_sets_cookie_that_unlocks_dashboard() {
        let state = state();
        let router = admin_router(state.clone());

        let response = router
            .clone()
            .oneshot(login_request("admin", "letmein"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=3600"));
        let cookie = session_cookie(&response);
        assert_eq!(state.sessions.active_sessions(), 1);

        let dashboard = router
            .clone()
            .oneshot(get_with_cookie("/admin/dashboard", Some(&cookie)))
            .await
            .expect("route executes");
        assert_eq!(dashboard.status(), StatusCode::OK);

        let check = router
            .oneshot(get_with_cookie("/admin/check-session", Some(&cookie)))
            .await
            .expect("route executes");
        let body = axum::body::to_bytes(check.into_body(), 1024)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(payload, json!({ "authenticated": true }));
    }

    #[tokio::test]
    async fn wrong_credentials_are_unauthorized() {
        let state = state();
        let response = admin_router(state.clone())
            .oneshot(login_request("admin", "guess"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(state.sessions.active_sessions(), 0);
    }

    #[tokio::test]
    async fn malformed_login_body_gets_json_error() {
        let state = state();
        let request = Request::post(LOGIN_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username": 7, "password": "letmein"}"#))
            .expect("request builds");

        let response = admin_router(state.clone())
            .oneshot(request)
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(payload["success"], false);
        assert!(payload["error"]
            .as_str()
            .is_some_and(|message| message.contains("username")));
        assert_eq!(state.sessions.active_sessions(), 0);
    }

    #[tokio::test]
    async fn dashboard_redirects_without_valid_session() {
        let router = admin_router(state());

        for cookie in [None, Some("session=forged-token")] {
            let response = router
                .clone()
                .oneshot(get_with_cookie("/admin/dashboard", cookie))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get(header::LOCATION),
                Some(&HeaderValue::from_static(LOGIN_PATH))
            );
        }
    }

    #[tokio::test]
    async fn logout_revokes_session_and_clears_cookie() {
        let state = state();
        let router = admin_router(state.clone());
        let login = router
            .clone()
            .oneshot(login_request("admin", "letmein"))
            .await
            .expect("route executes");
        let cookie = session_cookie(&login);

        let logout = router
            .clone()
            .oneshot(get_with_cookie("/admin/logout", Some(&cookie)))
            .await
            .expect("route executes");
        assert_eq!(logout.status(), StatusCode::FOUND);
        assert!(logout
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .contains("Max-Age=0"));
        assert_eq!(state.sessions.active_sessions(), 0);

        let dashboard = router
            .oneshot(get_with_cookie("/admin/dashboard", Some(&cookie)))
            .await
            .expect("route executes");
        assert_eq!(dashboard.status(), StatusCode::FOUND);
    }
}
