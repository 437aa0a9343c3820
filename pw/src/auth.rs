//! Session authentication
//!
//! Passwords are stored as argon2 PHC strings. A login creates a server-side
//! session whose random token travels in an HttpOnly cookie; the extractors
//! below resolve that cookie to the current user.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::server::{ApiError, AppState};
use crate::store::{StoreError, User};

/// Hash a password into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Check a password against a stored PHC string; a malformed hash never verifies
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            debug!(error = %e, "verify_password: unparseable hash");
            false
        }
    }
}

/// Value of cookie `name` in the request headers, if present and non-empty
pub fn session_token(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value starting a session
pub fn session_cookie(config: &AuthConfig, token: &str) -> String {
    let max_age = u64::from(config.session_ttl_hours) * 3600;
    cookie(config, token, max_age)
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_cookie(config: &AuthConfig) -> String {
    cookie(config, "", 0)
}

fn cookie(config: &AuthConfig, value: &str, max_age: u64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        config.cookie_name, value, max_age
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

fn current_user(parts: &Parts, state: &AppState) -> Result<Option<User>, StoreError> {
    let Some(token) = session_token(&parts.headers, &state.auth.cookie_name) else {
        return Ok(None);
    };
    state.store.session_user(&token)
}

/// The logged-in user, or `None` for anonymous requests
///
/// A failed session lookup is treated as anonymous so optional-auth routes keep working.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match current_user(parts, state) {
            Ok(user) => Ok(MaybeUser(user)),
            Err(e) => {
                warn!(error = %e, "MaybeUser: session lookup failed, continuing anonymously");
                Ok(MaybeUser(None))
            }
        }
    }
}

/// The logged-in user; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match current_user(parts, state)? {
            Some(user) => Ok(RequireUser(user)),
            None => {
                debug!(uri = %parts.uri, "RequireUser: anonymous request rejected");
                Err(ApiError::LoginRequired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_session_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; planwright_session=abc123 ; x=y"));
        assert_eq!(session_token(&headers, "planwright_session").as_deref(), Some("abc123"));
        assert_eq!(session_token(&headers, "missing"), None);
    }

    #[test]
    fn test_session_token_across_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("planwright_session=tok"));
        assert_eq!(session_token(&headers, "planwright_session").as_deref(), Some("tok"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("planwright_session="));
        assert_eq!(session_token(&headers, "planwright_session"), None);
    }

    #[test]
    fn test_cookie_formatting() {
        let config = AuthConfig::default();
        let cookie = session_cookie(&config, "tok");
        assert_eq!(
            cookie,
            "planwright_session=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800"
        );
        assert!(clear_cookie(&config).contains("Max-Age=0"));

        let secure = AuthConfig {
            secure_cookie: true,
            ..AuthConfig::default()
        };
        assert!(session_cookie(&secure, "tok").ends_with("; Secure"));
    }
}
