use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Session creation timestamp, preserved across cookie refreshes
    pub created_at: i64,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.into(),
            created_at: created_at.timestamp(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Identity resolved from a session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Session secret is not configured")]
    InvalidSecret,
    #[error("Session token generation error: {0}")]
    TokenGeneration(String),
}

/// Resolves the session behind a request, if any.
///
/// Dashboard and builder sessions live in separate cookie domains, so the
/// application holds one authenticator per surface.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn is_authenticated(&self, headers: &HeaderMap) -> Result<Option<SessionData>, AuthError>;
}

/// Authenticator backed by a signed session cookie
#[derive(Debug, Clone)]
pub struct CookieAuthenticator {
    cookie_name: String,
    secret: String,
}

impl CookieAuthenticator {
    pub fn new(cookie_name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secret: secret.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a session token for this cookie. Used by the login flow and tests.
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    fn decode_session(&self, token: &str) -> Option<SessionData> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let claims = match decode::<SessionClaims>(token, &decoding_key, &Validation::default()) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Ignoring invalid {} cookie: {}", self.cookie_name, e);
                return None;
            }
        };

        let created_at = Utc.timestamp_opt(claims.created_at, 0).single()?;
        Some(SessionData {
            user_id: claims.sub,
            created_at,
        })
    }
}

#[async_trait]
impl Authenticator for CookieAuthenticator {
    async fn is_authenticated(&self, headers: &HeaderMap) -> Result<Option<SessionData>, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        Ok(cookie_value(headers, &self.cookie_name).and_then(|token| self.decode_session(&token)))
    }
}

/// Find a cookie by name across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// A service call carries the shared secret verbatim in `Authorization`.
/// An unset secret never matches.
pub fn is_service_call(headers: &HeaderMap, service_secret: &str) -> bool {
    if service_secret.is_empty() {
        return false;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == service_secret)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authenticator() -> CookieAuthenticator {
        CookieAuthenticator::new("_session", "test-secret")
    }

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_others() {
        let headers = headers_with_cookie("theme=dark; _session=abc.def; other=1");
        assert_eq!(cookie_value(&headers, "_session").as_deref(), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "_builder_session"), None);
    }

    #[tokio::test]
    async fn resolves_session_from_signed_cookie() {
        let auth = authenticator();
        let created_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = auth.issue(&SessionClaims::new("user-1", created_at, 1)).unwrap();

        let headers = headers_with_cookie(&format!("_session={token}"));
        let session = auth.is_authenticated(&headers).await.unwrap().unwrap();
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.created_at, created_at);
    }

    #[tokio::test]
    async fn rejects_cookie_signed_with_other_secret() {
        let other = CookieAuthenticator::new("_session", "another-secret");
        let token = other.issue(&SessionClaims::new("user-1", Utc::now(), 1)).unwrap();

        let headers = headers_with_cookie(&format!("_session={token}"));
        assert!(authenticator().is_authenticated(&headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_secret_is_a_configuration_error() {
        let auth = CookieAuthenticator::new("_session", "");
        let result = auth.is_authenticated(&HeaderMap::new()).await;
        assert!(matches!(result, Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn service_call_requires_exact_secret() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("s3cret"));

        assert!(is_service_call(&headers, "s3cret"));
        assert!(!is_service_call(&headers, "other"));
        assert!(!is_service_call(&HeaderMap::new(), "s3cret"));
        assert!(!is_service_call(&headers, ""));
    }
}
