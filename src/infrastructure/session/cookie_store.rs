//! Signed cookie session store
//!
//! The whole session lives in the cookie:
//! `base64url(json values) "." base64url(HMAC-SHA256(key, name "|" payload))`.
//! Binding the cookie name into the MAC stops a value signed for one cookie
//! from being replayed under another.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cookie::{time::Duration, Cookie, SameSite};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use tracing::warn;

use super::{Session, SessionError, SessionStore};

type HmacSha256 = Hmac<Sha256>;

/// Cookie lifetime: 30 days
const SESSION_MAX_AGE_SECS: i64 = 86_400 * 30;

/// Session store that keeps all session state in an HMAC-signed cookie
#[derive(Clone)]
pub struct CookieSessionStore {
    key: Vec<u8>,
    secure: bool,
}

impl std::fmt::Debug for CookieSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSessionStore")
            .field("key", &"[REDACTED]")
            .field("secure", &self.secure)
            .finish()
    }
}

impl CookieSessionStore {
    /// Create a store signing with the given key
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            secure: false,
        }
    }

    /// Mark issued cookies `Secure` (HTTPS only)
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn mac(&self, name: &str, payload: &str) -> Result<HmacSha256, SessionError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let json = serde_json::to_vec(session.values())
            .map_err(|e| SessionError::Encode(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = self.mac(session.name(), &payload)?.finalize().into_bytes();

        Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verify and decode a cookie value. `None` means tampered or malformed.
    fn decode(&self, name: &str, value: &str) -> Option<BTreeMap<String, Value>> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        self.mac(name, payload).ok()?.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

#[async_trait]
impl SessionStore for CookieSessionStore {
    async fn get(&self, headers: &HeaderMap, name: &str) -> Result<Session, SessionError> {
        let Some(value) = find_cookie(headers, name) else {
            return Ok(Session::new(name));
        };

        match self.decode(name, &value) {
            Some(values) => Ok(Session::restore(name, values)),
            None => {
                warn!(cookie = %name, "Discarding session cookie with invalid signature");
                Ok(Session::new(name))
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<HeaderValue, SessionError> {
        let cookie = Cookie::build((session.name().to_string(), self.encode(session)?))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
            .build();

        HeaderValue::from_str(&cookie.to_string()).map_err(|e| SessionError::Encode(e.to_string()))
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    const NAME: &str = "apiserver_session";

    fn cookie_header(set_cookie: &HeaderValue) -> HeaderMap {
        let parsed = Cookie::parse(set_cookie.to_str().unwrap().to_string()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}={}", parsed.name(), parsed.value()).parse().unwrap(),
        );
        headers
    }

    async fn signed_session(store: &CookieSessionStore, id: i64) -> HeaderValue {
        let mut session = Session::new(NAME);
        session.set_user_id(UserId::new(id)).unwrap();
        store.save(&session).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_cookie_starts_new_session() {
        let store = CookieSessionStore::new("secret");

        let session = store.get(&HeaderMap::new(), NAME).await.unwrap();

        assert!(session.is_new());
        assert_eq!(session.user_id(), None);
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let store = CookieSessionStore::new("secret");
        let set_cookie = signed_session(&store, 42).await;

        let session = store.get(&cookie_header(&set_cookie), NAME).await.unwrap();

        assert!(!session.is_new());
        assert_eq!(session.user_id(), Some(UserId::new(42)));
    }

    #[tokio::test]
    async fn test_cookie_attributes() {
        let store = CookieSessionStore::new("secret");
        let set_cookie = signed_session(&store, 1).await;
        let value = set_cookie.to_str().unwrap();

        assert!(value.starts_with("apiserver_session="));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=2592000"));
        assert!(!value.contains("Secure"));

        let secure = CookieSessionStore::new("secret").with_secure(true);
        let set_cookie = signed_session(&secure, 1).await;
        assert!(set_cookie.to_str().unwrap().contains("Secure"));
    }

    #[tokio::test]
    async fn test_cookie_signed_with_other_key_is_discarded() {
        let store = CookieSessionStore::new("secret");
        let forged = signed_session(&CookieSessionStore::new("other"), 1).await;

        let session = store.get(&cookie_header(&forged), NAME).await.unwrap();

        assert!(session.is_new());
        assert_eq!(session.user_id(), None);
    }

    #[tokio::test]
    async fn test_tampered_payload_is_discarded() {
        let store = CookieSessionStore::new("secret");
        let genuine = signed_session(&store, 1).await;
        let genuine = Cookie::parse(genuine.to_str().unwrap().to_string()).unwrap();
        let (_, signature) = genuine.value().split_once('.').unwrap();

        let payload = URL_SAFE_NO_PAD.encode(br#"{"user_id":2}"#);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}={}.{}", NAME, payload, signature).parse().unwrap(),
        );

        let session = store.get(&headers, NAME).await.unwrap();
        assert_eq!(session.user_id(), None);
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_discarded() {
        let store = CookieSessionStore::new("secret");
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "apiserver_session=garbage".parse().unwrap());

        let session = store.get(&headers, NAME).await.unwrap();
        assert!(session.is_new());
    }

    #[tokio::test]
    async fn test_cookie_bound_to_its_name() {
        let store = CookieSessionStore::new("secret");
        let set_cookie = signed_session(&store, 1).await;
        let parsed = Cookie::parse(set_cookie.to_str().unwrap().to_string()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("other_session={}", parsed.value()).parse().unwrap(),
        );

        let session = store.get(&headers, "other_session").await.unwrap();
        assert_eq!(session.user_id(), None);
    }

    #[tokio::test]
    async fn test_finds_cookie_among_others() {
        let store = CookieSessionStore::new("secret");
        let set_cookie = signed_session(&store, 5).await;
        let parsed = Cookie::parse(set_cookie.to_str().unwrap().to_string()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("theme=dark; {}={}; lang=en", NAME, parsed.value())
                .parse()
                .unwrap(),
        );

        let session = store.get(&headers, NAME).await.unwrap();
        assert_eq!(session.user_id(), Some(UserId::new(5)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = CookieSessionStore::new("secret");
        assert!(!format!("{:?}", store).contains("secret"));
    }
}
