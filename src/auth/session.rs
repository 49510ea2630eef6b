use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

pub const SESSION_COOKIE: &str = "finsight_session";

/// Sessions live for seven days; the cookie Max-Age and the token expiry
/// carry the same horizon.
const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: i64,
    email: String,
    wid: i64,
    iat: usize,
    exp: usize,
}

/// Identity asserted by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: i64,
    pub email: String,
    pub workspace_id: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to sign session token")]
    Sign(#[from] jsonwebtoken::errors::Error),
    #[error("session cookie is not a valid header value")]
    Cookie(#[from] InvalidHeaderValue),
}

/// Signs and reads session cookies. Constructed once at startup and handed
/// around inside AppState; there is no process-wide store.
pub struct Sessions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    cookie_secure: bool,
}

impl Sessions {
    pub fn new(secret: &str, cookie_secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            cookie_secure,
        }
    }

    /// Issue a signed session token for the given identity and wrap it in a
    /// Set-Cookie value. The token is opaque to the client; the signature
    /// makes the embedded identifiers tamper-evident.
    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        workspace_id: i64,
    ) -> Result<HeaderValue, SessionError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(SESSION_TTL_SECS);
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            wid: workspace_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;

        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }

        debug!(user_id, workspace_id, "session issued");
        Ok(HeaderValue::from_str(&cookie)?)
    }

    /// Read the session from a request's headers. A missing cookie, a
    /// tampered or expired token, and a token missing any identity field all
    /// collapse to `None`; callers cannot tell these apart.
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionData> {
        let token = cookie_value(headers, SESSION_COOKIE)?;
        let data =
            decode::<SessionClaims>(&token, &self.decoding, &Validation::default()).ok()?;
        Some(SessionData {
            user_id: data.claims.sub,
            email: data.claims.email,
            workspace_id: data.claims.wid,
        })
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn sessions() -> Sessions {
        Sessions::new("test-secret", false)
    }

    /// Turn an issued Set-Cookie value into the Cookie header a browser
    /// would send back.
    fn request_headers(set_cookie: &HeaderValue) -> HeaderMap {
        let pair = set_cookie
            .to_str()
            .expect("cookie is ascii")
            .split(';')
            .next()
            .expect("cookie has a name=value pair")
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).expect("header value"));
        headers
    }

    #[test]
    fn issue_then_read_roundtrip() {
        let sessions = sessions();
        let cookie = sessions.issue(7, "a@b.com", 3).expect("issue session");
        let session = sessions.read(&request_headers(&cookie)).expect("read session");
        assert_eq!(
            session,
            SessionData {
                user_id: 7,
                email: "a@b.com".into(),
                workspace_id: 3,
            }
        );
    }

    #[test]
    fn cookie_carries_the_expected_attributes() {
        let cookie = sessions().issue(7, "a@b.com", 3).expect("issue session");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("finsight_session="));
        assert!(value.contains("Path=/"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=604800"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn secure_attribute_is_set_when_configured() {
        let sessions = Sessions::new("test-secret", true);
        let cookie = sessions.issue(7, "a@b.com", 3).expect("issue session");
        assert!(cookie.to_str().expect("ascii").ends_with("; Secure"));
    }

    #[test]
    fn read_without_cookie_is_unauthenticated() {
        assert_eq!(sessions().read(&HeaderMap::new()), None);
    }

    #[test]
    fn read_ignores_unrelated_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        assert_eq!(sessions().read(&headers), None);
    }

    #[test]
    fn read_rejects_a_tampered_token() {
        let sessions = sessions();
        let cookie = sessions.issue(7, "a@b.com", 3).expect("issue session");
        let pair = cookie
            .to_str()
            .expect("ascii")
            .split(';')
            .next()
            .expect("pair")
            .to_string();
        // Flip the last signature character.
        let tampered = if pair.ends_with('A') {
            format!("{}B", &pair[..pair.len() - 1])
        } else {
            format!("{}A", &pair[..pair.len() - 1])
        };
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&tampered).expect("header"));
        assert_eq!(sessions.read(&headers), None);
    }

    #[test]
    fn read_rejects_a_token_signed_with_another_secret() {
        let theirs = Sessions::new("other-secret", false);
        let cookie = theirs.issue(7, "a@b.com", 3).expect("issue session");
        assert_eq!(sessions().read(&request_headers(&cookie)), None);
    }

    #[test]
    fn read_rejects_a_token_missing_an_identity_field() {
        #[derive(Serialize)]
        struct PartialClaims {
            sub: i64,
            email: String,
            iat: usize,
            exp: usize,
        }

        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = PartialClaims {
            sub: 7,
            email: "a@b.com".into(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode partial claims");

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).expect("header"),
        );
        assert_eq!(sessions().read(&headers), None);
    }

    #[test]
    fn read_rejects_an_expired_token() {
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            sub: 7,
            email: "a@b.com".into(),
            wid: 3,
            iat: (now - TimeDuration::days(8)).unix_timestamp() as usize,
            exp: (now - TimeDuration::days(1)).unix_timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode expired claims");

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).expect("header"),
        );
        assert_eq!(sessions().read(&headers), None);
    }
}
