/// Hand-built session cookie with HMAC signing
///
/// Sessions are carried entirely in a cookie; there is no server-side
/// session store and no framework session plugin. The cookie value is
///
/// ```text
/// {user_id}.{expires_unix}.{hex(hmac_sha256(secret, "{user_id}.{expires_unix}"))}
/// ```
///
/// Tampering with the user id or the expiry invalidates the signature, and
/// the expiry is checked on every request. A bad cookie simply reads as
/// logged-out.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::session::{issue_token, verify_token};
///
/// let secret = "a-secret-key-that-is-long-enough-32";
/// let token = issue_token(42, secret);
/// assert_eq!(verify_token(&token, secret), Some(42));
/// assert_eq!(verify_token(&token, "another-secret-key-32-bytes-long!"), None);
/// ```

use crate::http::cookies::{Cookie, Cookies};
use crate::models::user::User;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Session lifetime: 30 days
pub const SESSION_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;

fn sign(payload: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Issues a signed session token for a user
///
/// The expiry is baked into the signed payload, so it cannot be extended
/// client-side.
pub fn issue_token(user_id: i64, secret: &str) -> String {
    let expires = Utc::now().timestamp() + SESSION_TTL_SECONDS;
    let payload = format!("{}.{}", user_id, expires);
    let signature = sign(&payload, secret);
    format!("{}.{}", payload, signature)
}

/// Verifies a session token and returns the user id it names
///
/// Returns `None` for malformed, tampered or expired tokens. The signature
/// check is constant-time via the hmac crate.
pub fn verify_token(token: &str, secret: &str) -> Option<i64> {
    let mut parts = token.splitn(3, '.');
    let user_id: i64 = parts.next()?.parse().ok()?;
    let expires: i64 = parts.next()?.parse().ok()?;
    let signature = parts.next()?;

    if expires < Utc::now().timestamp() {
        return None;
    }

    let payload = format!("{}.{}", user_id, expires);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());

    let raw = hex::decode(signature).ok()?;
    mac.verify_slice(&raw).ok()?;

    Some(user_id)
}

/// Reads and verifies the session out of request cookies
pub fn user_id_from_cookies(cookies: &Cookies, secret: &str) -> Option<i64> {
    let token = cookies.get(SESSION_COOKIE)?;
    verify_token(token, secret)
}

/// Builds the Set-Cookie for a fresh session
pub fn session_cookie(token: &str) -> Cookie {
    Cookie::new(SESSION_COOKIE, token)
        .path("/")
        .max_age(SESSION_TTL_SECONDS)
        .http_only()
}

/// Removal cookie that logs the client out
pub fn clear_session_cookie() -> Cookie {
    Cookie::removal(SESSION_COOKIE)
}

/// The authenticated user for the current request
///
/// Populated by the web server's session-loading middleware when the
/// session cookie verifies and the user row still exists. Handlers that
/// require authentication take this as an extractor; unauthenticated
/// requests are redirected to the login page with an "Access denied"
/// flash, matching the browser flow.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Rejection for [`CurrentUser`]: redirect to the login form
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        let flash = crate::http::flash::Flash::danger("Access denied");
        (
            StatusCode::SEE_OTHER,
            AppendHeaders([
                (header::LOCATION, "/session/new".to_string()),
                flash.to_cookie().header(),
            ]),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthRedirect)
    }
}

/// Optional variant of [`CurrentUser`] for routes open to visitors
///
/// Listing pages are public but still show who is signed in.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<CurrentUser>().map(|u| u.0.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_roundtrip() {
        let token = issue_token(7, SECRET);
        assert_eq!(verify_token(&token, SECRET), Some(7));
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token(7, SECRET);
        assert_eq!(
            verify_token(&token, "another-secret-key-32-bytes-long!!"),
            None
        );
    }

    #[test]
    fn test_tampered_user_id_rejected() {
        let token = issue_token(7, SECRET);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[0] = "8";
        let forged = parts.join(".");
        assert_eq!(verify_token(&forged, SECRET), None);
    }

    #[test]
    fn test_tampered_expiry_rejected() {
        let token = issue_token(7, SECRET);
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let bumped: i64 = parts[1].parse::<i64>().unwrap() + 10_000;
        parts[1] = bumped.to_string();
        let forged = parts.join(".");
        assert_eq!(verify_token(&forged, SECRET), None);
    }

    #[test]
    fn test_expired_token_rejected() {
        let expires = Utc::now().timestamp() - 1;
        let payload = format!("7.{}", expires);
        let token = format!("{}.{}", payload, sign(&payload, SECRET));
        assert_eq!(verify_token(&token, SECRET), None);
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert_eq!(verify_token("", SECRET), None);
        assert_eq!(verify_token("garbage", SECRET), None);
        assert_eq!(verify_token("1.2", SECRET), None);
        assert_eq!(verify_token("a.b.c", SECRET), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let header = session_cookie("tok").encode();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
        assert!(header.contains(&format!("Max-Age={}", SESSION_TTL_SECONDS)));
    }
}
