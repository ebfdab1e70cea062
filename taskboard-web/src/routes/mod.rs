/// Route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `session`: Login / logout (hand-built cookie session)
/// - `users`: Registration and account management
/// - `statuses`: Workflow statuses
/// - `labels`: Labels
/// - `tasks`: Tasks and the filterable list
///
/// Mutations follow the browser flow: on success they answer 303 with a
/// flash cookie; listing handlers consume the flash and echo it in the
/// response body.

pub mod health;
pub mod labels;
pub mod session;
pub mod statuses;
pub mod tasks;
pub mod users;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use taskboard_shared::http::cookies::{Cookie, Cookies};
use taskboard_shared::http::flash::{Flash, FLASH_COOKIE};

/// Appends a Set-Cookie header to a response
///
/// Cookie encoding only emits ASCII, so the header value conversion can't
/// fail in practice; a failure is dropped rather than panicking.
pub(crate) fn append_cookie(response: &mut Response, cookie: &Cookie) {
    if let Ok(value) = HeaderValue::from_str(&cookie.encode()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

/// 303 redirect carrying a flash cookie
pub(crate) fn redirect_with_flash(location: &str, flash: Flash) -> Response {
    let mut response = Redirect::to(location).into_response();
    append_cookie(&mut response, &flash.to_cookie());
    response
}

/// JSON page response that consumes a pending flash
///
/// The flash (if any) is merged into the body under `"flash"` and its
/// cookie is cleared, so the message shows exactly once.
pub(crate) fn json_page(mut body: serde_json::Value, headers: &HeaderMap) -> Response {
    let cookies = Cookies::from_headers(headers);
    let flash = Flash::from_cookies(&cookies);
    let had_flash_cookie = cookies.get(FLASH_COOKIE).is_some();

    if let serde_json::Value::Object(ref mut map) = body {
        map.insert(
            "flash".to_string(),
            serde_json::to_value(&flash).unwrap_or(serde_json::Value::Null),
        );
    }

    let mut response = Json(body).into_response();
    if had_flash_cookie {
        append_cookie(&mut response, &Flash::clear_cookie());
    }
    response
}
