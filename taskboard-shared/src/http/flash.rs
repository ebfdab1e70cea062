/// One-shot flash messages carried in a cookie
///
/// A flash is set by a mutating handler alongside its redirect, then read
/// and cleared by the next request that lists or shows anything. The
/// payload is a small JSON object, matching the wire format the frontend
/// already understands:
///
/// ```json
/// {"kind": "info", "message": "Task created"}
/// ```
///
/// # Example
///
/// ```
/// use taskboard_shared::http::flash::Flash;
///
/// let flash = Flash::info("Task created");
/// let cookie = flash.to_cookie();
/// assert!(cookie.encode().starts_with("flash="));
/// ```

use crate::http::cookies::{Cookie, Cookies};
use serde::{Deserialize, Serialize};

/// Name of the flash cookie
pub const FLASH_COOKIE: &str = "flash";

/// A flash message with a severity kind
///
/// Kinds mirror the alert classes the views use: `info`, `success`,
/// `danger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity: "info", "success" or "danger"
    pub kind: String,

    /// Human-readable message
    pub message: String,
}

impl Flash {
    /// Informational flash (created/updated notices)
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: "info".to_string(),
            message: message.into(),
        }
    }

    /// Success flash (sign in/out, deletions)
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success".to_string(),
            message: message.into(),
        }
    }

    /// Danger flash (access denied, refused deletes)
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: "danger".to_string(),
            message: message.into(),
        }
    }

    /// Serializes the flash into its cookie
    ///
    /// Serialization of this struct cannot fail, so the JSON step is
    /// infallible in practice; an empty payload is the fallback.
    pub fn to_cookie(&self) -> Cookie {
        let payload = serde_json::to_string(self).unwrap_or_default();
        Cookie::new(FLASH_COOKIE, payload).path("/")
    }

    /// Reads the flash out of the request cookies, if present and valid
    ///
    /// A corrupt payload reads as no flash at all.
    pub fn from_cookies(cookies: &Cookies) -> Option<Self> {
        let raw = cookies.get(FLASH_COOKIE)?;
        serde_json::from_str(raw).ok()
    }

    /// Removal cookie that clears a consumed flash
    pub fn clear_cookie() -> Cookie {
        Cookie::removal(FLASH_COOKIE)
    }
}
