/// Hand-rolled HTTP cookie plumbing
///
/// Taskboard deliberately avoids a framework session plugin. This module
/// decodes the `Cookie` request header and produces `Set-Cookie` values,
/// and layers the flash-message cookie on top.
///
/// # Modules
///
/// - [`cookies`]: Cookie parsing and serialization
/// - [`flash`]: One-shot flash messages carried in a cookie

pub mod cookies;
pub mod flash;
