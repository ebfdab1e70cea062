/// Authentication utilities
///
/// This module provides the authentication primitives for Taskboard:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: HMAC-signed session cookie, built by hand (no session
///   plugin) plus the `CurrentUser` extractor
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Sessions**: HMAC-SHA256 signed cookie with expiry baked into the
///   signed payload
/// - **Constant-time Comparison**: All verification uses constant-time
///   operations

pub mod password;
pub mod session;
