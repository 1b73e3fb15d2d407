/// Authentication and authorization utilities
///
/// This module provides the security primitives for Taskboard:
///
/// - `jwt`: JWT token generation and validation (HS256)
/// - `password`: Password hashing with Argon2id
/// - `principal`: The authenticated principal passed through service calls
/// - `policy`: Pure role/ownership permission checks
///
/// Authentication (who is calling) happens once at the middleware layer in
/// the API crate and produces a [`principal::CurrentUser`]. Authorization
/// (may they do this) is decided by the pure functions in [`policy`], which
/// never touch the database.

pub mod jwt;
pub mod password;
pub mod policy;
pub mod principal;
