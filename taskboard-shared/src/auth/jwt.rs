/// JWT token generation and validation module
///
/// This module provides JWT (JSON Web Token) functionality for user
/// authentication. Tokens are signed using HS256 (HMAC-SHA256) and carry the
/// full identity the rest of the system needs: user id, email, and role.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Configurable (default 24 hours)
/// - **Validation**: Signature, expiration, not-before, and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, "admin@example.com".to_string(), UserRole::Admin);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Token issuer baked into every claim set
const ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskboard")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: User email at issue time
/// - `role`: User role at issue time (admin or member)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// User email (custom claim)
    pub email: String,

    /// User role (custom claim)
    pub role: UserRole,
}

impl Claims {
    /// Creates new claims with the default 24 hour expiration
    pub fn new(user_id: Uuid, email: String, role: UserRole) -> Self {
        Self::with_expiration(user_id, email, role, Duration::hours(24))
    }

    /// Creates claims with a custom expiration
    ///
    /// # Example
    ///
    /// ```
    /// use taskboard_shared::auth::jwt::Claims;
    /// use taskboard_shared::models::user::UserRole;
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(
    ///     Uuid::new_v4(),
    ///     "user@example.com".to_string(),
    ///     UserRole::Member,
    ///     Duration::hours(1),
    /// );
    /// ```
    pub fn with_expiration(
        user_id: Uuid,
        email: String,
        role: UserRole,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            email,
            role,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 (HMAC-SHA256) with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "taskboard"
/// - Token is not used before its nbf time
///
/// # Errors
///
/// Returns an error if the signature is invalid, the token has expired, or
/// the issuer does not match.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();

        let claims = Claims::new(user_id, "user@example.com".to_string(), UserRole::Member);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, UserRole::Member);
        assert_eq!(claims.iss, "taskboard");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();

        let claims = Claims::new(user_id, "admin@example.com".to_string(), UserRole::Admin);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.email, "admin@example.com");
        assert_eq!(validated.role, UserRole::Admin);
        assert_eq!(validated.iss, "taskboard");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "u@example.com".to_string(), UserRole::Member);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "wrong-secret-key-also-32-bytes-long");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "u@example.com".to_string(),
            UserRole::Member,
            Duration::seconds(-3600),
        );

        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_tampered_token() {
        let claims = Claims::new(Uuid::new_v4(), "u@example.com".to_string(), UserRole::Member);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let mut tampered = token.clone();
        tampered.push('x');

        assert!(validate_token(&tampered, SECRET).is_err());
    }
}
