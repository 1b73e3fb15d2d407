/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Every user carries exactly one role; there is no per-project
/// membership table.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'member');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Email uniqueness is case-sensitive (plain VARCHAR, not CITEXT); the
/// unique constraint is surfaced to callers as a duplicate-email error at
/// the API boundary.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{CreateUser, User, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::Member,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "jane@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access to every operation
    Admin,

    /// Restricted to projects they own
    Member,
}

impl UserRole {
    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Member => "member",
        }
    }
}

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (unique, case-sensitive)
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Role (admin or member)
    pub role: UserRole,

    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

/// The externally visible projection of a user
///
/// Never includes the password hash. This is the shape returned by every
/// user-facing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role (admin or member)
    pub role: UserRole,

    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address (must be unique)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Role to assign
    pub role: UserRole,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unavailable. The constraint violation
    /// is translated to a duplicate-email validation error at the API
    /// boundary rather than here.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (exact, case-sensitive match)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users in their public projection
    ///
    /// Ordered by creation time, oldest first, with id as tiebreaker so the
    /// ordering is total.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<PublicUser>, sqlx::Error> {
        let users = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, role, created_at
            FROM users
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user and everything that depends on them
    ///
    /// Removes, in dependency order and inside a single transaction:
    ///
    /// 1. activity rows the user authored
    /// 2. activity rows on tasks being removed below
    /// 3. tasks assigned to the user and tasks inside projects they own
    /// 4. projects they own
    /// 5. the user row itself
    ///
    /// Self-deletion is rejected at the API layer, not here.
    ///
    /// # Returns
    ///
    /// True if the user existed and was deleted, false otherwise
    pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM task_activity WHERE changed_by = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM task_activity
            WHERE task_id IN (
                SELECT id FROM tasks
                WHERE assigned_to = $1
                   OR project_id IN (SELECT id FROM projects WHERE created_by = $1)
            )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE assigned_to = $1
               OR project_id IN (SELECT id FROM projects WHERE created_by = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM projects WHERE created_by = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Member.as_str(), "member");
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<UserRole>("\"member\"").unwrap(),
            UserRole::Member
        );
    }

    #[test]
    fn test_public_user_excludes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::Member,
            created_at: Utc::now(),
        };

        let public: PublicUser = user.clone().into();
        let json = serde_json::to_string(&public).unwrap();

        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("test@example.com"));
        assert_eq!(public.id, user.id);
    }

    // Database operations are covered in tests/store_tests.rs
}
