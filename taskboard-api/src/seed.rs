/// Admin seed bootstrap
///
/// Creates an initial admin account at startup when `SEED_ADMIN_EMAIL` and
/// `SEED_ADMIN_PASSWORD` are configured, so a fresh deployment has a way to
/// log in and create further users. Idempotent: if a user with the
/// configured email already exists, nothing happens.

use sqlx::PgPool;
use taskboard_shared::auth::password;
use taskboard_shared::models::user::{CreateUser, User, UserRole};
use tracing::{debug, info};

use crate::config::SeedConfig;

/// Ensures the configured admin account exists
///
/// # Errors
///
/// Returns an error if hashing or the insert fails; a pre-existing account
/// is not an error.
pub async fn bootstrap_admin(pool: &PgPool, seed: &SeedConfig) -> anyhow::Result<()> {
    let (Some(email), Some(admin_password)) = (&seed.admin_email, &seed.admin_password) else {
        debug!("Admin seed not configured, skipping bootstrap");
        return Ok(());
    };

    if User::find_by_email(pool, email).await?.is_some() {
        debug!(email = %email, "Admin seed user already exists");
        return Ok(());
    }

    let password_hash = password::hash_password(admin_password)?;

    let user = User::create(
        pool,
        CreateUser {
            name: seed.admin_name.clone(),
            email: email.clone(),
            password_hash,
            role: UserRole::Admin,
        },
    )
    .await?;

    info!(email = %user.email, id = %user.id, "Seeded admin user");
    Ok(())
}
