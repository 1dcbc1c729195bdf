// store/seed.rs
// First-run bootstrap: a fresh store gets one admin account from
// configuration so the instance is reachable before anyone can register.

use anyhow::{Context, Result};

use crate::auth::hash_password;
use crate::config::Config;
use crate::models::{User, UserRole, UserStatus};
use crate::store::Store;

/// Seed only when the store has no accounts at all. An existing deployment
/// keeps its users untouched even if the configured admin changed.
pub async fn ensure_admin(store: &Store, config: &Config) -> Result<()> {
    let count = store
        .users
        .count()
        .await
        .context("failed to count user accounts")?;
    if count > 0 {
        return Ok(());
    }

    let password_hash =
        hash_password(&config.admin_password).context("failed to hash admin password")?;
    let admin = User {
        id: None,
        name: config.admin_name.clone(),
        email: config.admin_email.clone(),
        password_hash,
        role: UserRole::Admin,
        status: UserStatus::Active,
        created_at: None,
        updated_at: None,
    };
    let admin = store
        .users
        .insert(admin)
        .await
        .context("failed to seed admin account")?;
    tracing::info!(email = %admin.email, "seeded initial admin account");
    Ok(())
}
