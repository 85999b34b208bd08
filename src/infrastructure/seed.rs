use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::Argon2;
use chrono::Utc;
use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};
use uuid::Uuid;

/// Provisions the admin account on boot when `ADMIN_PASSWORD` is set.
/// Does nothing if the username already exists, so restarting never
/// overwrites a live credential.
pub async fn seed_admin_user(pool: &SqlitePool) -> anyhow::Result<()> {
    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE username = ?")
        .bind(&username)
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(());
    }

    let password = match env::var("ADMIN_PASSWORD") {
        Ok(p) => p,
        Err(_) => {
            warn!("⚠️  ADMIN_PASSWORD not set; no admin user seeded");
            return Ok(());
        }
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?
        .to_string();

    sqlx::query(
        "INSERT INTO admin_users (id, username, password_hash, email, last_login) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&username)
    .bind(&password_hash)
    .bind(env::var("ADMIN_EMAIL").unwrap_or_default())
    .bind(None::<chrono::DateTime<Utc>>)
    .execute(pool)
    .await?;

    info!("🌱 Seeded admin user '{}'", username);

    Ok(())
}
