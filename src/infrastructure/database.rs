use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<SqlitePool> {
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    info!("📂 Database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&db_url)
        .await?;

    info!("✅ Database connected successfully");
    info!("🔄 Running migrations...");

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
