use std::env;

/// Runtime configuration for the studio backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Secret used to sign admin bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in hours (default: 24)
    pub token_ttl_hours: i64,

    /// Public base URL under which bucket objects are reachable
    pub public_base_url: String,

    /// Storage backend: "s3" or "memory" (default: "s3")
    pub storage_backend: String,

    /// Maximum upload size in bytes (default: 25 MB)
    pub max_upload_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
            public_base_url: "http://localhost:9000/studio-images".to_string(),
            storage_backend: "s3".to_string(),
            max_upload_size: 25 * 1024 * 1024, // 25 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.token_ttl_hours),

            public_base_url: env::var("PUBLIC_BUCKET_URL").unwrap_or(default.public_base_url),

            storage_backend: env::var("STORAGE_BACKEND").unwrap_or(default.storage_backend),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
        }
    }

    /// Create config for development and tests (in-memory storage)
    pub fn development() -> Self {
        Self {
            jwt_secret: "dev-secret".to_string(),
            storage_backend: "memory".to_string(),
            ..Self::default()
        }
    }
}
