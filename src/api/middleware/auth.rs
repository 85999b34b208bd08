use crate::AppState;
use crate::api::error::AppError;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Gate for admin routes. Accepts a `Bearer` token signed with the
/// configured secret and confirms the admin account still exists.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    if let Some(token) = token {
        if let Ok(claims) = validate_jwt(&token, &state.config.jwt_secret) {
            let user_exists: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE id = ?")
                    .bind(&claims.sub)
                    .fetch_one(&state.db)
                    .await?;

            if user_exists > 0 {
                req.extensions_mut().insert(claims);
                return Ok(next.run(req).await);
            }
        }
    }

    Err(AppError::Unauthorized("Unauthorized".to_string()))
}
