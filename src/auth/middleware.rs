use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::{verify_token, TokenType};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Authenticated user if a valid bearer token is present; `None`
/// otherwise. Used by the map endpoint, which answers anonymous
/// requests with empty data instead of 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn resolve_user(req: &Request, state: &AppState) -> Result<AuthUser, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, &state.config)?;

    if token_data.claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthUser {
        id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = resolve_user(&req, &state)?;
    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let maybe = MaybeAuthUser(resolve_user(&req, &state).ok());
    req.extensions_mut().insert(maybe);
    Ok(next.run(req).await)
}
