use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;
use wsp_core::{LoginBody, RequestContext, Validate};

use crate::auth::{verify_password, AuthError};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `POST /auth`: exchange credentials for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    state.count_request("auth");
    let Json(body) = body?;
    let credentials = body.validate(chrono::Utc::now())?;

    let user = state
        .users()
        .find_user(&credentials.login)
        .await?
        .ok_or_else(|| AuthError::UnknownUser(credentials.login.clone()))?;

    if !verify_password(credentials.password, user.password_hash.clone()).await? {
        return Err(AuthError::WrongPassword.into());
    }

    let access_token = state.tokens().issue(&user)?;
    info!(request_id = %ctx.request_id(), user = %user.login, role = %user.role, "token issued");

    Ok(Json(TokenResponse { access_token }))
}
