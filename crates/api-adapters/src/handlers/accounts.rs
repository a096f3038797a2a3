use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use domains::{Requester, User};
use services::{Login, Signup};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Signup>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(input) = payload?;
    let user = state.services.accounts.signup(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(input) = payload?;
    let token = state.services.accounts.login(input).await?;
    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: "Bearer",
        expires_in: token.expires_in,
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.accounts.profile(&requester).await?))
}
