use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use impersonation::{ImpersonationClaims, ImpersonationError, ImpersonationGrant};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ImpersonateRequest, ImpersonateResponse, VerifyTokenRequest},
};
use tracing::{error, info};

use crate::app_state::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn impersonate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImpersonateRequest>, JsonRejection>,
) -> ApiResult<ImpersonateResponse> {
    let Json(req) = payload.map_err(malformed)?;
    let (Some(user_id), Some(bar_id)) = (req.impersonated_user_id, req.bar_id) else {
        return Err(validation("impersonated_user_id and bar_id are required"));
    };
    let role = req
        .impersonated_user_role
        .ok_or_else(|| validation("impersonated_user_role is required"))?;

    let grant = ImpersonationGrant::new(user_id, req.impersonated_user_email, role)
        .for_bar(bar_id)
        .expires_in(
            req.expires_in
                .unwrap_or_else(|| state.default_expires_in.clone()),
        );

    let signed = state.tokens.issue(&grant).map_err(reject)?;
    info!(
        %user_id,
        %bar_id,
        role = %grant.role,
        expires_at = %signed.expires_at,
        "issued impersonation token"
    );
    Ok(Json(ImpersonateResponse {
        token: signed.token,
        expires_at: signed.expires_at,
    }))
}

pub(crate) async fn verify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> ApiResult<ImpersonationClaims> {
    let Json(req) = payload.map_err(malformed)?;
    state.tokens.verify(&req.token).map(Json).map_err(reject)
}

fn validation(message: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

/// Body that fails to parse (bad ids, empty role, not JSON) is a validation error.
fn malformed(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    validation(&rejection.body_text())
}

fn reject(err: ImpersonationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ImpersonationError::Configuration(message) => {
            error!(%message, "impersonation endpoint misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, message)),
            )
        }
        ImpersonationError::InvalidExpiry { .. } => validation(&err.to_string()),
        ImpersonationError::InvalidToken(_) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new(ErrorCode::Unauthorized, err.to_string())),
        ),
        ImpersonationError::Signing(_) => {
            error!(%err, "token signing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, err.to_string())),
            )
        }
    }
}
