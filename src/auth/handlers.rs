use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{SessionResponse, SessionUser, SessionWorkspace, SignupRequest, SignupResponse};
use super::signup::{signup as run_signup, SignupError};

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "malformed signup body");
        ApiError::validation("Invalid request body")
            .with_details(json!({ "message": e.body_text() }))
    })?;

    let (user, workspace) = run_signup(
        &state.db,
        &payload.email,
        &payload.password,
        &payload.workspace_name,
    )
    .await
    .map_err(|e| match e {
        SignupError::Validation(v) => {
            warn!(error = %v, "signup validation failed");
            ApiError::validation(v.to_string())
        }
        SignupError::EmailExists => {
            warn!(email = %payload.email, "email already registered");
            ApiError::email_exists()
        }
        SignupError::Hash(_) | SignupError::Transaction(_) => {
            error!(error = %e, "signup failed");
            ApiError::internal()
        }
    })?;

    // The user and workspace are committed by now; if cookie signing fails the
    // client sees a 500 while the rows remain. Ordering kept on purpose.
    let cookie = state
        .sessions
        .issue(user.id, &user.email, workspace.id)
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "session issuance failed");
            ApiError::session()
        })?;

    info!(user_id = user.id, workspace_id = workspace.id, "user signed up");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((
        StatusCode::CREATED,
        headers,
        Json(SignupResponse::new(&user, &workspace)),
    ))
}

#[instrument(skip(state, headers))]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .sessions
        .read(&headers)
        .ok_or_else(ApiError::unauthenticated)?;

    Ok(Json(SessionResponse {
        authenticated: true,
        user: SessionUser {
            id: session.user_id,
            email: session.email,
        },
        workspace: SessionWorkspace {
            id: session.workspace_id,
        },
    }))
}
