use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::repo::{User, Workspace};

/// Request body for signup. No Debug impl: the plaintext password must never
/// end up in logs.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub workspace_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Response returned after a successful signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: UserResponse,
    pub workspace: WorkspaceResponse,
    pub message: String,
}

impl SignupResponse {
    pub fn new(user: &User, workspace: &Workspace) -> Self {
        Self {
            user: UserResponse {
                id: user.id,
                email: user.email.clone(),
                created_at: format_timestamp(user.created_at),
                updated_at: format_timestamp(user.updated_at),
            },
            workspace: WorkspaceResponse {
                id: workspace.id,
                name: workspace.name.clone(),
                created_at: format_timestamp(workspace.created_at),
                updated_at: format_timestamp(workspace.updated_at),
            },
            message: "Account created successfully".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SessionWorkspace {
    pub id: i64,
}

/// Response for the session read endpoint.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: SessionUser,
    pub workspace: SessionWorkspace,
}

static TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Wire format for timestamps: whole seconds, always UTC.
pub(crate) fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.to_offset(UtcOffset::UTC)
        .format(&TIMESTAMP_FORMAT)
        .expect("UTC timestamp formats")
}
