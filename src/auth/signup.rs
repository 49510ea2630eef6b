use sqlx::PgPool;
use thiserror::Error;
use tracing::error;

use super::password::hash_password;
use super::repo::{User, Workspace};
use super::validate::{
    validate_email, validate_password, validate_workspace_name, ValidationError,
};

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("email already registered")]
    EmailExists,
    #[error("failed to hash password: {0}")]
    Hash(anyhow::Error),
    #[error("signup transaction failed")]
    Transaction(#[source] sqlx::Error),
}

/// Run the whole signup sequence: validation, uniqueness pre-check, password
/// hashing, then user + workspace + membership link in a single transaction.
///
/// Each step is a hard gate; the first failure short-circuits the rest. The
/// transaction rolls back on drop unless committed, so no early return below
/// can leave a partial user/workspace pair behind.
pub async fn signup(
    db: &PgPool,
    email: &str,
    password: &str,
    workspace_name: &str,
) -> Result<(User, Workspace), SignupError> {
    validate_email(email)?;
    validate_password(password)?;
    validate_workspace_name(workspace_name)?;

    let email = email.to_lowercase();

    // Fast-path rejection before paying for the hash. Not race-free: a
    // concurrent signup for the same address is caught at insert time by the
    // unique index instead.
    if User::email_exists(db, &email)
        .await
        .map_err(SignupError::Transaction)?
    {
        return Err(SignupError::EmailExists);
    }

    let password_hash = hash_password(password).map_err(SignupError::Hash)?;

    let mut tx = db.begin().await.map_err(SignupError::Transaction)?;

    let user = User::create(&mut tx, &email, &password_hash)
        .await
        .map_err(map_user_insert_error)?;
    let workspace = Workspace::create(&mut tx, workspace_name)
        .await
        .map_err(SignupError::Transaction)?;
    Workspace::add_member(&mut tx, workspace.id, user.id)
        .await
        .map_err(SignupError::Transaction)?;

    tx.commit().await.map_err(SignupError::Transaction)?;

    Ok((user, workspace))
}

/// A lost race against a concurrent signup surfaces as a unique violation on
/// the email index and must read as "already registered", not a server fault.
fn map_user_insert_error(e: sqlx::Error) -> SignupError {
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => SignupError::EmailExists,
        _ => {
            error!(error = %e, "create user failed");
            SignupError::Transaction(e)
        }
    }
}
