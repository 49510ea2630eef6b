use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod session;
pub mod signup;
mod validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/session", get(handlers::session))
}
