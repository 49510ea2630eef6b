use axum::routing::get;
use axum::{Json, Router};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::state::AppState;

const FUNNY_MESSAGES: &[&str] = &[
    "I would tell you a UDP joke, but you might not get it.",
    "There are 10 types of people: those who understand binary and those who don't.",
    "Programming is 10% writing code and 90% figuring out why it doesn't work.",
    "Bug? That's not a bug, it's an undocumented feature!",
    "Why do programmers prefer dark mode? Because light attracts bugs!",
    "It works on my machine! \u{af}\\_(\u{30c4})_/\u{af}",
    "Roses are red, violets are blue, unexpected '{' on line 32.",
    "I'm not lazy, I'm just in energy-saving mode.",
];

#[derive(Debug, Serialize)]
pub struct HelloWorldResponse {
    pub message: String,
    pub funny_message: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/hello_world", get(hello_world))
}

async fn hello_world() -> Json<HelloWorldResponse> {
    let funny = FUNNY_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default();

    Json(HelloWorldResponse {
        message: "hello world".to_string(),
        funny_message: funny.to_string(),
    })
}
