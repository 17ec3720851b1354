use reqwest::StatusCode;

use crate::{
    augment::topics::{SUGGESTED_QUESTIONS, SuggestedQuestions},
    channels::http::models::{self, response::api_response},
};

pub mod auth;
pub mod profile;
pub mod session;

pub async fn ping() -> models::response::Response<String> {
    api_response(StatusCode::OK, "pong".into())
}

pub async fn suggestions() -> models::response::Response<Vec<SuggestedQuestions>> {
    api_response(StatusCode::OK, SUGGESTED_QUESTIONS.to_vec())
}
