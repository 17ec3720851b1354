use axum::{
    Json,
    extract::{Path, State},
};
use reqwest::StatusCode;

use crate::{
    agent::Completion,
    channels::http::{
        models::{
            self,
            response::{api_response, err_response, fifi_err_response, session_not_found},
            session::{ProfileResponse, ReminderRequest, SaveInfoRequest},
        },
        state::HTTPState,
    },
    database::schema::UserProfile,
    error::FifiError,
};

async fn signed_in_user<C: Completion + 'static>(
    state: &HTTPState<C>,
    session_id: &str,
) -> Result<String, models::response::Response<ProfileResponse>> {
    let Some(session) = state.get(session_id).await else {
        return Err(session_not_found());
    };

    let session = session.lock().await;
    match session.user_id() {
        Some(user_id) => Ok(user_id.to_string()),
        None => Err(err_response(
            StatusCode::UNAUTHORIZED,
            "sign in to use your profile".into(),
        )),
    }
}

fn profile_response(
    result: Result<UserProfile, FifiError>,
) -> models::response::Response<ProfileResponse> {
    match result {
        Ok(profile) => api_response(StatusCode::OK, profile.into()),
        Err(err) => fifi_err_response(StatusCode::BAD_REQUEST, err),
    }
}

pub async fn get_profile<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
) -> models::response::Response<ProfileResponse> {
    let user_id = match signed_in_user(&state, &session_id).await {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    profile_response(state.accounts.profile(&user_id).await)
}

pub async fn save_info<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
    Json(request): Json<SaveInfoRequest>,
) -> models::response::Response<ProfileResponse> {
    let user_id = match signed_in_user(&state, &session_id).await {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    profile_response(
        state
            .accounts
            .save_info(&user_id, request.pregnancy_weeks, request.baby_age_months)
            .await,
    )
}

pub async fn add_reminder<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
    Json(request): Json<ReminderRequest>,
) -> models::response::Response<ProfileResponse> {
    let user_id = match signed_in_user(&state, &session_id).await {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    profile_response(state.accounts.add_reminder(&user_id, &request.reminder).await)
}
