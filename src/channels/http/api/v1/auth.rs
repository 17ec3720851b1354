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
            session::{AuthResponse, CredentialsRequest, SessionResponse},
        },
        state::HTTPState,
    },
};

/// Creates the account only; the user logs in afterwards.
pub async fn signup<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
    Json(request): Json<CredentialsRequest>,
) -> models::response::Response<AuthResponse> {
    if state.get(&session_id).await.is_none() {
        return session_not_found();
    }

    match state.accounts.sign_up(&request.email, &request.password).await {
        Ok(user_id) => api_response(StatusCode::CREATED, AuthResponse { user_id }),
        Err(err) => fifi_err_response(StatusCode::BAD_REQUEST, err),
    }
}

pub async fn login<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
    Json(request): Json<CredentialsRequest>,
) -> models::response::Response<AuthResponse> {
    let Some(session) = state.get(&session_id).await else {
        return session_not_found();
    };

    let user_id = match state.accounts.login(&request.email, &request.password).await {
        Ok(user_id) => user_id,
        Err(err) => return fifi_err_response(StatusCode::UNAUTHORIZED, err),
    };

    let mut session = session.lock().await;
    state.agents.attach_user(&mut session, user_id.clone()).await;

    api_response(StatusCode::OK, AuthResponse { user_id })
}

pub async fn logout<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
) -> models::response::Response<SessionResponse> {
    let Some(session) = state.get(&session_id).await else {
        return session_not_found();
    };

    let mut session = session.lock().await;
    if !session.is_authenticated() {
        return err_response(StatusCode::UNAUTHORIZED, "not signed in".into());
    }
    state.agents.detach_user(&mut session);

    api_response(
        StatusCode::OK,
        SessionResponse {
            session_id,
            authenticated: false,
            persona_version: state.agents.persona_version().to_string(),
        },
    )
}
