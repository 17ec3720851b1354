use anyhow::Result;
use axum::{
    Router,
    routing::{any, get, post},
};
use reqwest::{
    Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    agent::Completion,
    channels::{FifiChannel, http::state::HTTPState},
    config::HTTPChannelConfig,
};

pub mod models;
pub mod state;

mod api;

pub fn router<C: Completion + 'static>(state: HTTPState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/api/v1/ping", get(api::v1::ping))
        .route("/api/v1/suggestions", get(api::v1::suggestions))
        // session api
        .route("/api/v1/session", post(api::v1::session::create_session::<C>))
        .route(
            "/api/v1/session/{session_id}",
            axum::routing::delete(api::v1::session::delete_session::<C>),
        )
        .route(
            "/api/v1/session/{session_id}/history",
            get(api::v1::session::history::<C>),
        )
        .route(
            "/api/v1/session/{session_id}/message",
            post(api::v1::session::message::<C>),
        )
        .route(
            "/api/v1/session/{session_id}/chat",
            any(api::v1::session::chat::<C>),
        )
        // auth api
        .route(
            "/api/v1/session/{session_id}/signup",
            post(api::v1::auth::signup::<C>),
        )
        .route(
            "/api/v1/session/{session_id}/login",
            post(api::v1::auth::login::<C>),
        )
        .route(
            "/api/v1/session/{session_id}/logout",
            post(api::v1::auth::logout::<C>),
        )
        // profile api
        .route(
            "/api/v1/session/{session_id}/profile",
            get(api::v1::profile::get_profile::<C>).put(api::v1::profile::save_info::<C>),
        )
        .route(
            "/api/v1/session/{session_id}/profile/reminders",
            post(api::v1::profile::add_reminder::<C>),
        )
        .layer(cors)
        .with_state(state)
}

pub struct HTTPChannel<C: Completion> {
    config: HTTPChannelConfig,
    state: HTTPState<C>,
}

impl<C: Completion + 'static> HTTPChannel<C> {
    pub fn new(config: HTTPChannelConfig, state: HTTPState<C>) -> Result<Self> {
        Ok(Self { config, state })
    }
}

impl<C: Completion + 'static> FifiChannel for HTTPChannel<C> {
    async fn run(&mut self) -> Result<()> {
        let app = router(self.state.clone());

        let listener =
            tokio::net::TcpListener::bind(format!("0.0.0.0:{}", self.config.port)).await?;

        log::info!("http listening on port {}", self.config.port);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        agent::{FifiAgents, testing::ScriptedCompletion},
        config::FifiConfig,
        database::{FifiDatabases, chats::ChatArchive, users::Accounts},
    };

    async fn app(replies: Vec<Result<&str, &str>>) -> Router {
        let db = FifiDatabases::in_memory().await.unwrap();
        let agents = FifiAgents::new(
            ScriptedCompletion::new(replies),
            ChatArchive::new(db.clone()),
            &FifiConfig::default(),
        );

        router(HTTPState::new(agents, Accounts::new(db).with_hash_cost(4)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/session", None).await;
        assert_eq!(status, StatusCode::OK);

        body["data"]["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_ping_and_suggestions() {
        let app = app(vec![]).await;

        let (status, body) = send(&app, "GET", "/api/v1/ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "pong");

        let (_, body) = send(&app, "GET", "/api/v1/suggestions", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"][1]["category"], "🤱 Postpartum Recovery");
    }

    #[tokio::test]
    async fn test_message_round_trip() {
        let app = app(vec![Ok("Congratulations!")]).await;
        let session_id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/message"),
            Some(json!({ "content": "I just learned about my pregnancy" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let content = body["data"]["content"].as_str().unwrap();
        assert!(content.starts_with("Congratulations!"));
        assert!(content.contains("What to Expect Each Trimester"));

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/v1/session/{session_id}/history"),
            None,
        )
        .await;
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(body["data"]["authenticated"], false);
        assert_eq!(body["data"]["saved"], false);
    }

    #[tokio::test]
    async fn test_unknown_session_and_empty_message() {
        let app = app(vec![]).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/session/missing/message",
            Some(json!({ "content": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "session not found");

        let session_id = new_session(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/message"),
            Some(json!({ "content": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signup_login_profile_flow() {
        let app = app(vec![]).await;
        let session_id = new_session(&app).await;
        let credentials = json!({ "email": "mom@example.com", "password": "secret-password" });

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/session/{session_id}/profile"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/signup"),
            Some(credentials.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let user_id = body["data"]["user_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/signup"),
            Some(credentials.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/login"),
            Some(json!({ "email": "mom@example.com", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials.");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/login"),
            Some(credentials),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user_id"], user_id.as_str());

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/session/{session_id}/profile"),
            Some(json!({ "pregnancy_weeks": 12 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["profile"]["pregnancy_weeks"], 12);

        let (_, body) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/profile/reminders"),
            Some(json!({ "reminder": "take folic acid" })),
        )
        .await;
        let banners = body["data"]["banners"].as_array().unwrap();
        assert_eq!(banners.len(), 2);
        assert_eq!(banners[1], "⏰ Reminder: take folic acid");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/logout"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["authenticated"], false);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/session/{session_id}/logout"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, "POST", uri, Some(body)).await
    }

    #[tokio::test]
    async fn test_login_as_another_user_does_not_carry_history_over() {
        let app = app(vec![]).await;
        let session_id = new_session(&app).await;
        let a = json!({ "email": "a@example.com", "password": "secret-a" });
        let b = json!({ "email": "b@example.com", "password": "secret-b" });

        for credentials in [&a, &b] {
            let (status, _) = post_json(
                &app,
                &format!("/api/v1/session/{session_id}/signup"),
                credentials.clone(),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let login = format!("/api/v1/session/{session_id}/login");
        let message = format!("/api/v1/session/{session_id}/message");
        post_json(&app, &login, a).await;
        post_json(&app, &message, json!({ "content": "A PRIVATE SECRET" })).await;

        let (status, _) = post_json(&app, &login, b.clone()).await;
        assert_eq!(status, StatusCode::OK);
        post_json(&app, &message, json!({ "content": "hi from b" })).await;

        let other = new_session(&app).await;
        post_json(&app, &format!("/api/v1/session/{other}/login"), b).await;
        let (_, body) = send(&app, "GET", &format!("/api/v1/session/{other}/history"), None).await;

        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "hi from b");
    }

    #[tokio::test]
    async fn test_session_reports_persona_version() {
        let app = app(vec![]).await;

        let (_, body) = send(&app, "POST", "/api/v1/session", None).await;
        assert_eq!(body["data"]["persona_version"], "2025-02");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app(vec![]).await;
        let session_id = new_session(&app).await;

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/session/{session_id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/session/{session_id}/history"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
