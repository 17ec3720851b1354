use axum::{
    Json,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
};
use futures::{SinkExt, StreamExt};
use reqwest::StatusCode;

use crate::{
    agent::Completion,
    channels::http::{
        models::{
            self,
            response::{api_response, err_response, session_not_found},
            session::{ChatRequest, ChatResponse, HistoryResponse, SessionResponse},
        },
        state::{HTTPState, SharedSession},
    },
};

pub async fn create_session<C: Completion + 'static>(
    State(state): State<HTTPState<C>>,
) -> models::response::Response<SessionResponse> {
    let session = state.agents.open_session(None).await;
    let session_id = session.id.clone();
    state.insert(session).await;

    log::debug!("session {} created", session_id);
    api_response(
        StatusCode::OK,
        SessionResponse {
            session_id,
            authenticated: false,
            persona_version: state.agents.persona_version().to_string(),
        },
    )
}

pub async fn delete_session<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
) -> models::response::Response<SessionResponse> {
    let Some(session) = state.remove(&session_id).await else {
        return session_not_found();
    };

    let session = session.lock().await;
    api_response(
        StatusCode::OK,
        SessionResponse {
            session_id,
            authenticated: session.is_authenticated(),
            persona_version: state.agents.persona_version().to_string(),
        },
    )
}

pub async fn history<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
) -> models::response::Response<HistoryResponse> {
    let Some(session) = state.get(&session_id).await else {
        return session_not_found();
    };

    let session = session.lock().await;
    api_response(
        StatusCode::OK,
        HistoryResponse {
            session_id,
            authenticated: session.is_authenticated(),
            saved: session.is_persistent(),
            messages: session.conversation().visible(),
        },
    )
}

pub async fn message<C: Completion + 'static>(
    Path(session_id): Path<String>,
    State(state): State<HTTPState<C>>,
    Json(request): Json<ChatRequest>,
) -> models::response::Response<ChatResponse> {
    if request.content.trim().is_empty() {
        return err_response(StatusCode::BAD_REQUEST, "message is empty".into());
    }

    let Some(session) = state.get(&session_id).await else {
        return session_not_found();
    };

    let mut session = session.lock().await;
    let content = state.agents.handle_turn(&mut session, &request.content).await;

    api_response(
        StatusCode::OK,
        ChatResponse {
            content,
            thinking: false,
        },
    )
}

pub async fn chat<C: Completion + 'static>(
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<HTTPState<C>>,
) -> axum::response::Response {
    log::debug!("connect {}", session_id);
    if let Some(session) = state.get(&session_id).await {
        return ws.on_upgrade(move |socket| handle_socket(socket, state, session));
    }

    axum::response::Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body("not found".into())
        .unwrap_or_default()
}

async fn send_json(
    writer: &mut futures::stream::SplitSink<WebSocket, Message>,
    response: ChatResponse,
) -> bool {
    let Ok(text) = serde_json::to_string(&response) else {
        return false;
    };

    writer.send(Message::Text(text.into())).await.is_ok()
}

pub async fn handle_socket<C: Completion + 'static>(
    socket: WebSocket,
    state: HTTPState<C>,
    session: SharedSession,
) {
    let (mut writer, mut reader) = socket.split();

    while let Some(Ok(message)) = reader.next().await {
        match message {
            Message::Text(text) => {
                let Ok(request) = serde_json::from_str::<ChatRequest>(text.as_str()) else {
                    log::debug!("ignoring malformed chat request: {}", text.as_str());
                    continue;
                };
                if request.content.trim().is_empty() {
                    continue;
                }

                let thinking = ChatResponse {
                    thinking: true,
                    ..Default::default()
                };
                if !send_json(&mut writer, thinking).await {
                    break;
                }

                let content = {
                    let mut session = session.lock().await;
                    state.agents.handle_turn(&mut session, &request.content).await
                };

                let reply = ChatResponse {
                    content,
                    thinking: false,
                };
                if !send_json(&mut writer, reply).await {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}
