use axum::Json;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::FifiError;

pub type Response<T> = (StatusCode, Json<APIResponse<T>>);

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct APIResponse<T: Serialize + Clone> {
    pub status: u16,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize + Clone> APIResponse<T> {
    fn new(status: StatusCode, response: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            data: response,
            message: None,
        }
    }

    fn err(status: StatusCode, err: String) -> Self {
        Self {
            status: status.as_u16(),
            data: None,
            message: Some(err),
        }
    }
}

pub fn api_response<T: Serialize + Clone>(
    status: StatusCode,
    response: T,
) -> (StatusCode, Json<APIResponse<T>>) {
    (status, Json(APIResponse::new(status, Some(response))))
}

pub fn err_response<T: Serialize + Clone>(
    status: StatusCode,
    err: String,
) -> (StatusCode, Json<APIResponse<T>>) {
    (status, Json(APIResponse::err(status, err)))
}

/// `auth_status` is used for auth failures, which differ per endpoint
pub fn fifi_err_response<T: Serialize + Clone>(
    auth_status: StatusCode,
    err: FifiError,
) -> (StatusCode, Json<APIResponse<T>>) {
    let status = match err {
        FifiError::Auth(_) => auth_status,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    err_response(status, err.details().to_string())
}

pub fn session_not_found<T: Serialize + Clone>() -> (StatusCode, Json<APIResponse<T>>) {
    err_response(StatusCode::NOT_FOUND, "session not found".into())
}
