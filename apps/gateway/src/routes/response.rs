// [apps/gateway/src/routes/response.rs]
//! The one success envelope every handler returns: `{success, data?, message?}`.
//! Failure envelopes are produced by `ApiError`'s own `IntoResponse` impl.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct Envelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(Envelope { success: true, data: serde_json::to_value(data).ok(), message: None }).into_response()
}

pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    Json(Envelope { success: true, data: serde_json::to_value(data).ok(), message: Some(message.into()) }).into_response()
}

pub fn ok_message(message: impl Into<String>) -> Response {
    Json(Envelope { success: true, data: None, message: Some(message.into()) }).into_response()
}
