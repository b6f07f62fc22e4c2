//! Response rendering.
//!
//! # Responsibilities
//! - Render handler replies as HTTP responses
//! - Render terminal routing outcomes as JSON failure envelopes
//!
//! # Design Decisions
//! - Failures are `{"status": "fail", "message": ...}`, never bare status pages
//! - Redirect replies use 303 See Other

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};

use crate::dispatch::Reply;

pub const NOT_FOUND_MESSAGE: &str = "Endpoint not found.";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access. Please log in.";

/// JSON failure envelope with the given status.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({
        "status": "fail",
        "message": message.into(),
    });
    (status, Json(body)).into_response()
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(value) => Json(value).into_response(),
            Reply::Html(body) => Html(body).into_response(),
            Reply::Redirect(location) => Redirect::to(&location).into_response(),
        }
    }
}
