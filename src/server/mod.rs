//! HTTP chat surface.
//!
//! Serves one embedded chat page and two submit endpoints. History
//! round-trips through every request; the only state held here is the
//! engine with its one-time-loaded model handles.

pub mod protocol;

use crate::chat::engine::ChatEngine;
use crate::chat::history::History;
use crate::error::{Result, SalesqlError};
use crate::server::protocol::{ChatResponse, ErrorResponse, TextRequest};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use std::io::Write;
use tower_http::cors::CorsLayer;

/// Uploaded audio cap. A 30s 16-bit mono recording at 48kHz is under 3MB;
/// 32MB leaves headroom for uncompressed stereo captures.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the router for the chat surface.
pub fn router(engine: ChatEngine) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/chat/text", post(submit_text))
        .route("/api/chat/audio", post(submit_audio))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

/// Bind and serve until the process exits.
pub async fn serve(engine: ChatEngine, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SalesqlError::Server {
            message: format!("Failed to bind {addr}: {e}"),
        })?;

    eprintln!("salesql chat on http://{addr}");

    axum::serve(listener, router(engine))
        .await
        .map_err(|e| SalesqlError::Server {
            message: e.to_string(),
        })
}

async fn index() -> Html<&'static str> {
    Html(include_str!("chat.html"))
}

async fn submit_text(
    State(engine): State<ChatEngine>,
    Json(request): Json<TextRequest>,
) -> Response {
    match engine.submit_text(&request.message, request.history).await {
        Ok((reply, history)) => Json(ChatResponse {
            transcript: None,
            reply,
            history,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn submit_audio(State(engine): State<ChatEngine>, mut multipart: Multipart) -> Response {
    let mut history = History::new();
    let mut audio: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return bad_request(format!("Malformed multipart body: {e}"));
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("history") => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(e) => return bad_request(format!("Failed to read history field: {e}")),
                };
                history = match serde_json::from_str(&text) {
                    Ok(history) => history,
                    Err(e) => return bad_request(format!("Invalid history JSON: {e}")),
                };
            }
            Some("audio") => {
                audio = match field.bytes().await {
                    Ok(bytes) => Some(bytes.to_vec()),
                    Err(e) => return bad_request(format!("Failed to read audio field: {e}")),
                };
            }
            _ => {}
        }
    }

    let Some(audio) = audio else {
        return bad_request("Missing 'audio' field".to_string());
    };

    // The transcription adapter takes a file path, so spool the upload to a
    // temp WAV the same way the browser-recorder-to-filepath flow works.
    let temp = match spool_upload(&audio) {
        Ok(temp) => temp,
        Err(e) => return error_response(e),
    };

    match engine.submit_audio(temp.path(), history).await {
        Ok((transcript, reply, history)) => Json(ChatResponse {
            transcript: Some(transcript),
            reply,
            history,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn spool_upload(audio: &[u8]) -> Result<tempfile::NamedTempFile> {
    let mut temp = tempfile::Builder::new()
        .prefix("salesql-upload-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| SalesqlError::Server {
            message: format!("Failed to create temp file: {e}"),
        })?;
    temp.write_all(audio).map_err(|e| SalesqlError::Server {
        message: format!("Failed to spool upload: {e}"),
    })?;
    Ok(temp)
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
}

/// Engine failures surface as 500 with the error text; there is no retry or
/// classification into transient vs permanent here.
fn error_response(e: SalesqlError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}
