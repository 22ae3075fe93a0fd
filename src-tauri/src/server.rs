//! Local HTTP control surface for the browser add-in.
//!
//! Read-only routes answer from the shared capture list. Capture and export
//! are queued to the app over a channel and acknowledged immediately; the
//! add-in polls `/screenshots` to see the result.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::capture::{encode_png, ScreenshotSummary, SharedCaptureList};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Work the HTTP surface hands to the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Capture,
    ExportPdf,
}

#[derive(Clone)]
pub struct ServerState {
    pub shots: SharedCaptureList,
    pub actions: mpsc::UnboundedSender<ControlAction>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ScreenshotsResponse {
    pub success: bool,
    pub screenshots: Vec<ScreenshotSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Screenshot not found")]
    NotFound,

    #[error("App is shutting down")]
    Unavailable,

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ActionResponse {
                    success: false,
                    message: self.to_string(),
                }),
            )
                .into_response(),
            ApiError::Internal(message) => {
                log::error!("HTTP request failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "Shot-to-PDF server running",
    })
}

fn queue(
    state: &ServerState,
    action: ControlAction,
    message: &str,
) -> Result<Json<ActionResponse>, ApiError> {
    state.actions.send(action).map_err(|_| ApiError::Unavailable)?;
    log::info!("Queued {:?} from HTTP", action);
    Ok(Json(ActionResponse {
        success: true,
        message: message.to_string(),
    }))
}

async fn capture(State(state): State<ServerState>) -> Result<Json<ActionResponse>, ApiError> {
    queue(&state, ControlAction::Capture, "Screenshot capture started")
}

async fn export_pdf(State(state): State<ServerState>) -> Result<Json<ActionResponse>, ApiError> {
    queue(&state, ControlAction::ExportPdf, "Sent to pdf")
}

async fn list_screenshots(
    State(state): State<ServerState>,
) -> Result<Json<ScreenshotsResponse>, ApiError> {
    let shots = state
        .shots
        .lock()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(ScreenshotsResponse {
        success: true,
        screenshots: shots.summaries(),
    }))
}

async fn get_screenshot(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = {
        let shots = state
            .shots
            .lock()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        shots.get(&id).map(|s| s.image.clone()).ok_or(ApiError::NotFound)?
    };

    let png = encode_png(&image).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, HeaderValue::from_static("image/png"))], png).into_response())
}

pub fn create_router(state: ServerState) -> Router<()> {
    // The add-in runs on a different origin than this listener. Every
    // OPTIONS request is answered here as a preflight.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // CorsLayer only sends the allow-lists on preflights; the add-in expects
    // them on every response.
    Router::new()
        .route("/status", get(status))
        .route("/capture", post(capture))
        .route("/screenshots", get(list_screenshots))
        .route("/screenshot/:id", get(get_screenshot))
        .route("/export-pdf", post(export_pdf))
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(cors)
}

/// Serves the control surface on `127.0.0.1:port` until the app exits.
pub async fn serve(state: ServerState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("HTTP control server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await
}
