//! Integration tests for the local HTTP control surface.
//!
//! Drives the router directly with `oneshot`; queued actions are read back
//! from the receiving end of the channel.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Local;
use image::{Rgba, RgbaImage};
use serde_json::Value;
use shot_to_pdf_lib::capture::{CaptureList, SharedCaptureList};
use shot_to_pdf_lib::server::{create_router, ControlAction, ServerState};
use tokio::sync::mpsc;
use tower::ServiceExt;

fn test_app() -> (Router, SharedCaptureList, mpsc::UnboundedReceiver<ControlAction>) {
    let shots = CaptureList::shared();
    let (tx, rx) = mpsc::unbounded_channel();
    let router = create_router(ServerState {
        shots: shots.clone(),
        actions: tx,
    });
    (router, shots, rx)
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, "https://localhost:3000")
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_reports_ok() {
    let (app, _, _rx) = test_app();
    let response = app.oneshot(request(Method::GET, "/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

// ── CORS ────────────────────────────────────────────────────────────

fn assert_full_cors(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn plain_get_carries_cors_allow_lists() {
    let (app, _, _rx) = test_app();
    let response = app.oneshot(request(Method::GET, "/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_full_cors(&response);
}

#[tokio::test]
async fn post_and_error_responses_carry_cors_allow_lists() {
    let (app, _, _rx) = test_app();
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/capture"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_full_cors(&response);

    let response = app
        .oneshot(request(Method::GET, "/screenshot/missing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_full_cors(&response);
}

#[tokio::test]
async fn preflight_allows_add_in_origin() {
    let (app, _, _rx) = test_app();
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/capture")
        .header(header::ORIGIN, "https://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(preflight).await.unwrap();
    assert!(response.status().is_success());

    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
}

// ── Queued actions ──────────────────────────────────────────────────

#[tokio::test]
async fn capture_is_queued() {
    let (app, _, mut rx) = test_app();
    let response = app.oneshot(request(Method::POST, "/capture")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(rx.try_recv().unwrap(), ControlAction::Capture);
}

#[tokio::test]
async fn export_is_queued() {
    let (app, _, mut rx) = test_app();
    let response = app
        .oneshot(request(Method::POST, "/export-pdf"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sent to pdf");
    assert_eq!(rx.try_recv().unwrap(), ControlAction::ExportPdf);
}

#[tokio::test]
async fn actions_rejected_once_app_is_gone() {
    let (app, _, rx) = test_app();
    drop(rx);

    let response = app.oneshot(request(Method::POST, "/capture")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn capture_requires_post() {
    let (app, _, mut rx) = test_app();
    let response = app.oneshot(request(Method::GET, "/capture")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(rx.try_recv().is_err());
}

// ── Listing and fetching ────────────────────────────────────────────

#[tokio::test]
async fn screenshots_listed_in_capture_order() {
    let (app, shots, _rx) = test_app();
    {
        let mut list = shots.lock().unwrap();
        list.push(RgbaImage::new(40, 30), Local::now());
        list.push(RgbaImage::new(12, 8), Local::now());
    }

    let response = app
        .oneshot(request(Method::GET, "/screenshots"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let listed = body["screenshots"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["width"], 40);
    assert_eq!(listed[0]["height"], 30);
    assert_eq!(listed[1]["width"], 12);
    assert!(listed[0]["id"].as_str().unwrap().len() >= 19);
    assert!(listed[0]["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn empty_list_is_not_an_error() {
    let (app, _, _rx) = test_app();
    let response = app
        .oneshot(request(Method::GET, "/screenshots"))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert!(body["screenshots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn screenshot_served_as_png() {
    let (app, shots, _rx) = test_app();
    let id = {
        let mut list = shots.lock().unwrap();
        let image = RgbaImage::from_pixel(6, 4, Rgba([200, 10, 10, 255]));
        list.push(image, Local::now()).id.clone()
    };

    let response = app
        .oneshot(request(Method::GET, &format!("/screenshot/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (6, 4));
    assert_eq!(decoded.get_pixel(0, 0), &Rgba([200, 10, 10, 255]));
}

#[tokio::test]
async fn unknown_screenshot_is_404() {
    let (app, _, _rx) = test_app();
    let response = app
        .oneshot(request(Method::GET, "/screenshot/20000101_000000_000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Screenshot not found");
}
