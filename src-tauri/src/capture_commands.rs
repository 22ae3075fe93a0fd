//! Tauri commands for the main window and the selection overlay.
//!
//! Thin wrappers over `actions`; window-creating flows are async so they
//! never run on the main thread (creating a window from a sync command
//! deadlocks on Windows).

use tauri::AppHandle;

use crate::actions;
use crate::capture::{CaptureStatus, Point, ScreenshotSummary};

/// Tauri command: "Take a Screenshot".
#[tauri::command]
pub async fn take_screenshot(app: AppHandle) -> Result<(), String> {
    actions::start_capture(&app).await
}

/// Tauri command: "Retake the Screenshot".
#[tauri::command]
pub async fn redo_screenshot(app: AppHandle) -> Result<(), String> {
    actions::redo_capture(&app).await
}

/// Tauri command: "Done" — export everything to a PDF.
///
/// Returns the written path, or `None` when cancelled or empty.
#[tauri::command]
pub async fn export_pdf(app: AppHandle) -> Result<Option<String>, String> {
    let path = actions::export_pdf(&app).await?;
    Ok(path.map(|p| p.to_string_lossy().to_string()))
}

/// Tauri command: current list state (count, newest summary, preview).
#[tauri::command]
pub fn capture_status(app: AppHandle) -> Result<CaptureStatus, String> {
    actions::capture_status(&app)
}

/// Tauri command: summaries of every capture, oldest first.
#[tauri::command]
pub fn list_screenshots(
    state: tauri::State<'_, crate::capture::CaptureState>,
) -> Result<Vec<ScreenshotSummary>, String> {
    let shots = state.shots.lock().map_err(|e| e.to_string())?;
    Ok(shots.summaries())
}

/// Tauri command: the frozen frame for the overlay background.
#[tauri::command]
pub async fn overlay_frame(app: AppHandle) -> Result<String, String> {
    let start = std::time::Instant::now();
    let encoded = actions::overlay_frame(&app)?;
    log::info!(
        "Encoded overlay frame in {}ms ({} bytes base64)",
        start.elapsed().as_millis(),
        encoded.len()
    );
    Ok(encoded)
}

/// Tauri command: the user released the mouse in the overlay.
///
/// `origin` and `release` are logical overlay coordinates; `scale` is the
/// overlay's device pixel ratio.
#[tauri::command]
pub async fn finish_selection(
    app: AppHandle,
    origin: Point,
    release: Point,
    scale: f64,
) -> Result<Option<ScreenshotSummary>, String> {
    actions::finish_selection(&app, origin, release, scale)
}

/// Tauri command: Escape pressed in the overlay.
#[tauri::command]
pub fn cancel_selection(app: AppHandle) {
    actions::cancel_selection(&app);
}
