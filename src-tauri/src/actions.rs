//! Capture and export flows shared by the buttons, the tray, the global
//! shortcut and the HTTP surface.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_dialog::DialogExt;

use crate::capture::{self, CaptureState, CaptureStatus, Point, Retake, ScreenshotSummary};
use crate::config::AppConfig;
use crate::export::{self, ExportBatch};

pub const MAIN_WINDOW: &str = "main";
pub const CAPTURES_CHANGED: &str = "captures-changed";

/// Overlay windows are labelled `overlay-<generation>`.
const OVERLAY_PREFIX: &str = "overlay-";

/// Time for the compositor to actually unmap the main window before the grab.
const HIDE_SETTLE: Duration = Duration::from_millis(200);

pub fn overlay_label(generation: u64) -> String {
    format!("{}{}", OVERLAY_PREFIX, generation)
}

/// The capture generation an overlay window belongs to.
pub fn overlay_generation(label: &str) -> Option<u64> {
    label.strip_prefix(OVERLAY_PREFIX)?.parse().ok()
}

/// Hides the main window, grabs the primary monitor and opens the
/// selection overlay. Ignored while another capture is in progress.
pub async fn start_capture(app: &AppHandle) -> Result<(), String> {
    if !app.state::<CaptureState>().try_begin() {
        log::warn!("Capture already in progress — ignoring request");
        return Ok(());
    }
    run_claimed_capture(app).await
}

async fn run_claimed_capture(app: &AppHandle) -> Result<(), String> {
    let result = open_overlay(app).await;
    if let Err(e) = &result {
        log::error!("Capture failed: {}", e);
        app.state::<CaptureState>().cancel();
        restore_main_window(app);
    }
    result
}

async fn open_overlay(app: &AppHandle) -> Result<(), String> {
    let state = app.state::<CaptureState>();
    let start = Instant::now();

    let main_visible = match app.get_webview_window(MAIN_WINDOW) {
        Some(main) => {
            let visible = main.is_visible().unwrap_or(false);
            if visible {
                main.hide().map_err(|e| e.to_string())?;
                tokio::time::sleep(HIDE_SETTLE).await;
            }
            visible
        }
        None => false,
    };
    state.remember_main_visibility(main_visible);

    let frame = tauri::async_runtime::spawn_blocking(capture::capture_primary_monitor)
        .await
        .map_err(|e| format!("Capture task failed: {}", e))?
        .map_err(|e| e.to_string())?;

    log::info!(
        "Screen captured ({}x{}) in {}ms",
        frame.width(),
        frame.height(),
        start.elapsed().as_millis()
    );

    let generation = state.freeze(frame)?;
    let label = overlay_label(generation);

    WebviewWindowBuilder::new(app, &label, WebviewUrl::App("overlay.html".into()))
        .fullscreen(true)
        .transparent(true)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .title("Shot-to-PDF Selection")
        .build()
        .map_err(|e| e.to_string())?;

    log::info!("Overlay {} opened in {}ms total", label, start.elapsed().as_millis());
    Ok(())
}

/// Base64 PNG of the frozen frame, drawn by the overlay as its background.
pub fn overlay_frame(app: &AppHandle) -> Result<String, String> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let png_bytes = app.state::<CaptureState>().frame_png()?;
    Ok(STANDARD.encode(&png_bytes))
}

/// Ends the overlay drag: crops the frozen frame and appends the result to
/// the capture list. An empty selection captures nothing.
pub fn finish_selection(
    app: &AppHandle,
    origin: Point,
    release: Point,
    scale: f64,
) -> Result<Option<ScreenshotSummary>, String> {
    let captured = app
        .state::<CaptureState>()
        .complete_selection(origin, release, scale, Local::now());

    close_overlays(app);
    restore_main_window(app);

    let Some(summary) = captured? else {
        return Ok(None);
    };
    notify_captures_changed(app);
    log::info!(
        "Captured {} ({}x{})",
        summary.id,
        summary.width,
        summary.height
    );
    Ok(Some(summary))
}

/// Escape in the overlay.
pub fn cancel_selection(app: &AppHandle) {
    app.state::<CaptureState>().cancel();
    close_overlays(app);
    restore_main_window(app);
    log::info!("Selection cancelled");
}

/// The overlay of capture `generation` went away without finishing
/// (closed by the window manager).
pub fn overlay_destroyed(app: &AppHandle, generation: u64) {
    if app.state::<CaptureState>().abandon(generation) {
        log::warn!("Overlay closed mid-selection — capture abandoned");
        restore_main_window(app);
    }
}

/// Drops the newest capture and starts a new one in its place.
pub async fn redo_capture(app: &AppHandle) -> Result<(), String> {
    match app.state::<CaptureState>().begin_retake()? {
        Retake::Busy => {
            log::warn!("Capture already in progress — ignoring retake");
            return Ok(());
        }
        Retake::Claimed { discarded } => {
            if let Some(shot) = discarded {
                log::info!("Discarded {} for retake", shot.id);
                notify_captures_changed(app);
            }
        }
    }
    run_claimed_capture(app).await
}

/// Asks for a destination and writes every capture to a PDF.
///
/// Returns the written path, or `None` if there was nothing to export or
/// the dialog was cancelled.
pub async fn export_pdf(app: &AppHandle) -> Result<Option<PathBuf>, String> {
    let batch = {
        let state = app.state::<CaptureState>();
        let shots = state.shots.lock().map_err(|e| e.to_string())?;
        ExportBatch::collect(&shots)
    };
    let Some(batch) = batch else {
        log::warn!("Export requested with no screenshots — ignoring");
        return Ok(None);
    };

    let config = app.state::<AppConfig>();
    let page_size = config.page_size;
    let mut dialog = app
        .dialog()
        .file()
        .set_title("Save PDF")
        .add_filter("PDF Files", &["pdf"])
        .set_file_name("screenshots.pdf");
    if let Some(dir) = &config.export_dir {
        dialog = dialog.set_directory(dir);
    }

    let (tx, rx) = tokio::sync::oneshot::channel();
    dialog.save_file(move |chosen| {
        let _ = tx.send(chosen);
    });

    let Some(chosen) = rx.await.map_err(|e| e.to_string())? else {
        log::info!("Export cancelled");
        return Ok(None);
    };
    let path = export::ensure_pdf_extension(chosen.into_path().map_err(|e| e.to_string())?);

    let target = path.clone();
    let batch = tauri::async_runtime::spawn_blocking(move || {
        batch.write(&target, page_size).map(|()| batch)
    })
    .await
    .map_err(|e| format!("Export task failed: {}", e))?
    .map_err(|e| e.to_string())?;

    {
        let state = app.state::<CaptureState>();
        let mut shots = state.shots.lock().map_err(|e| e.to_string())?;
        batch.remove_from(&mut shots);
    }
    notify_captures_changed(app);

    Ok(Some(path))
}

/// Current list state for the main window.
pub fn capture_status(app: &AppHandle) -> Result<CaptureStatus, String> {
    let state = app.state::<CaptureState>();
    let shots = state.shots.lock().map_err(|e| e.to_string())?;
    CaptureStatus::of(&shots).map_err(|e| e.to_string())
}

fn notify_captures_changed(app: &AppHandle) {
    let result = capture_status(app).and_then(|status| {
        app.emit_to(MAIN_WINDOW, CAPTURES_CHANGED, status)
            .map_err(|e| e.to_string())
    });
    if let Err(e) = result {
        log::error!("Failed to notify main window: {}", e);
    }
}

pub fn show_main_window(app: &AppHandle) {
    if let Some(main) = app.get_webview_window(MAIN_WINDOW) {
        if let Err(e) = main.show().and_then(|_| main.set_focus()) {
            log::error!("Failed to show main window: {}", e);
        }
    }
}

fn restore_main_window(app: &AppHandle) {
    if app.state::<CaptureState>().main_was_visible() {
        show_main_window(app);
    }
}

fn close_overlays(app: &AppHandle) {
    for (label, window) in app.webview_windows() {
        if overlay_generation(&label).is_none() {
            continue;
        }
        if let Err(e) = window.close() {
            log::error!("Failed to close overlay {}: {}", label, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_label_round_trips_generation() {
        assert_eq!(overlay_label(7), "overlay-7");
        assert_eq!(overlay_generation(&overlay_label(42)), Some(42));
    }

    #[test]
    fn other_windows_are_not_overlays() {
        assert_eq!(overlay_generation(MAIN_WINDOW), None);
        assert_eq!(overlay_generation("overlay"), None);
        assert_eq!(overlay_generation("overlay-x"), None);
    }
}
