//! Shot-to-PDF — Tauri application entry point.
//!
//! This is the app shell that wires together:
//! - Screen capture domain (capture/) and PDF export (export/)
//! - Capture/export flows (actions.rs) and their Tauri commands
//! - System tray (tray.rs) and the global shortcut (shortcut.rs)
//! - Local HTTP control surface for the browser add-in (server.rs)

pub mod actions;
pub mod capture;
mod capture_commands;
pub mod config;
pub mod export;
pub mod server;
mod shortcut;
mod tray;

use capture::CaptureState;
use config::AppConfig;
use server::{ControlAction, ServerState};
use tauri::{AppHandle, Manager, WindowEvent};
use tokio::sync::mpsc;

/// Forwards queued HTTP actions to the app, one task per action so a
/// pending save dialog never blocks a capture request.
fn spawn_action_dispatcher(app: AppHandle, mut rx: mpsc::UnboundedReceiver<ControlAction>) {
    tauri::async_runtime::spawn(async move {
        while let Some(action) = rx.recv().await {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let result = match action {
                    ControlAction::Capture => actions::start_capture(&app).await,
                    ControlAction::ExportPdf => actions::export_pdf(&app).await.map(|_| ()),
                };
                if let Err(e) = result {
                    log::error!("{:?} requested over HTTP failed: {}", action, e);
                }
            });
        }
    });
}

/// Entry point — called by Tauri runtime.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    let config = AppConfig::from_env();
    let capture_state = CaptureState::new();
    let shots = capture_state.shots.clone();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .manage(capture_state)
        .manage(config.clone())
        .invoke_handler(tauri::generate_handler![
            capture_commands::take_screenshot,
            capture_commands::redo_screenshot,
            capture_commands::export_pdf,
            capture_commands::capture_status,
            capture_commands::list_screenshots,
            capture_commands::overlay_frame,
            capture_commands::finish_selection,
            capture_commands::cancel_selection,
        ])
        .on_window_event(|window, event| {
            if !matches!(event, WindowEvent::Destroyed) {
                return;
            }
            if let Some(generation) = actions::overlay_generation(window.label()) {
                actions::overlay_destroyed(window.app_handle(), generation);
            }
        })
        .setup(move |app| {
            log::info!("Shot-to-PDF starting up");

            tray::setup_tray(app.handle())?;

            if let Some(hotkey) = &config.hotkey {
                if let Err(e) = shortcut::register_capture_shortcut(app.handle(), hotkey) {
                    log::warn!("Could not register capture shortcut {}: {}", hotkey, e);
                }
            }

            if config.http_enabled {
                let (tx, rx) = mpsc::unbounded_channel();
                spawn_action_dispatcher(app.handle().clone(), rx);

                let state = ServerState { shots, actions: tx };
                let port = config.http_port;
                tauri::async_runtime::spawn(async move {
                    if let Err(e) = server::serve(state, port).await {
                        log::error!("HTTP control server failed on port {}: {}", port, e);
                    }
                });
            } else {
                log::info!("HTTP control server disabled");
            }

            if config.show_window {
                actions::show_main_window(app.handle());
            } else {
                log::info!("Main window hidden — use the tray or the browser add-in");
            }

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running Shot-to-PDF");
}
