//! Global capture shortcut.

use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};

use crate::actions;

/// Registers `hotkey` (e.g. `CommandOrControl+Shift+S`) to start a capture.
pub fn register_capture_shortcut(
    app: &AppHandle,
    hotkey: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    app.global_shortcut()
        .on_shortcut(hotkey, |app, _shortcut, event| {
            if event.state() != ShortcutState::Pressed {
                return;
            }
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Err(e) = actions::start_capture(&app).await {
                    log::error!("Failed to start capture from shortcut: {}", e);
                }
            });
        })?;
    log::info!("Capture shortcut registered: {}", hotkey);
    Ok(())
}
