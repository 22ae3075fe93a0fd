//! System tray setup and click handler.
//!
//! Left-click starts a capture; the menu covers capture, export, showing
//! the main window (hidden in add-in-only mode) and quitting.

use tauri::{
    image::Image as TauriImage,
    menu::{MenuBuilder, MenuItemBuilder, PredefinedMenuItem},
    tray::TrayIconBuilder,
    AppHandle,
};

use crate::actions;

pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let capture_item = MenuItemBuilder::with_id("capture", "Take Screenshot").build(app)?;
    let export_item = MenuItemBuilder::with_id("export", "Export PDF").build(app)?;
    let show_item = MenuItemBuilder::with_id("show", "Show Window").build(app)?;
    let quit_item = MenuItemBuilder::with_id("quit", "Quit Shot-to-PDF").build(app)?;
    let separator = PredefinedMenuItem::separator(app)?;
    let menu = MenuBuilder::new(app)
        .item(&capture_item)
        .item(&export_item)
        .item(&show_item)
        .item(&separator)
        .item(&quit_item)
        .build()?;

    // Decode the PNG icon to RGBA for Tauri's Image type
    let icon_bytes = include_bytes!("../icons/32x32.png");
    let icon_img = image::load_from_memory(icon_bytes)
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    let _tray = TrayIconBuilder::new()
        .icon(tray_icon)
        .tooltip("Shot-to-PDF — Click to capture a region")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let tauri::tray::TrayIconEvent::Click {
                button: tauri::tray::MouseButton::Left,
                button_state: tauri::tray::MouseButtonState::Up,
                ..
            } = event
            {
                log::info!("Tray icon clicked — starting capture");
                spawn_capture(tray_icon.app_handle().clone());
            }
        })
        .on_menu_event(|app, event| match event.id().as_ref() {
            "capture" => spawn_capture(app.clone()),
            "export" => {
                let app = app.clone();
                tauri::async_runtime::spawn(async move {
                    if let Err(e) = actions::export_pdf(&app).await {
                        log::error!("Export from tray failed: {}", e);
                    }
                });
            }
            "show" => actions::show_main_window(app),
            "quit" => {
                log::info!("Quit requested from tray menu");
                app.exit(0);
            }
            _ => {}
        })
        .build(app)?;

    Ok(())
}

fn spawn_capture(app: AppHandle) {
    tauri::async_runtime::spawn(async move {
        if let Err(e) = actions::start_capture(&app).await {
            log::error!("Failed to start capture: {}", e);
        }
    });
}
