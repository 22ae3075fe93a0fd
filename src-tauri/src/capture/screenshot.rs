//! Full-screen capture using the `xcap` crate.
//!
//! This is the infrastructure layer — it talks to the OS.
//! Everything downstream works on the returned `RgbaImage`.

use image::RgbaImage;
use xcap::Monitor;

/// Captures the primary monitor's screen.
///
/// Returns the full frame; the caller crops it to the user's selection.
pub fn capture_primary_monitor() -> Result<RgbaImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

    let mut primary = None;
    let mut first = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            primary = Some(monitor);
            break;
        }
        if first.is_none() {
            first = Some(monitor);
        }
    }

    // Some X11 setups report no primary output at all
    let monitor = primary.or(first).ok_or(CaptureError::NoPrimaryMonitor)?;

    monitor
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),
}
