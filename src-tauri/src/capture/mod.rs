//! Screen capture domain — public API.
//!
//! This module owns grabbing the screen, turning an overlay drag into a
//! cropped bitmap, and the list of captures awaiting export.

pub mod list;
pub mod region;
mod screenshot;

pub use list::{CaptureList, Screenshot, ScreenshotSummary, SharedCaptureList};
pub use region::{crop_selection, encode_png, CropError, Point};
pub use screenshot::{capture_primary_monitor, CaptureError};

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Local};
use image::RgbaImage;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Bounds of the preview shown in the main window.
pub const PREVIEW_SIZE: (u32, u32) = (400, 300);

/// Full-screen grab held between capture and the end of the selection,
/// tagged with the capture that took it.
struct FrozenFrame {
    generation: u64,
    image: RgbaImage,
}

/// Result of asking for a retake.
#[derive(Debug)]
pub enum Retake {
    /// Another capture is running; the list was left alone.
    Busy,
    /// The capture flow is ours. `discarded` is the screenshot dropped to
    /// make room for the new one.
    Claimed { discarded: Option<Screenshot> },
}

/// Thread-safe capture state managed by Tauri.
pub struct CaptureState {
    frame: Mutex<Option<FrozenFrame>>,
    pub shots: SharedCaptureList,
    busy: AtomicBool,
    generation: AtomicU64,
    main_was_visible: AtomicBool,
}

impl CaptureState {
    pub fn new() -> Self {
        Self {
            frame: Mutex::new(None),
            shots: CaptureList::shared(),
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            main_was_visible: AtomicBool::new(false),
        }
    }

    /// Claims the capture flow. Returns false if one is already running.
    pub fn try_begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Claims the capture flow and drops the newest capture.
    ///
    /// Nothing is dropped while another capture is running.
    pub fn begin_retake(&self) -> Result<Retake, String> {
        if !self.try_begin() {
            return Ok(Retake::Busy);
        }
        match self.shots.lock() {
            Ok(mut shots) => Ok(Retake::Claimed {
                discarded: shots.pop_last(),
            }),
            Err(e) => {
                self.end();
                Err(e.to_string())
            }
        }
    }

    /// Holds the grab until the selection ends. Returns the capture's
    /// generation, which names its overlay window.
    pub fn freeze(&self, image: RgbaImage) -> Result<u64, String> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *self.frame.lock().map_err(|e| e.to_string())? = Some(FrozenFrame { generation, image });
        Ok(generation)
    }

    /// PNG of the frozen frame, drawn by the overlay as its background.
    pub fn frame_png(&self) -> Result<Vec<u8>, String> {
        let guard = self.frame.lock().map_err(|e| e.to_string())?;
        let frozen = guard
            .as_ref()
            .ok_or("No screenshot available — capture first")?;
        encode_png(&frozen.image).map_err(|e| e.to_string())
    }

    /// Crops the frozen frame to the drag, appends the result and ends the
    /// capture flow. A null selection or a missing frame captures nothing.
    pub fn complete_selection(
        &self,
        origin: Point,
        release: Point,
        scale: f64,
        now: DateTime<Local>,
    ) -> Result<Option<ScreenshotSummary>, String> {
        let frozen = self.frame.lock().map(|mut frame| frame.take());
        self.end();

        let Some(frozen) = frozen.map_err(|e| e.to_string())? else {
            log::warn!("Selection finished without a captured frame");
            return Ok(None);
        };
        let cropped = crop_selection(&frozen.image, origin, release, scale)
            .map_err(|e| e.to_string())?;
        let Some(image) = cropped else {
            log::info!("Empty selection — nothing captured");
            return Ok(None);
        };

        let mut shots = self.shots.lock().map_err(|e| e.to_string())?;
        Ok(Some(shots.push(image, now).summary()))
    }

    /// Drops the frozen frame and ends the capture flow.
    pub fn cancel(&self) {
        if let Ok(mut frame) = self.frame.lock() {
            frame.take();
        }
        self.end();
    }

    /// The overlay of capture `generation` went away. Returns true if that
    /// capture was still waiting for a selection, which is then dropped.
    ///
    /// A late notice for an earlier overlay leaves a newer capture alone.
    pub fn abandon(&self, generation: u64) -> bool {
        let Ok(mut frame) = self.frame.lock() else {
            return false;
        };
        if frame.as_ref().map(|f| f.generation) != Some(generation) {
            return false;
        }
        frame.take();
        drop(frame);
        self.end();
        true
    }

    pub fn remember_main_visibility(&self, visible: bool) {
        self.main_was_visible.store(visible, Ordering::Release);
    }

    pub fn main_was_visible(&self) -> bool {
        self.main_was_visible.load(Ordering::Acquire)
    }
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload of the `captures-changed` event and the `capture_status` command.
///
/// The main window derives the Retake/Done enabled state from `count`.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureStatus {
    pub count: usize,
    pub latest: Option<ScreenshotSummary>,
    /// Base64 PNG of the newest capture, scaled to fit `PREVIEW_SIZE`.
    pub preview: Option<String>,
}

impl CaptureStatus {
    pub fn of(list: &CaptureList) -> Result<Self, CropError> {
        let preview = match list.latest() {
            Some(shot) => {
                let small = region::preview(&shot.image, PREVIEW_SIZE.0, PREVIEW_SIZE.1);
                Some(STANDARD.encode(encode_png(&small)?))
            }
            None => None,
        };

        Ok(Self {
            count: list.len(),
            latest: list.latest().map(Screenshot::summary),
            preview,
        })
    }
}
