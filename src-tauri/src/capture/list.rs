//! The capture list: screenshots awaiting export, oldest first.

use chrono::{DateTime, Local};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// List shared between the Tauri state and the HTTP server.
pub type SharedCaptureList = Arc<Mutex<CaptureList>>;

const ID_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One captured region.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub id: String,
    pub timestamp: DateTime<Local>,
    pub image: RgbaImage,
}

impl Screenshot {
    pub fn summary(&self) -> ScreenshotSummary {
        ScreenshotSummary {
            id: self.id.clone(),
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            width: self.image.width(),
            height: self.image.height(),
        }
    }
}

/// Metadata sent to the frontend and the browser add-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotSummary {
    pub id: String,
    pub timestamp: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
pub struct CaptureList {
    shots: Vec<Screenshot>,
}

impl CaptureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedCaptureList {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends a capture taken at `now`.
    pub fn push(&mut self, image: RgbaImage, now: DateTime<Local>) -> &Screenshot {
        let id = self.unique_id(now.format(ID_FORMAT).to_string());
        self.shots.push(Screenshot {
            id,
            timestamp: now,
            image,
        });
        &self.shots[self.shots.len() - 1]
    }

    // Two captures inside the same millisecond would otherwise share an id.
    fn unique_id(&self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 2;
        while self.get(&candidate).is_some() {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        candidate
    }

    pub fn pop_last(&mut self) -> Option<Screenshot> {
        self.shots.pop()
    }

    pub fn latest(&self) -> Option<&Screenshot> {
        self.shots.last()
    }

    pub fn get(&self, id: &str) -> Option<&Screenshot> {
        self.shots.iter().find(|s| s.id == id)
    }

    pub fn summaries(&self) -> Vec<ScreenshotSummary> {
        self.shots.iter().map(Screenshot::summary).collect()
    }

    /// Copy of the current list, used to export without holding the lock.
    pub fn snapshot(&self) -> Vec<Screenshot> {
        self.shots.clone()
    }

    /// Drops the given screenshots after a successful export.
    ///
    /// Anything captured while the export was running stays in the list.
    pub fn remove_exported(&mut self, ids: &[String]) {
        self.shots.retain(|s| !ids.contains(&s.id));
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }
}
