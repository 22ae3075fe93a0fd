//! The screenshots that go into one export.
//!
//! The list is copied before the save dialog opens and only the copied
//! screenshots are removed, after the file is written.

use image::RgbaImage;
use std::path::Path;

use super::pdf::{write_pdf, ExportError, PageSize};
use crate::capture::CaptureList;

pub struct ExportBatch {
    ids: Vec<String>,
    images: Vec<RgbaImage>,
}

impl ExportBatch {
    /// Copies the current list. `None` when there is nothing to export.
    pub fn collect(list: &CaptureList) -> Option<Self> {
        if list.is_empty() {
            return None;
        }
        let (ids, images) = list
            .snapshot()
            .into_iter()
            .map(|shot| (shot.id, shot.image))
            .unzip();
        Some(Self { ids, images })
    }

    pub fn pages(&self) -> usize {
        self.images.len()
    }

    pub fn write(&self, path: &Path, page: PageSize) -> Result<(), ExportError> {
        write_pdf(path, &self.images, page)
    }

    /// Drops the exported screenshots from `list`, keeping anything
    /// captured since the batch was collected.
    pub fn remove_from(&self, list: &mut CaptureList) {
        list.remove_exported(&self.ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn list_of(widths: &[u32]) -> CaptureList {
        let mut list = CaptureList::new();
        for &w in widths {
            list.push(RgbaImage::new(w, 10), Local::now());
        }
        list
    }

    #[test]
    fn empty_list_exports_nothing() {
        assert!(ExportBatch::collect(&CaptureList::new()).is_none());
    }

    #[test]
    fn cancelled_export_leaves_list_alone() {
        let list = list_of(&[10, 20]);
        let batch = ExportBatch::collect(&list).unwrap();
        assert_eq!(batch.pages(), 2);

        drop(batch);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn written_export_removes_exactly_its_screenshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots.pdf");

        let mut list = list_of(&[10, 20]);
        let batch = ExportBatch::collect(&list).unwrap();
        list.push(RgbaImage::new(30, 10), Local::now());

        batch.write(&path, PageSize::A4).unwrap();
        batch.remove_from(&mut list);

        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.latest().unwrap().image.width(), 30);
    }

    #[test]
    fn failed_write_keeps_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("shots.pdf");

        let list = list_of(&[10]);
        let batch = ExportBatch::collect(&list).unwrap();

        assert!(matches!(
            batch.write(&path, PageSize::A4),
            Err(ExportError::Io(_))
        ));
        assert_eq!(list.len(), 1);
    }
}
