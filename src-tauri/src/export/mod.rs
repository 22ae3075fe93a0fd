//! Export of the capture list to disk.

mod batch;
pub mod pdf;

pub use batch::ExportBatch;
pub use pdf::{ensure_pdf_extension, write_pdf, ExportError, PageSize};
