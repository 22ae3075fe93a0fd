//! Build script for the Shot-to-PDF Tauri app.
//!
//! Only the Tauri codegen step is needed: screen capture goes through
//! `xcap` and PDF output is pure Rust, so there is no native bridge to build.

fn main() {
    tauri_build::build();
}
