//! Proposal Export Library
//!
//! Turns a rendered proposal preview (a tall bitmap snapshot) into a
//! multi-page PDF. This library provides functionality to:
//! - Load the preview snapshot and the header logo
//! - Plan how the snapshot is sliced into page-sized bands
//! - Draw each band under a repeated logo header
//! - Stamp every page with a footer reading "Page i of N"
//! - Read exported PDFs back for inspection
//!
//! # Example
//!
//! ```no_run
//! use proposal_export::pdf::{export_to_file, ExportOptions, ExportOutcome};
//! use std::path::PathBuf;
//!
//! let options = ExportOptions {
//!     preview_path: PathBuf::from("preview.png"),
//!     logo_path: PathBuf::from("assets/img/masirat-logo.png"),
//!     ..Default::default()
//! };
//!
//! match export_to_file(&options).expect("Failed to export proposal") {
//!     ExportOutcome::Written { path, pages } => println!("{} pages in {}", pages, path.display()),
//!     ExportOutcome::Skipped { reason } => println!("nothing exported: {}", reason),
//! }
//! ```

pub mod error;
pub mod layout;
pub mod paginate;
pub mod pdf;
pub mod raster;

// Re-export commonly used items
pub use error::{Error, Result};
pub use layout::{Length, PageDimensions, PageGeometry};
pub use raster::{LogoAsset, SourceImage};
