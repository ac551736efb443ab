//! PDF assembly and export

pub mod export;
pub mod fonts;
pub mod metadata;
pub mod writer;

// Re-export commonly used items
pub use export::{
    export, export_to_file, page_label, ExportOptions, ExportOutcome, ExportedDocument,
    FooterSpec, HeaderSpec, DEFAULT_OUTPUT_FILE,
};
pub use fonts::Font;
pub use metadata::{count_pages, document_metadata, extract_metadata, PdfMetadata};
pub use writer::{DocumentInfo, ImageHandle, LineStyle, PdfWriter, Rgb, TextStyle};
