//! Integration tests for the proposal exporter

use image::{Rgba, RgbaImage};
use lopdf::Document;
use proposal_export::pdf::{
    count_pages, export_to_file, extract_metadata, ExportOptions, ExportOutcome,
};
use proposal_export::{Error, Length, PageDimensions, PageGeometry};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a solid-colour PNG and return its path
fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(&path)
        .expect("Failed to write test image");
    path
}

/// Geometry with a 180 × 240 mm usable area
fn geometry_180_by_240() -> PageGeometry {
    PageGeometry {
        page: PageDimensions {
            width: Length::from_mm(196.0),
            height: Length::from_mm(283.0),
        },
        ..Default::default()
    }
}

fn options_in(dir: &TempDir, preview: PathBuf, logo: PathBuf) -> ExportOptions {
    ExportOptions {
        preview_path: preview,
        logo_path: logo,
        output_path: dir.path().join("Masirat-Technology-Proposal.pdf"),
        ..Default::default()
    }
}

fn page_texts(path: &Path) -> Vec<String> {
    let mut doc = Document::load(path).expect("Failed to load exported PDF");
    doc.decompress();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

#[test]
fn test_export_three_pages_to_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let preview = write_png(temp_dir.path(), "preview.png", 1000, 3000, [255, 255, 255, 255]);
    let logo = write_png(temp_dir.path(), "logo.png", 60, 30, [0, 90, 170, 255]);

    let mut options = options_in(&temp_dir, preview, logo);
    options.geometry = geometry_180_by_240();

    let outcome = export_to_file(&options).expect("Failed to export");
    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: options.output_path.clone(),
            pages: 3,
        }
    );

    assert_eq!(count_pages(&options.output_path).unwrap(), 3);

    let texts = page_texts(&options.output_path);
    assert_eq!(texts.len(), 3);
    for (i, text) in texts.iter().enumerate() {
        let label = format!("(Page {} of 3) Tj", i + 1);
        assert!(text.contains(&label), "page {} is missing its footer", i + 1);
        assert!(text.contains("(Masirat Technology) Tj"));
    }
}

#[test]
fn test_export_metadata() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let preview = write_png(temp_dir.path(), "preview.png", 400, 300, [240, 240, 240, 255]);
    let logo = write_png(temp_dir.path(), "logo.png", 20, 20, [0, 0, 0, 255]);

    let mut options = options_in(&temp_dir, preview, logo);
    options.document_title = Some("Website Redesign Proposal".to_string());

    export_to_file(&options).expect("Failed to export");

    let metadata = extract_metadata(&options.output_path).unwrap();
    assert_eq!(metadata.page_count, 1);
    assert_eq!(metadata.title.as_deref(), Some("Website Redesign Proposal"));
    assert!(metadata
        .producer
        .as_deref()
        .is_some_and(|p| p.starts_with("proposal-export")));
    assert!(metadata
        .creation_date
        .as_deref()
        .is_some_and(|d| d.starts_with("D:")));
}

#[test]
fn test_transparent_logo_gets_soft_mask() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let preview = write_png(temp_dir.path(), "preview.png", 200, 200, [255, 255, 255, 255]);
    let logo = write_png(temp_dir.path(), "logo.png", 16, 16, [200, 0, 0, 100]);

    let options = options_in(&temp_dir, preview, logo);
    export_to_file(&options).expect("Failed to export");

    let doc = Document::load(&options.output_path).unwrap();
    let masked = doc.objects.values().any(|obj| {
        obj.as_stream()
            .map(|stream| stream.dict.has(b"SMask"))
            .unwrap_or(false)
    });
    assert!(masked, "logo alpha should be carried as an SMask");
}

#[test]
fn test_missing_preview_is_skipped() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let logo = write_png(temp_dir.path(), "logo.png", 20, 20, [0, 0, 0, 255]);

    let options = options_in(&temp_dir, temp_dir.path().join("no-preview.png"), logo);
    let outcome = export_to_file(&options).expect("Skipping is not an error");

    assert!(matches!(outcome, ExportOutcome::Skipped { .. }));
    assert!(!options.output_path.exists(), "nothing should be written");
}

#[test]
fn test_missing_logo_fails_before_export() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let preview = write_png(temp_dir.path(), "preview.png", 100, 100, [255, 255, 255, 255]);

    let options = options_in(&temp_dir, preview, temp_dir.path().join("missing-logo.png"));
    let result = export_to_file(&options);

    assert!(matches!(result, Err(Error::AssetLoadFailed { .. })));
    assert!(!options.output_path.exists());
}

#[test]
fn test_corrupt_preview_is_asset_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let logo = write_png(temp_dir.path(), "logo.png", 20, 20, [0, 0, 0, 255]);
    let preview = temp_dir.path().join("preview.png");
    std::fs::write(&preview, b"not really a png").unwrap();

    let options = options_in(&temp_dir, preview, logo);
    let result = export_to_file(&options);

    assert!(matches!(result, Err(Error::AssetLoadFailed { .. })));
}

#[test]
fn test_unwritable_output_is_export_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let preview = write_png(temp_dir.path(), "preview.png", 100, 100, [255, 255, 255, 255]);
    let logo = write_png(temp_dir.path(), "logo.png", 20, 20, [0, 0, 0, 255]);

    let mut options = options_in(&temp_dir, preview, logo);
    options.output_path = temp_dir.path().join("no-such-dir").join("out.pdf");

    let result = export_to_file(&options);
    assert!(matches!(result, Err(Error::ExportFailed(_))));
}

#[test]
fn test_letter_paper_export() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let preview = write_png(temp_dir.path(), "preview.png", 800, 2400, [250, 250, 250, 255]);
    let logo = write_png(temp_dir.path(), "logo.png", 20, 10, [0, 0, 0, 255]);

    let mut options = options_in(&temp_dir, preview, logo);
    options.geometry.page = PageDimensions::letter();
    let usable_width = options.geometry.usable_width().mm();
    let usable_height = options.geometry.usable_height().mm();

    let outcome = export_to_file(&options).expect("Failed to export");

    let total = 2400.0 * usable_width / 800.0;
    let expected = (total / usable_height).ceil() as usize;
    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: options.output_path.clone(),
            pages: expected,
        }
    );
    assert_eq!(count_pages(&options.output_path).unwrap(), expected);
}
