//! Paginated export of a rendered proposal preview
//!
//! The preview bitmap is scaled to the usable page width and sliced into
//! bands, one per page, each drawn below a repeated logo header. Footers
//! carry `Page i of N` and are stamped in a second pass once `N` is known.

use std::path::{Path, PathBuf};

use chrono::Local;
use lopdf::{Document, Object};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::layout::{Length, PageGeometry, Rect};
use crate::paginate::{self, PagePlan};
use crate::pdf::fonts::Font;
use crate::pdf::writer::{DocumentInfo, ImageHandle, LineStyle, PdfWriter, Rgb, TextStyle};
use crate::raster::{LogoAsset, SourceImage};

/// File name used when no output path is given
pub const DEFAULT_OUTPUT_FILE: &str = "Masirat-Technology-Proposal.pdf";

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Repeated page header: logo on the left, two title lines beside it
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    pub logo: LogoAsset,
    /// Bold first title line
    pub title: String,
    /// Regular second title line
    pub subtitle: Option<String>,
    /// Logo width; height follows the logo's aspect ratio
    pub logo_max_width: Length,
    /// Distance from the page top to the logo's top edge
    pub logo_top: Length,
    /// Horizontal gap between the logo and the title
    pub title_gap: Length,
    pub title_style: TextStyle,
    pub subtitle_style: TextStyle,
}

impl HeaderSpec {
    /// Header with the standard "Masirat / Technology" title
    pub fn new(logo: LogoAsset) -> Self {
        Self {
            logo,
            title: "Masirat".to_string(),
            subtitle: Some("Technology".to_string()),
            logo_max_width: Length::from_mm(20.0),
            logo_top: Length::from_mm(6.0),
            title_gap: Length::from_mm(5.0),
            title_style: TextStyle {
                font: Font::HelveticaBold,
                size_pt: 16.0,
                color: Rgb::BLACK,
            },
            subtitle_style: TextStyle {
                font: Font::Helvetica,
                size_pt: 14.0,
                color: Rgb::BLACK,
            },
        }
    }

    /// Logo placement on the page
    pub fn logo_rect(&self, geometry: &PageGeometry) -> Rect {
        let width = self.logo_max_width;
        let height = Length::from_mm(width.mm() * self.logo.aspect_ratio());
        Rect::new(geometry.margin, self.logo_top, width, height)
    }
}

/// Repeated page footer: rule, label on the left, page counter on the right
#[derive(Debug, Clone)]
pub struct FooterSpec {
    pub label: String,
    /// Distance of the separator rule from the bottom of the page
    pub rule_offset: Length,
    /// Distance of the text baseline from the bottom of the page
    pub text_offset: Length,
    pub rule_style: LineStyle,
    pub text_style: TextStyle,
}

impl FooterSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rule_offset: Length::from_mm(12.0),
            text_offset: Length::from_mm(6.0),
            rule_style: LineStyle {
                width: Length::from_mm(0.3),
                color: Rgb::gray(200),
            },
            text_style: TextStyle {
                font: Font::Helvetica,
                size_pt: 9.0,
                color: Rgb::gray(128),
            },
        }
    }
}

/// Page counter text for 1-based `page` of `total`
pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// A finished export, ready to be written out
pub struct ExportedDocument {
    document: Document,
    plan: PagePlan,
}

impl std::fmt::Debug for ExportedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedDocument")
            .field("pages", &self.page_count())
            .field("plan", &self.plan)
            .finish()
    }
}

impl ExportedDocument {
    pub fn page_count(&self) -> usize {
        self.plan.page_count()
    }

    /// Band layout the document was built from
    pub fn plan(&self) -> &PagePlan {
        &self.plan
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the Title entry of the document information dictionary
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let info_id = self
            .document
            .trailer
            .get(b"Info")
            .and_then(|info| info.as_reference())?;
        let info = self.document.get_dictionary_mut(info_id)?;
        info.set("Title", Object::string_literal(title));
        Ok(())
    }

    /// Compress and write the document to `path`
    pub fn save(mut self, path: &Path) -> Result<()> {
        self.document.compress();
        self.document.save(path).map_err(|e| {
            Error::ExportFailed(format!("writing {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Compress and serialize the document into memory
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        self.document.compress();
        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|e| Error::ExportFailed(format!("serializing document: {}", e)))?;
        Ok(bytes)
    }
}

fn draw_header(
    writer: &mut PdfWriter,
    header: &HeaderSpec,
    geometry: &PageGeometry,
    logo: &ImageHandle,
) {
    let logo_rect = header.logo_rect(geometry);
    writer.add_image(logo, logo_rect);

    let title_x = logo_rect.x + logo_rect.width + header.title_gap;
    let logo_center_y = logo_rect.y.mm() + logo_rect.height.mm() / 2.0;

    writer.text(
        &header.title,
        title_x,
        Length::from_mm(logo_center_y + 2.0),
        &header.title_style,
    );
    if let Some(ref subtitle) = header.subtitle {
        writer.text(
            subtitle,
            title_x,
            Length::from_mm(logo_center_y + 8.0),
            &header.subtitle_style,
        );
    }
}

fn draw_footer(
    writer: &mut PdfWriter,
    footer: &FooterSpec,
    geometry: &PageGeometry,
    page: usize,
    total: usize,
) {
    let page_width = geometry.page.width;
    let page_height = geometry.page.height;

    let rule_y = page_height - footer.rule_offset;
    writer.line(
        (geometry.margin, rule_y),
        (page_width - geometry.margin, rule_y),
        &footer.rule_style,
    );

    let text_y = page_height - footer.text_offset;
    writer.text(&footer.label, geometry.margin, text_y, &footer.text_style);

    let counter = page_label(page, total);
    let counter_width = writer.text_width(&counter, &footer.text_style);
    let counter_x = page_width - geometry.margin - counter_width;
    writer.text(&counter, counter_x, text_y, &footer.text_style);
}

/// Slice `image` into pages with repeated header and footer
///
/// Pages are built in two passes: the first emits the header and body band
/// for every page, the second revisits each page to stamp its footer once
/// the final page count is known. An image with no rows yields a single page
/// with only header and footer.
pub fn export(
    image: &SourceImage,
    geometry: &PageGeometry,
    header: &HeaderSpec,
    footer: &FooterSpec,
) -> Result<ExportedDocument> {
    let plan = paginate::plan(image.width(), image.height(), geometry)?;
    info!(
        width = image.width(),
        height = image.height(),
        scale = plan.scale,
        pages = plan.page_count(),
        "exporting preview"
    );

    let mut writer = PdfWriter::new(geometry.page);
    let logo = writer.embed_image(header.logo.image())?;

    if plan.bands.is_empty() {
        draw_header(&mut writer, header, geometry, &logo);
    }

    for band in &plan.bands {
        if band.page > 1 {
            writer.add_page();
        }
        draw_header(&mut writer, header, geometry, &logo);

        let pixels = image.band(band.row_start, band.row_end)?;
        let handle = writer.embed_image(&pixels)?;
        writer.add_image(&handle, geometry.band_rect(band.draw_height));
        debug!(
            page = band.page,
            rows = band.rows(),
            draw_height_mm = band.draw_height.mm(),
            "placed band"
        );
    }

    let total = writer.page_count();
    for page in 1..=total {
        writer.set_page(page)?;
        draw_footer(&mut writer, footer, geometry, page, total);
    }

    let info = DocumentInfo {
        title: Some(format!("{} Proposal", footer.label)),
        producer: Some(PRODUCER.to_string()),
        created: Some(Local::now().naive_local()),
    };
    let document = writer.finish(&info)?;

    Ok(ExportedDocument { document, plan })
}

/// Options for exporting a preview file to a PDF file
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Rendered preview snapshot (PNG or JPEG)
    pub preview_path: PathBuf,
    /// Header logo (PNG or JPEG)
    pub logo_path: PathBuf,
    pub output_path: PathBuf,
    pub geometry: PageGeometry,
    pub title: String,
    pub subtitle: Option<String>,
    pub footer_label: String,
    /// Title stored in the PDF metadata; derived from the footer label when unset
    pub document_title: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            preview_path: PathBuf::from("proposal-preview.png"),
            logo_path: PathBuf::from("assets/img/masirat-logo.png"),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            geometry: PageGeometry::default(),
            title: "Masirat".to_string(),
            subtitle: Some("Technology".to_string()),
            footer_label: "Masirat Technology".to_string(),
            document_title: None,
        }
    }
}

/// What [`export_to_file`] did
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The PDF was written
    Written { path: PathBuf, pages: usize },
    /// There was no preview to export; nothing was written
    Skipped { reason: String },
}

/// Load the assets, export the preview and write the PDF
///
/// The logo is loaded first and must succeed before anything is rendered.
/// A missing preview is not an error: the export is skipped and the outcome
/// says so.
pub fn export_to_file(options: &ExportOptions) -> Result<ExportOutcome> {
    let logo = LogoAsset::load(&options.logo_path)?;

    if !options.preview_path.exists() {
        let reason = format!("preview {} does not exist", options.preview_path.display());
        warn!(%reason, "skipping export");
        return Ok(ExportOutcome::Skipped { reason });
    }
    let image = SourceImage::open(&options.preview_path)?;

    let mut header = HeaderSpec::new(logo);
    header.title = options.title.clone();
    header.subtitle = options.subtitle.clone();
    let footer = FooterSpec::new(options.footer_label.clone());

    let mut exported = export(&image, &options.geometry, &header, &footer)?;
    if let Some(ref title) = options.document_title {
        exported.set_title(title)?;
    }
    let pages = exported.page_count();
    exported.save(&options.output_path)?;

    info!(
        path = %options.output_path.display(),
        logo = %header.logo.source().display(),
        pages,
        "wrote proposal PDF"
    );
    Ok(ExportOutcome::Written {
        path: options.output_path.clone(),
        pages,
    })
}
