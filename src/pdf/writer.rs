//! Page-oriented PDF assembly on top of lopdf
//!
//! Callers place content in millimetres measured from the top-left corner of
//! the page. Each page keeps its operators in memory until [`PdfWriter::finish`],
//! so any page can be revisited with [`PdfWriter::set_page`] after later pages
//! exist.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::layout::{Length, PageDimensions, Rect};
use crate::pdf::fonts::{escape_pdf_string, Font};
use crate::raster::RasterImage;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn gray(level: u8) -> Self {
        Rgb(level, level, level)
    }

    fn operands(&self) -> String {
        format!(
            "{} {} {}",
            num(self.0 as f64 / 255.0),
            num(self.1 as f64 / 255.0),
            num(self.2 as f64 / 255.0)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    /// Font size in points
    pub size_pt: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: Length,
    pub color: Rgb,
}

/// Reference to an image registered with [`PdfWriter::embed_image`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    name: String,
}

impl ImageHandle {
    /// XObject resource name, e.g. `Im1`
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Document information dictionary entries
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: Option<String>,
    pub created: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
struct PageContent {
    ops: String,
    images: BTreeSet<String>,
}

/// Format a number for a content stream: at most three decimals, no trailing zeros
fn num(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Incremental writer for a document with one fixed page size
pub struct PdfWriter {
    doc: Document,
    page_size: PageDimensions,
    pages: Vec<PageContent>,
    current: usize,
    images: BTreeMap<String, ObjectId>,
}

impl PdfWriter {
    /// Start a document with a single empty page
    pub fn new(page_size: PageDimensions) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            page_size,
            pages: vec![PageContent::default()],
            current: 0,
            images: BTreeMap::new(),
        }
    }

    /// Append a page and make it current
    pub fn add_page(&mut self) {
        self.pages.push(PageContent::default());
        self.current = self.pages.len() - 1;
    }

    /// Make the 1-based `page` current
    pub fn set_page(&mut self, page: usize) -> Result<()> {
        if page == 0 || page > self.pages.len() {
            return Err(Error::PageOutOfRange {
                page,
                count: self.pages.len(),
            });
        }
        self.current = page - 1;
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based number of the current page
    pub fn current_page(&self) -> usize {
        self.current + 1
    }

    /// Content operators written so far for the 1-based `page`
    pub fn page_content(&self, page: usize) -> Option<&str> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(|p| p.ops.as_str())
    }

    /// Register an image XObject; the handle can be drawn on any number of pages
    pub fn embed_image(&mut self, image: &RasterImage) -> Result<ImageHandle> {
        if image.width == 0 || image.height == 0 {
            return Err(Error::InvalidImage(format!(
                "cannot embed a {}x{} image",
                image.width, image.height
            )));
        }

        let smask = image.alpha.as_ref().map(|alpha| {
            let mut dict = image_dictionary(image.width, image.height);
            dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
            self.doc.add_object(Stream::new(dict, alpha.clone()))
        });

        let mut dict = image_dictionary(image.width, image.height);
        dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        if let Some(smask_id) = smask {
            dict.set("SMask", Object::Reference(smask_id));
        }
        let image_id = self.doc.add_object(Stream::new(dict, image.rgb.clone()));

        let name = format!("Im{}", self.images.len() + 1);
        self.images.insert(name.clone(), image_id);
        Ok(ImageHandle { name })
    }

    /// Draw an embedded image stretched over `rect` on the current page
    pub fn add_image(&mut self, handle: &ImageHandle, rect: Rect) {
        let x = rect.x.pt();
        let y = self.page_size.height.pt() - rect.bottom().pt();
        let page = &mut self.pages[self.current];
        page.ops.push_str("q\n");
        page.ops.push_str(&format!(
            "{} 0 0 {} {} {} cm\n",
            num(rect.width.pt()),
            num(rect.height.pt()),
            num(x),
            num(y)
        ));
        page.ops.push_str(&format!("/{} Do\n", handle.name));
        page.ops.push_str("Q\n");
        page.images.insert(handle.name.clone());
    }

    /// Write `text` with its baseline starting at (`x`, `y`)
    pub fn text(&mut self, text: &str, x: Length, y: Length, style: &TextStyle) {
        let baseline = self.page_size.height.pt() - y.pt();
        let ops = &mut self.pages[self.current].ops;
        ops.push_str("BT\n");
        ops.push_str(&format!(
            "/{} {} Tf\n",
            style.font.resource_name(),
            num(style.size_pt)
        ));
        ops.push_str(&format!("{} rg\n", style.color.operands()));
        ops.push_str(&format!("1 0 0 1 {} {} Tm\n", num(x.pt()), num(baseline)));
        ops.push_str(&format!("({}) Tj\n", escape_pdf_string(text)));
        ops.push_str("ET\n");
    }

    /// Width `text` occupies when written with `style`
    pub fn text_width(&self, text: &str, style: &TextStyle) -> Length {
        style.font.text_width(text, style.size_pt)
    }

    /// Stroke a straight line between two points
    pub fn line(&mut self, from: (Length, Length), to: (Length, Length), style: &LineStyle) {
        let height = self.page_size.height.pt();
        let ops = &mut self.pages[self.current].ops;
        ops.push_str("q\n");
        ops.push_str(&format!("{} RG\n", style.color.operands()));
        ops.push_str(&format!("{} w\n", num(style.width.pt())));
        ops.push_str(&format!("{} {} m\n", num(from.0.pt()), num(height - from.1.pt())));
        ops.push_str(&format!("{} {} l\n", num(to.0.pt()), num(height - to.1.pt())));
        ops.push_str("S\nQ\n");
    }

    /// Assemble the page tree, catalog and info dictionary
    pub fn finish(mut self, info: &DocumentInfo) -> Result<Document> {
        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"Font".to_vec()));
            dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            let font_id = self.doc.add_object(Object::Dictionary(dict));
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }

        let pages_id = self.doc.new_object_id();
        let media_box = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.page_size.width.pt() as f32),
            Object::Real(self.page_size.height.pt() as f32),
        ]);

        let pages = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let content_id = self
                .doc
                .add_object(Stream::new(Dictionary::new(), page.ops.into_bytes()));

            let mut xobjects = Dictionary::new();
            for name in &page.images {
                let image_id = self.images.get(name).ok_or_else(|| {
                    Error::General(format!("image {} used but never embedded", name))
                })?;
                xobjects.set(name.as_str(), Object::Reference(*image_id));
            }

            let mut resources = Dictionary::new();
            resources.set("Font", Object::Dictionary(fonts.clone()));
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("MediaBox", media_box.clone());
            page_dict.set("Resources", Object::Dictionary(resources));
            page_dict.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(self.doc.add_object(Object::Dictionary(page_dict))));
        }

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(kids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));
        self.doc.objects.insert(pages_id, Object::Dictionary(pages_object));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info_dict = Dictionary::new();
        if let Some(ref title) = info.title {
            info_dict.set("Title", Object::string_literal(title.as_str()));
        }
        if let Some(ref producer) = info.producer {
            info_dict.set("Producer", Object::string_literal(producer.as_str()));
        }
        if let Some(created) = info.created {
            let stamp = format!("D:{}", created.format("%Y%m%d%H%M%S"));
            info_dict.set("CreationDate", Object::string_literal(stamp));
        }
        if !info_dict.is_empty() {
            let info_id = self.doc.add_object(Object::Dictionary(info_dict));
            self.doc.trailer.set("Info", Object::Reference(info_id));
        }

        Ok(self.doc)
    }
}

fn image_dictionary(width: u32, height: u32) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, alpha: bool) -> RasterImage {
        let count = (width * height) as usize;
        RasterImage {
            width,
            height,
            rgb: vec![200; count * 3],
            alpha: alpha.then(|| vec![128; count]),
        }
    }

    fn mm(value: f64) -> Length {
        Length::from_mm(value)
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(12.34567), "12.346");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(0.0), "0");
    }

    #[test]
    fn test_starts_with_one_page() {
        let writer = PdfWriter::new(PageDimensions::a4());
        assert_eq!(writer.page_count(), 1);
        assert_eq!(writer.current_page(), 1);
    }

    #[test]
    fn test_set_page_bounds() {
        let mut writer = PdfWriter::new(PageDimensions::a4());
        writer.add_page();
        writer.add_page();
        assert_eq!(writer.current_page(), 3);
        assert!(writer.set_page(2).is_ok());
        assert_eq!(writer.current_page(), 2);
        assert!(matches!(
            writer.set_page(0),
            Err(Error::PageOutOfRange { page: 0, count: 3 })
        ));
        assert!(matches!(
            writer.set_page(4),
            Err(Error::PageOutOfRange { page: 4, count: 3 })
        ));
    }

    #[test]
    fn test_text_lands_on_selected_page() {
        let mut writer = PdfWriter::new(PageDimensions::a4());
        writer.add_page();
        writer.set_page(1).unwrap();
        let style = TextStyle {
            font: Font::Helvetica,
            size_pt: 9.0,
            color: Rgb::gray(128),
        };
        writer.text("first (page)", mm(8.0), mm(10.0), &style);

        let first = writer.page_content(1).unwrap();
        assert!(first.contains("/F1 9 Tf"));
        assert!(first.contains("(first \\(page\\)) Tj"));
        assert_eq!(writer.page_content(2), Some(""));
        assert_eq!(writer.page_content(3), None);
        assert_eq!(writer.page_content(0), None);
    }

    #[test]
    fn test_coordinates_flip_to_bottom_left_origin() {
        let page = PageDimensions {
            width: Length::from_pt(100.0),
            height: Length::from_pt(200.0),
        };
        let mut writer = PdfWriter::new(page);
        let style = LineStyle {
            width: Length::from_pt(1.0),
            color: Rgb::BLACK,
        };
        writer.line(
            (Length::from_pt(10.0), Length::from_pt(50.0)),
            (Length::from_pt(90.0), Length::from_pt(50.0)),
            &style,
        );
        let ops = writer.page_content(1).unwrap();
        assert!(ops.contains("10 150 m\n90 150 l\nS\n"));
        assert!(ops.contains("0 0 0 RG"));
    }

    #[test]
    fn test_image_placement() {
        let page = PageDimensions {
            width: Length::from_pt(100.0),
            height: Length::from_pt(200.0),
        };
        let mut writer = PdfWriter::new(page);
        let handle = writer.embed_image(&solid(2, 2, false)).unwrap();
        assert_eq!(handle.name(), "Im1");
        let rect = Rect::new(
            Length::from_pt(10.0),
            Length::from_pt(20.0),
            Length::from_pt(50.0),
            Length::from_pt(30.0),
        );
        writer.add_image(&handle, rect);
        // Bottom edge sits at 200 - (20 + 30) = 150
        assert!(writer
            .page_content(1)
            .unwrap()
            .contains("50 0 0 30 10 150 cm\n/Im1 Do\n"));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let mut writer = PdfWriter::new(PageDimensions::a4());
        assert!(matches!(
            writer.embed_image(&solid(0, 3, false)),
            Err(Error::InvalidImage(_))
        ));
    }

    #[test]
    fn test_finish_builds_page_tree() {
        let mut writer = PdfWriter::new(PageDimensions::a4());
        let logo = writer.embed_image(&solid(4, 2, true)).unwrap();
        let area = Rect::new(mm(8.0), mm(6.0), mm(20.0), mm(10.0));
        writer.add_image(&logo, area);
        writer.add_page();
        writer.add_image(&logo, area);

        let info = DocumentInfo {
            title: Some("Proposal".to_string()),
            ..Default::default()
        };
        let doc = writer.finish(&info).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        // One RGB image plus its soft mask, shared by both pages
        let images = doc
            .objects
            .values()
            .filter(|obj| match obj {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count();
        assert_eq!(images, 2);

        for page_id in pages.values() {
            let page = doc.get_dictionary(*page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            assert!(xobjects.has(b"Im1"));
        }
    }
}
