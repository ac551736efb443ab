//! Band planning: slicing a tall bitmap into page-sized strips
//!
//! The source bitmap is scaled once so its width fills the usable page width.
//! A cursor then walks down the scaled image, handing out one band of at most
//! `usable_height` per page until the whole image has been emitted.

use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::{Length, PageGeometry};

/// Remaining heights below this (in mm) count as fully rendered
pub const EPSILON_MM: f64 = 1e-6;

/// One page's slice of the source bitmap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// 1-based page number this band is drawn on
    pub page: usize,
    /// First source row (inclusive)
    pub row_start: u32,
    /// Last source row (exclusive)
    pub row_end: u32,
    /// Height of the band on the page
    pub draw_height: Length,
}

impl Band {
    pub fn rows(&self) -> u32 {
        self.row_end - self.row_start
    }
}

/// Tracks how much of the source has been consumed
///
/// `rendered_height == source_y * scale` holds after every advance.
#[derive(Debug, Clone, Copy)]
pub struct RenderCursor {
    scale: f64,
    source_y: f64,
    rendered_height: f64,
}

impl RenderCursor {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            source_y: 0.0,
            rendered_height: 0.0,
        }
    }

    /// Source pixels consumed so far (fractional)
    pub fn source_y(&self) -> f64 {
        self.source_y
    }

    /// Physical height emitted so far, in mm
    pub fn rendered_height(&self) -> f64 {
        self.rendered_height
    }

    pub fn advance(&mut self, draw_height_mm: f64) {
        self.rendered_height += draw_height_mm;
        self.source_y += draw_height_mm / self.scale;
    }
}

/// Complete pagination of one source bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// Physical units (mm) per source pixel
    pub scale: f64,
    pub total_height: Length,
    pub usable_height: Length,
    pub bands: Vec<Band>,
}

impl PagePlan {
    /// Number of pages the export produces
    ///
    /// An image with no rows still produces one page carrying only the
    /// header and footer.
    pub fn page_count(&self) -> usize {
        self.bands.len().max(1)
    }
}

/// Row boundary for a fractional source offset
///
/// Every band edge goes through this one function so adjacent bands agree
/// on the shared row. Flooring keeps every edge before the last strictly
/// below `height`, so the final band always owns at least one row.
fn row_boundary(source_y: f64, height: u32) -> u32 {
    source_y.floor().clamp(0.0, height as f64) as u32
}

/// Plan the bands for a `width` × `height` pixel source on the given geometry
pub fn plan(width: u32, height: u32, geometry: &PageGeometry) -> Result<PagePlan> {
    geometry.validate()?;
    if width == 0 {
        return Err(Error::InvalidImage("source image has zero width".to_string()));
    }

    let usable_width = geometry.usable_width().mm();
    let usable_height = geometry.usable_height().mm();
    let scale = usable_width / width as f64;
    let total_height = height as f64 * scale;

    if height > 0 && usable_height / scale < 1.0 {
        return Err(Error::InvalidImage(format!(
            "a {}px wide image is scaled so far that a page holds less than one row",
            width
        )));
    }

    let mut cursor = RenderCursor::new(scale);
    let mut bands = Vec::new();

    while total_height - cursor.rendered_height() > EPSILON_MM {
        let remaining = total_height - cursor.rendered_height();
        let draw_height = usable_height.min(remaining);

        let row_start = row_boundary(cursor.source_y(), height);
        cursor.advance(draw_height);
        let last = total_height - cursor.rendered_height() <= EPSILON_MM;
        let row_end = if last {
            height
        } else {
            row_boundary(cursor.source_y(), height)
        };

        let band = Band {
            page: bands.len() + 1,
            row_start,
            row_end,
            draw_height: Length::from_mm(draw_height),
        };
        debug!(
            page = band.page,
            rows = ?(band.row_start..band.row_end),
            draw_height_mm = draw_height,
            "planned band"
        );
        bands.push(band);
    }

    Ok(PagePlan {
        scale,
        total_height: Length::from_mm(total_height),
        usable_height: Length::from_mm(usable_height),
        bands,
    })
}
