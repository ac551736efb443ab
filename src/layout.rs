//! Page layout calculations

use std::ops::{Add, Sub};

use crate::error::{Error, Result};

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(11.0),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// Look up a named paper size (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "a4" => Some(Self::a4()),
            "letter" | "us-letter" => Some(Self::letter()),
            _ => None,
        }
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::a4()
    }
}

/// Axis-aligned rectangle measured from the top-left corner of the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: Length,
    pub y: Length,
    pub width: Length,
    pub height: Length,
}

impl Rect {
    pub fn new(x: Length, y: Length, width: Length, height: Length) -> Self {
        Self { x, y, width, height }
    }

    /// Bottom edge, measured from the top of the page
    pub fn bottom(&self) -> Length {
        self.y + self.height
    }
}

/// Page geometry shared by every page of an export
///
/// The body band sits between a header zone at the top of the page and a
/// footer zone at the bottom, inset horizontally by `margin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page: PageDimensions,
    pub margin: Length,
    pub header_height: Length,
    pub footer_height: Length,
    /// Gap between the header zone and the top of the body band
    pub content_gap: Length,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page: PageDimensions::a4(),
            margin: Length::from_mm(8.0),
            header_height: Length::from_mm(28.0),
            footer_height: Length::from_mm(15.0),
            content_gap: Length::from_mm(4.0),
        }
    }
}

impl PageGeometry {
    /// Check that the geometry leaves a positive body area
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("margin", self.margin),
            ("header height", self.header_height),
            ("footer height", self.footer_height),
            ("content gap", self.content_gap),
        ];
        for (name, length) in lengths {
            if !length.mm().is_finite() || length.mm() < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "{} must be a non-negative length, got {}mm",
                    name,
                    length.mm()
                )));
            }
        }
        if self.usable_width().mm() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "margins of {}mm leave no usable width on a {}mm page",
                self.margin.mm(),
                self.page.width.mm()
            )));
        }
        if self.usable_height().mm() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "header ({}mm) and footer ({}mm) leave no usable height on a {}mm page",
                self.header_height.mm(),
                self.footer_height.mm(),
                self.page.height.mm()
            )));
        }
        Ok(())
    }

    /// Page width minus both side margins
    pub fn usable_width(&self) -> Length {
        self.page.width - self.margin - self.margin
    }

    /// Page height minus header and footer zones
    pub fn usable_height(&self) -> Length {
        self.page.height - self.header_height - self.footer_height
    }

    /// Top edge of the body band
    pub fn content_top(&self) -> Length {
        self.header_height + self.content_gap
    }

    /// Rectangle occupied by a body band of the given height
    pub fn band_rect(&self, draw_height: Length) -> Rect {
        Rect::new(self.margin, self.content_top(), self.usable_width(), draw_height)
    }
}
