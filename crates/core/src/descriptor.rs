//! Slide descriptors: the immutable output of the layout engine.
//!
//! Positions are stored as integer EMUs (914400 per unit) so that two layout
//! passes over the same input compare byte for byte.

use crate::media::ImageFormat;
use crate::theme::Rgb;
use std::sync::Arc;

/// EMUs per canvas length unit (one inch).
pub const EMU_PER_UNIT: i64 = 914_400;

/// EMUs per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Canvas width in length units.
pub const CANVAS_WIDTH: f64 = 10.0;

/// Canvas height in length units (16:9).
pub const CANVAS_HEIGHT: f64 = 5.625;

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Emu(pub i64);

impl Emu {
    /// Convert canvas units to EMUs, rounding to the nearest EMU.
    pub fn from_units(units: f64) -> Self {
        Self((units * EMU_PER_UNIT as f64).round() as i64)
    }

    pub fn from_points(points: u32) -> Self {
        Self(points as i64 * EMU_PER_POINT)
    }
}

/// Position and size of a shape on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub x: Emu,
    pub y: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Frame {
    /// Build a frame from canvas units.
    pub fn units(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Emu::from_units(x),
            y: Emu::from_units(y),
            width: Emu::from_units(width),
            height: Emu::from_units(height),
        }
    }

    pub fn right(&self) -> Emu {
        Emu(self.x.0 + self.width.0)
    }

    pub fn bottom(&self) -> Emu {
        Emu(self.y.0 + self.height.0)
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchoring of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// One styled paragraph of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextRun {
    pub text: String,
    /// Font size in points.
    pub font_size: u32,
    pub bold: bool,
    pub color: Rgb,
    pub alignment: Alignment,
    /// Space before the paragraph in points.
    pub space_before: Option<u32>,
    /// Space after the paragraph in points.
    pub space_after: Option<u32>,
    pub indent_level: u8,
}

impl TextRun {
    /// A left-aligned, regular-weight run.
    pub fn new(text: impl Into<String>, font_size: u32, color: Rgb) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold: false,
            color,
            alignment: Alignment::Left,
            space_before: None,
            space_after: None,
            indent_level: 0,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn space_before(mut self, points: u32) -> Self {
        self.space_before = Some(points);
        self
    }

    pub fn space_after(mut self, points: u32) -> Self {
        self.space_after = Some(points);
        self
    }
}

/// Image bytes shared between the caller and the descriptors built from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageData {
    pub bytes: Arc<[u8]>,
    pub format: ImageFormat,
}

/// A single drawable element of a slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeDescriptor {
    /// Solid fill behind every other shape on the slide.
    Background { color: Rgb },

    /// Borderless filled rectangle (title bars and separator rules).
    Rectangle { frame: Frame, fill: Rgb },

    /// Word-wrapped text box of one or more paragraphs.
    TextBox {
        frame: Frame,
        anchor: VerticalAnchor,
        paragraphs: Vec<TextRun>,
    },

    /// Embedded picture, stretched to its frame.
    Picture {
        frame: Frame,
        image: ImageData,
        description: String,
    },
}

impl ShapeDescriptor {
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Self::Background { .. } => None,
            Self::Rectangle { frame, .. }
            | Self::TextBox { frame, .. }
            | Self::Picture { frame, .. } => Some(frame),
        }
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, Self::Picture { .. })
    }

    pub fn paragraphs(&self) -> Option<&[TextRun]> {
        match self {
            Self::TextBox { paragraphs, .. } => Some(paragraphs),
            _ => None,
        }
    }
}

/// Which part of the presentation a slide belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideKind {
    Title,
    TableOfContents,
    /// Content slide, carrying its 0-based index into the content tree.
    Content(usize),
    Conclusion,
    Closing,
}

/// The laid-out description of one slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlideDescriptor {
    pub kind: SlideKind,
    /// Shapes in z-order, back to front.
    pub shapes: Vec<ShapeDescriptor>,
}

impl SlideDescriptor {
    pub fn new(kind: SlideKind) -> Self {
        Self {
            kind,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: ShapeDescriptor) {
        self.shapes.push(shape);
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = (&Frame, &[TextRun])> {
        self.shapes.iter().filter_map(|s| match s {
            ShapeDescriptor::TextBox {
                frame, paragraphs, ..
            } => Some((frame, paragraphs.as_slice())),
            _ => None,
        })
    }

    pub fn pictures(&self) -> impl Iterator<Item = &ShapeDescriptor> {
        self.shapes.iter().filter(|s| s.is_picture())
    }

    pub fn has_picture(&self) -> bool {
        self.shapes.iter().any(ShapeDescriptor::is_picture)
    }

    /// Every text run on the slide, in shape order.
    pub fn texts(&self) -> Vec<&str> {
        self.text_boxes()
            .flat_map(|(_, runs)| runs.iter().map(|r| r.text.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_conversions() {
        assert_eq!(Emu::from_units(1.0), Emu(914_400));
        assert_eq!(Emu::from_units(10.0), Emu(9_144_000));
        assert_eq!(Emu::from_units(5.625), Emu(5_143_500));
        assert_eq!(Emu::from_units(0.03), Emu(27_432));
        assert_eq!(Emu::from_points(2), Emu(25_400));
    }

    #[test]
    fn test_frame_edges() {
        let frame = Frame::units(0.5, 1.4, 9.0, 3.9);
        assert_eq!(frame.right(), Emu::from_units(9.5));
        assert_eq!(frame.bottom(), Emu(Emu::from_units(1.4).0 + Emu::from_units(3.9).0));
        assert_eq!(Frame::units(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT).bottom(), Emu(5_143_500));
    }

    #[test]
    fn test_text_run_builders() {
        let run = TextRun::new("Hello", 20, Rgb::WHITE)
            .bold()
            .aligned(Alignment::Center)
            .space_before(4)
            .space_after(6);
        assert!(run.bold);
        assert_eq!(run.alignment, Alignment::Center);
        assert_eq!(run.space_before, Some(4));
        assert_eq!(run.space_after, Some(6));
        assert_eq!(run.indent_level, 0);
    }
}
