//! Deterministic slide layout engine.
//!
//! Turns a content tree, a theme and the set of images that were actually
//! obtained into an ordered list of slide descriptors:
//!
//! Title → Table of Contents → one slide per content entry → Conclusion → Closing
//!
//! Every size threshold below is a fixed breakpoint. Changing one changes the
//! visual output of every deck that crosses it.

use crate::descriptor::{
    Alignment, Emu, Frame, ImageData, ShapeDescriptor, SlideDescriptor, SlideKind, TextRun,
    VerticalAnchor, CANVAS_WIDTH,
};
use crate::media::{image_dimensions, ImageFormat};
use crate::normalize::{display_title, total_chars, BulletNormalizer};
use crate::theme::{Rgb, Theme};
use crate::types::{Conclusion, ContentSlide, ContentTree};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Subtitle shown under the presentation title.
pub const SUBTITLE: &str = "Generated by AI Agent";

/// Heading of the table of contents slide.
pub const TOC_HEADING: &str = "Table of Contents";

/// Message on the closing slide.
pub const CLOSING_MESSAGE: &str = "Thank You";

/// Table of contents switches to two columns above this many entries.
pub const TOC_SINGLE_COLUMN_MAX: usize = 4;

/// Fixed geometry, in canvas units.
mod geometry {
    pub const TITLE_BAR: (f64, f64, f64, f64) = (0.0, 0.0, 10.0, 0.5);
    pub const TITLE_BOX: (f64, f64, f64, f64) = (1.0, 2.0, 8.0, 1.5);
    pub const SUBTITLE_BOX: (f64, f64, f64, f64) = (1.0, 3.5, 8.0, 1.0);

    pub const TOC_HEADING_BOX: (f64, f64, f64, f64) = (0.5, 0.5, 9.0, 1.0);
    pub const TOC_RULE: (f64, f64, f64, f64) = (4.0, 1.5, 2.0, 0.05);
    pub const TOC_SINGLE_BOX: (f64, f64, f64, f64) = (2.0, 2.0, 6.0, 3.0);
    pub const TOC_LEFT_BOX: (f64, f64, f64, f64) = (1.0, 2.0, 4.0, 3.0);
    pub const TOC_RIGHT_BOX: (f64, f64, f64, f64) = (5.5, 2.0, 4.0, 3.0);

    pub const SLIDE_TITLE_BOX: (f64, f64, f64, f64) = (0.5, 0.3, 9.0, 0.8);
    pub const SLIDE_RULE: (f64, f64, f64, f64) = (0.5, 1.1, 9.0, 0.03);

    pub const BODY_X: f64 = 0.5;
    pub const BODY_Y: f64 = 1.4;
    pub const BODY_HEIGHT: f64 = 3.9;
    pub const BODY_FULL_WIDTH: f64 = 9.0;
    pub const BODY_NARROW_WIDTH: f64 = 5.0;

    pub const IMAGE_X: f64 = 6.0;
    pub const IMAGE_Y: f64 = 2.0;
    pub const IMAGE_WIDTH: f64 = 3.5;
    /// Lowest edge a picture may reach.
    pub const IMAGE_MAX_BOTTOM: f64 = 5.3;
    /// Aspect ratio assumed when the image header cannot be read.
    pub const FALLBACK_ASPECT: (i64, i64) = (1200, 627);

    pub const CONCLUSION_BODY_BOX: (f64, f64, f64, f64) = (1.0, 1.5, 8.0, 3.5);

    pub const CLOSING_BOX: (f64, f64, f64, f64) = (2.0, 2.0, 6.0, 2.0);
}

fn frame(rect: (f64, f64, f64, f64)) -> Frame {
    Frame::units(rect.0, rect.1, rect.2, rect.3)
}

/// Font size and paragraph spacing, both in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub font_size: u32,
    pub spacing: u32,
}

impl TextStyle {
    const fn new(font_size: u32, spacing: u32) -> Self {
        Self { font_size, spacing }
    }
}

/// Title slide heading size from its character count.
pub fn title_font_size(chars: usize) -> u32 {
    if chars > 40 {
        32
    } else if chars > 25 {
        38
    } else {
        44
    }
}

/// Table of contents entry style from the number of entries.
pub fn toc_style(items: usize) -> TextStyle {
    if items > 8 {
        TextStyle::new(14, 8)
    } else if items > 5 {
        TextStyle::new(16, 12)
    } else {
        TextStyle::new(20, 14)
    }
}

/// Content slide heading size from its character count.
pub fn content_title_font_size(chars: usize) -> u32 {
    if chars > 50 {
        24
    } else if chars > 35 {
        26
    } else {
        28
    }
}

/// Content slide body style from the summed bullet length.
pub fn content_body_style(total_chars: usize) -> TextStyle {
    if total_chars > 600 {
        TextStyle::new(12, 4)
    } else if total_chars > 400 {
        TextStyle::new(14, 6)
    } else {
        TextStyle::new(16, 8)
    }
}

/// Conclusion body style from the summed bullet length.
///
/// Uses its own bands; conclusions are short and are set larger.
pub fn conclusion_body_style(total_chars: usize) -> TextStyle {
    if total_chars > 500 {
        TextStyle::new(14, 8)
    } else if total_chars > 300 {
        TextStyle::new(16, 10)
    } else {
        TextStyle::new(20, 14)
    }
}

pub const TOC_HEADING_SIZE: u32 = 32;
pub const SUBTITLE_SIZE: u32 = 20;
pub const CONCLUSION_TITLE_SIZE: u32 = 28;
pub const CLOSING_SIZE: u32 = 54;

/// Table of contents column split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocColumns<'a, T> {
    Single(&'a [T]),
    Two(&'a [T], &'a [T]),
}

/// Split entries into columns: two columns strictly above four entries,
/// the first taking the larger half.
pub fn toc_columns<T>(items: &[T]) -> TocColumns<'_, T> {
    if items.len() > TOC_SINGLE_COLUMN_MAX {
        let mid = items.len().div_ceil(2);
        let (left, right) = items.split_at(mid);
        TocColumns::Two(left, right)
    } else {
        TocColumns::Single(items)
    }
}

/// Images obtained for content slides, keyed by 0-based content slide index.
///
/// A slide absent from the map renders as if no image was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideImages {
    images: BTreeMap<usize, Arc<[u8]>>,
}

impl SlideImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slide_index: usize, bytes: impl Into<Arc<[u8]>>) {
        self.images.insert(slide_index, bytes.into());
    }

    pub fn get(&self, slide_index: usize) -> Option<&Arc<[u8]>> {
        self.images.get(&slide_index)
    }
}

/// Lays out complete decks for one theme.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    theme: Theme,
    normalizer: BulletNormalizer,
}

impl LayoutEngine {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            normalizer: BulletNormalizer::new(),
        }
    }

    /// Lay out every slide of the deck, in presentation order.
    pub fn layout(&self, tree: &ContentTree, images: &SlideImages) -> Vec<SlideDescriptor> {
        let mut slides = Vec::with_capacity(tree.deck_slide_count());

        slides.push(self.title_slide(&tree.presentation_title));
        slides.push(self.toc_slide(&tree.table_of_contents));
        for (idx, slide) in tree.slides.iter().enumerate() {
            slides.push(self.content_slide(idx, slide, images.get(idx)));
        }
        slides.push(self.conclusion_slide(&tree.conclusion));
        slides.push(self.closing_slide());

        slides
    }

    fn title_slide(&self, title: &str) -> SlideDescriptor {
        let mut slide = SlideDescriptor::new(SlideKind::Title);
        let primary = self.theme.primary;

        slide.push(ShapeDescriptor::Rectangle {
            frame: frame(geometry::TITLE_BAR),
            fill: primary,
        });

        let title = display_title(title, "Presentation");
        let size = title_font_size(title.chars().count());
        slide.push(text_box(
            frame(geometry::TITLE_BOX),
            vec![TextRun::new(title, size, primary)
                .bold()
                .aligned(Alignment::Center)],
        ));

        slide.push(text_box(
            frame(geometry::SUBTITLE_BOX),
            vec![TextRun::new(SUBTITLE, SUBTITLE_SIZE, self.theme.secondary)
                .aligned(Alignment::Center)],
        ));

        slide
    }

    fn toc_slide(&self, entries: &[String]) -> SlideDescriptor {
        let mut slide = SlideDescriptor::new(SlideKind::TableOfContents);
        let primary = self.theme.primary;

        slide.push(text_box(
            frame(geometry::TOC_HEADING_BOX),
            vec![TextRun::new(TOC_HEADING, TOC_HEADING_SIZE, primary)
                .bold()
                .aligned(Alignment::Center)],
        ));
        slide.push(ShapeDescriptor::Rectangle {
            frame: frame(geometry::TOC_RULE),
            fill: primary,
        });

        let entries = self.normalizer.normalize(entries);
        let style = toc_style(entries.len());

        match toc_columns(&entries) {
            TocColumns::Two(left, right) => {
                slide.push(text_box(
                    frame(geometry::TOC_LEFT_BOX),
                    self.toc_runs(left, style),
                ));
                slide.push(text_box(
                    frame(geometry::TOC_RIGHT_BOX),
                    self.toc_runs(right, style),
                ));
            }
            TocColumns::Single(all) => {
                slide.push(text_box(
                    frame(geometry::TOC_SINGLE_BOX),
                    self.toc_runs(all, style),
                ));
            }
        }

        slide
    }

    fn toc_runs(&self, entries: &[String], style: TextStyle) -> Vec<TextRun> {
        entries
            .iter()
            .map(|entry| {
                TextRun::new(
                    self.normalizer.format_bullet(entry),
                    style.font_size,
                    self.theme.secondary,
                )
                .space_after(style.spacing)
            })
            .collect()
    }

    fn content_slide(
        &self,
        index: usize,
        content: &ContentSlide,
        image: Option<&Arc<[u8]>>,
    ) -> SlideDescriptor {
        let mut slide = SlideDescriptor::new(SlideKind::Content(index));
        let primary = self.theme.primary;

        let title = display_title(&content.title, "Slide");
        let title_size = content_title_font_size(title.chars().count());
        self.push_heading(&mut slide, TextRun::new(title.clone(), title_size, primary).bold());

        let picture = image.and_then(|bytes| place_image(bytes, &title));
        let body_width = if picture.is_some() {
            geometry::BODY_NARROW_WIDTH
        } else {
            geometry::BODY_FULL_WIDTH
        };

        let bullets = self.normalizer.normalize(&content.bullets);
        let style = content_body_style(total_chars(&bullets));
        let runs = bullets
            .iter()
            .map(|b| {
                TextRun::new(
                    self.normalizer.format_bullet(b),
                    style.font_size,
                    self.theme.secondary,
                )
                .space_before(style.spacing)
                .space_after(style.spacing)
            })
            .collect();

        slide.push(text_box(
            Frame::units(
                geometry::BODY_X,
                geometry::BODY_Y,
                body_width,
                geometry::BODY_HEIGHT,
            ),
            runs,
        ));

        if let Some(picture) = picture {
            slide.push(picture);
        }

        slide
    }

    fn conclusion_slide(&self, conclusion: &Conclusion) -> SlideDescriptor {
        let mut slide = SlideDescriptor::new(SlideKind::Conclusion);

        let title = display_title(&conclusion.title, "Conclusion");
        self.push_heading(
            &mut slide,
            TextRun::new(title, CONCLUSION_TITLE_SIZE, self.theme.primary).bold(),
        );

        let points = self.normalizer.normalize(&conclusion.bullets);
        let style = conclusion_body_style(total_chars(&points));
        let runs = points
            .iter()
            .map(|p| {
                TextRun::new(
                    self.normalizer.format_bullet(p),
                    style.font_size,
                    self.theme.secondary,
                )
                .space_after(style.spacing)
            })
            .collect();

        slide.push(text_box(frame(geometry::CONCLUSION_BODY_BOX), runs));
        slide
    }

    fn closing_slide(&self) -> SlideDescriptor {
        let mut slide = SlideDescriptor::new(SlideKind::Closing);

        slide.push(ShapeDescriptor::Background {
            color: self.theme.primary,
        });
        slide.push(text_box(
            frame(geometry::CLOSING_BOX),
            vec![TextRun::new(CLOSING_MESSAGE, CLOSING_SIZE, Rgb::WHITE)
                .bold()
                .aligned(Alignment::Center)],
        ));

        slide
    }

    /// Slide heading followed by the separator rule directly beneath it.
    fn push_heading(&self, slide: &mut SlideDescriptor, heading: TextRun) {
        slide.push(text_box(frame(geometry::SLIDE_TITLE_BOX), vec![heading]));
        slide.push(ShapeDescriptor::Rectangle {
            frame: frame(geometry::SLIDE_RULE),
            fill: self.theme.primary,
        });
    }
}

/// Lay out a deck with a fresh engine for `theme`.
pub fn layout_deck(tree: &ContentTree, theme: &Theme, images: &SlideImages) -> Vec<SlideDescriptor> {
    LayoutEngine::new(*theme).layout(tree, images)
}

fn text_box(frame: Frame, paragraphs: Vec<TextRun>) -> ShapeDescriptor {
    ShapeDescriptor::TextBox {
        frame,
        anchor: VerticalAnchor::Top,
        paragraphs,
    }
}

/// Build the picture shape for a content slide.
///
/// Returns `None` for payloads that are not a supported image format, in
/// which case the slide keeps its full-width text.
fn place_image(bytes: &Arc<[u8]>, description: &str) -> Option<ShapeDescriptor> {
    let Some(format) = ImageFormat::from_magic(bytes) else {
        log::warn!(
            "Image for '{}' is not PNG, JPEG or GIF ({} bytes); laying out without it",
            description,
            bytes.len()
        );
        return None;
    };

    let (px_w, px_h) = image_dimensions(bytes)
        .map(|(w, h)| (w as i64, h as i64))
        .unwrap_or(geometry::FALLBACK_ASPECT);

    let max_width = Emu::from_units(geometry::IMAGE_WIDTH).0;
    let max_height = Emu::from_units(geometry::IMAGE_MAX_BOTTOM - geometry::IMAGE_Y).0;

    let mut width = max_width;
    let mut height = width * px_h / px_w;
    if height > max_height {
        height = max_height;
        width = height * px_w / px_h;
    }

    debug_assert!(Emu::from_units(geometry::IMAGE_X).0 + width <= Emu::from_units(CANVAS_WIDTH).0);

    Some(ShapeDescriptor::Picture {
        frame: Frame {
            x: Emu::from_units(geometry::IMAGE_X),
            y: Emu::from_units(geometry::IMAGE_Y),
            width: Emu(width),
            height: Emu(height),
        },
        image: ImageData {
            bytes: Arc::clone(bytes),
            format,
        },
        description: description.to_string(),
    })
}
