//! Core domain types, content validation, and the deterministic slide
//! layout engine for generated presentations.

pub mod descriptor;
pub mod error;
pub mod layout;
pub mod media;
pub mod normalize;
pub mod outline;
pub mod pipeline;
pub mod theme;
pub mod types;
pub mod validate;

pub use descriptor::{
    Alignment, Emu, Frame, ImageData, ShapeDescriptor, SlideDescriptor, SlideKind, TextRun,
    VerticalAnchor,
};
pub use error::{Error, Result};
pub use layout::{layout_deck, LayoutEngine, SlideImages};
pub use media::ImageFormat;
pub use normalize::BulletNormalizer;
pub use outline::OutlineFormatter;
pub use pipeline::{build_presentation, DeckRenderer, ImageProvider, RenderOptions};
pub use theme::{Rgb, Theme};
pub use types::{Conclusion, ContentSlide, ContentTree};
pub use validate::{is_error_output, parse_content};
