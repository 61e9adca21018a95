//! PPTX (Office Open XML) backend: writes laid-out slides into a `.pptx`
//! package and reads the text of written decks back.
//!
//! A `.pptx` file is a ZIP archive of XML parts.

mod package;
pub mod reader;
pub mod renderer;
mod slide;

pub use reader::{DeckReader, DeckSlide};
pub use renderer::{write_package, PptxRenderer, FILE_PREFIX};
