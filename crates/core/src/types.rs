//! Domain types for the generated presentation content.

use serde::{Deserialize, Serialize};

/// The structured outline of a presentation, as produced by the generator.
///
/// Immutable once handed to the layout engine. The number of table of
/// contents entries is not required to match the number of slides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTree {
    /// Title shown on the opening slide.
    pub presentation_title: String,

    /// Slide titles in presentation order.
    pub table_of_contents: Vec<String>,

    /// Content slides in presentation order.
    pub slides: Vec<ContentSlide>,

    /// The closing summary slide.
    pub conclusion: Conclusion,
}

impl ContentTree {
    /// Number of slides the layout engine produces for this tree.
    ///
    /// Title, table of contents, one per content slide, conclusion and closing.
    pub fn deck_slide_count(&self) -> usize {
        self.slides.len() + 4
    }

    /// Image search queries in slide order, skipping slides without one.
    pub fn image_queries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.slides.iter().enumerate().filter_map(|(idx, slide)| {
            slide
                .image_query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(|q| (idx, q))
        })
    }
}

/// A single content slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSlide {
    /// Slide heading.
    pub title: String,

    /// Bullet points; three are expected but any number is tolerated.
    #[serde(rename = "content")]
    pub bullets: Vec<String>,

    /// Stock photo search query for this slide, if any.
    #[serde(rename = "image_description", skip_serializing_if = "Option::is_none")]
    pub image_query: Option<String>,
}

impl ContentSlide {
    /// Create a slide with a title and bullets but no image query.
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
            image_query: None,
        }
    }

    /// Attach an image search query.
    pub fn with_image_query(mut self, query: impl Into<String>) -> Self {
        self.image_query = Some(query.into());
        self
    }
}

/// The conclusion slide content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub title: String,

    #[serde(rename = "content")]
    pub bullets: Vec<String>,
}
