//! The synchronous render pipeline and the seams to its collaborators.
//!
//! validate → per content slide, in order: image lookup → layout → render
//!
//! Validation and render failures abort the call. Image failures never do;
//! a slide without an image is laid out with full-width text.

use crate::descriptor::SlideDescriptor;
use crate::error::Result;
use crate::layout::{LayoutEngine, SlideImages};
use crate::theme::Theme;
use crate::types::ContentTree;
use crate::validate::parse_content;
use std::path::PathBuf;

/// Source of slide images.
///
/// Returns `None` when no usable image could be obtained; that is an
/// expected outcome, not a failure.
pub trait ImageProvider {
    fn fetch_image(&self, query: &str) -> Option<Vec<u8>>;
}

/// Writes laid-out slides to a persisted deck file.
pub trait DeckRenderer {
    /// Render the slides and return the path of the written file.
    fn render(&self, slides: &[SlideDescriptor], theme: &Theme) -> Result<PathBuf>;
}

/// Options for one render call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    /// When false no image is looked up and every slide gets full-width text.
    pub include_images: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            include_images: true,
        }
    }
}

impl RenderOptions {
    /// Options for a user-supplied theme colour string.
    pub fn with_theme_color(color: &str) -> Self {
        Self {
            theme: Theme::from_hex_or_default(color),
            ..Self::default()
        }
    }

    pub fn include_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }
}

/// Fetch images for every content slide that has a query, strictly in order.
pub fn collect_images(tree: &ContentTree, provider: &dyn ImageProvider) -> SlideImages {
    let mut images = SlideImages::new();

    for (idx, query) in tree.image_queries() {
        match provider.fetch_image(query) {
            Some(bytes) => {
                log::debug!("Slide {}: got {} image bytes for '{}'", idx + 1, bytes.len(), query);
                images.insert(idx, bytes);
            }
            None => log::info!("Slide {}: no image for '{}', using full-width text", idx + 1, query),
        }
    }

    images
}

/// Lay out a validated tree, fetching images through `provider` when enabled.
pub fn layout_presentation(
    tree: &ContentTree,
    options: &RenderOptions,
    provider: Option<&dyn ImageProvider>,
) -> Vec<SlideDescriptor> {
    let images = match provider {
        Some(provider) if options.include_images => collect_images(tree, provider),
        _ => SlideImages::new(),
    };

    LayoutEngine::new(options.theme).layout(tree, &images)
}

/// Run the full pipeline on raw generator output and write a deck.
pub fn build_presentation(
    raw_content: &str,
    options: &RenderOptions,
    provider: Option<&dyn ImageProvider>,
    renderer: &dyn DeckRenderer,
) -> Result<PathBuf> {
    let tree = parse_content(raw_content)?;
    let slides = layout_presentation(&tree, options, provider);

    let path = renderer.render(&slides, &options.theme)?;
    log::info!("Wrote {} slides to {}", slides.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Emu, SlideKind};
    use crate::error::Error;
    use crate::media::fixtures::png_image;
    use crate::theme::Rgb;
    use std::cell::RefCell;

    /// Serves an image for queries it knows and records every lookup.
    struct FakeImages {
        known: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeImages {
        fn new(known: Vec<&'static str>) -> Self {
            Self {
                known,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageProvider for FakeImages {
        fn fetch_image(&self, query: &str) -> Option<Vec<u8>> {
            self.calls.borrow_mut().push(query.to_string());
            self.known.contains(&query).then(|| png_image(1200, 627))
        }
    }

    /// Keeps the slides it was given instead of writing a file.
    #[derive(Default)]
    struct CapturingRenderer {
        slides: RefCell<Vec<SlideDescriptor>>,
        primary: RefCell<Option<Rgb>>,
    }

    impl DeckRenderer for CapturingRenderer {
        fn render(&self, slides: &[SlideDescriptor], theme: &Theme) -> Result<PathBuf> {
            *self.slides.borrow_mut() = slides.to_vec();
            *self.primary.borrow_mut() = Some(theme.primary);
            Ok(PathBuf::from("captured.pptx"))
        }
    }

    struct FailingRenderer;

    impl DeckRenderer for FailingRenderer {
        fn render(&self, _slides: &[SlideDescriptor], _theme: &Theme) -> Result<PathBuf> {
            Err(Error::RenderFailure("disk full".to_string()))
        }
    }

    const DRAFT: &str = r#"{
        "presentation_title": "Birds",
        "table_of_contents": ["Owls", "Hawks", "Wrens"],
        "slides": [
            {"title": "Owls", "content": ["Nocturnal"], "image_description": "owl"},
            {"title": "Hawks", "content": ["Raptors"], "image_description": "hawk"},
            {"title": "Wrens", "content": ["Tiny"]}
        ],
        "conclusion": {"title": "Done", "content": ["Birds are neat"]}
    }"#;

    fn body_width(slide: &SlideDescriptor) -> Emu {
        slide.text_boxes().nth(1).unwrap().0.width
    }

    #[test]
    fn test_images_fetched_in_order_and_missing_ones_degrade() {
        let images = FakeImages::new(vec!["owl"]);
        let renderer = CapturingRenderer::default();

        let path = build_presentation(
            DRAFT,
            &RenderOptions::with_theme_color("#FF0000"),
            Some(&images),
            &renderer,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("captured.pptx"));

        assert_eq!(*images.calls.borrow(), vec!["owl", "hawk"]);

        let slides = renderer.slides.borrow();
        assert_eq!(slides.len(), 7);
        assert_eq!(slides[2].kind, SlideKind::Content(0));
        assert!(slides[2].has_picture());
        assert_eq!(body_width(&slides[2]), Emu::from_units(5.0));
        assert!(!slides[3].has_picture());
        assert_eq!(body_width(&slides[3]), Emu::from_units(9.0));
        assert!(!slides[4].has_picture());
        assert_eq!(*renderer.primary.borrow(), Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_images_disabled_skips_provider() {
        let images = FakeImages::new(vec!["owl", "hawk"]);
        let renderer = CapturingRenderer::default();
        let options = RenderOptions::default().include_images(false);

        build_presentation(DRAFT, &options, Some(&images), &renderer).unwrap();

        assert!(images.calls.borrow().is_empty());
        assert!(renderer.slides.borrow().iter().all(|s| !s.has_picture()));
    }

    #[test]
    fn test_no_provider_lays_out_without_images() {
        let renderer = CapturingRenderer::default();
        build_presentation(DRAFT, &RenderOptions::default(), None, &renderer).unwrap();
        assert!(renderer.slides.borrow().iter().all(|s| !s.has_picture()));
    }

    #[test]
    fn test_malformed_content_aborts_before_render() {
        let renderer = CapturingRenderer::default();
        let result = build_presentation("{oops", &RenderOptions::default(), None, &renderer);

        assert!(matches!(result, Err(Error::MalformedContent(_))));
        assert!(renderer.slides.borrow().is_empty());
    }

    #[test]
    fn test_generation_error_surfaces_verbatim() {
        let renderer = CapturingRenderer::default();
        let result = build_presentation(
            "Error: model overloaded",
            &RenderOptions::default(),
            None,
            &renderer,
        );

        match result {
            Err(Error::GenerationFailure(msg)) => assert_eq!(msg, "Error: model overloaded"),
            other => panic!("expected GenerationFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_render_failure_surfaces() {
        let result = build_presentation(DRAFT, &RenderOptions::default(), None, &FailingRenderer);
        match result {
            Err(e @ Error::RenderFailure(_)) => {
                assert_eq!(e.to_string(), "Failed to render presentation: disk full")
            }
            other => panic!("expected RenderFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_theme_colour_falls_back() {
        let options = RenderOptions::with_theme_color("notacolor");
        assert_eq!(options.theme.primary, Rgb::new(0, 51, 102));
        assert!(options.include_images);
    }
}
