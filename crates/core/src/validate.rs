//! Structural validation of generated presentation content.
//!
//! Generator output is accepted loosely: missing titles become empty strings
//! and missing bullet lists become empty lists. Only text that is not a JSON
//! object of the expected shape is rejected.

use crate::error::{Error, Result};
use crate::types::{Conclusion, ContentSlide, ContentTree};
use serde::Deserialize;

/// Prefix the generator uses for error messages in place of content.
pub const ERROR_MARKER: &str = "Error:";

/// Whether generator output is an error message rather than content.
pub fn is_error_output(raw: &str) -> bool {
    raw.trim_start().starts_with(ERROR_MARKER)
}

/// Parse generator output into a content tree.
///
/// Output beginning with [`ERROR_MARKER`] is returned verbatim as a
/// [`Error::GenerationFailure`] and never parsed.
pub fn parse_content(raw: &str) -> Result<ContentTree> {
    if is_error_output(raw) {
        return Err(Error::GenerationFailure(raw.trim().to_string()));
    }

    let body = strip_json_fences(raw);
    if body.is_empty() {
        return Err(Error::MalformedContent("content is empty".to_string()));
    }

    let raw_tree: RawTree =
        serde_json::from_str(body).map_err(|e| Error::MalformedContent(e.to_string()))?;

    let tree = raw_tree.into_tree();
    log::debug!(
        "Parsed content: {} content slides, {} table of contents entries",
        tree.slides.len(),
        tree.table_of_contents.len()
    );
    if tree.slides.len() != tree.table_of_contents.len() {
        log::info!(
            "Table of contents has {} entries for {} slides; rendering both as given",
            tree.table_of_contents.len(),
            tree.slides.len()
        );
    }

    Ok(tree)
}

/// Strips ```json ... ``` or ``` ... ``` fences some models wrap around JSON.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

// Wire shapes with every field optional; `null` is treated like absent.

#[derive(Debug, Default, Deserialize)]
struct RawTree {
    #[serde(default)]
    presentation_title: Option<String>,
    #[serde(default)]
    table_of_contents: Option<Vec<String>>,
    #[serde(default)]
    slides: Option<Vec<RawSlide>>,
    #[serde(default)]
    conclusion: Option<RawConclusion>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSlide {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<Vec<String>>,
    #[serde(default)]
    image_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConclusion {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<Vec<String>>,
}

impl RawTree {
    fn into_tree(self) -> ContentTree {
        ContentTree {
            presentation_title: self.presentation_title.unwrap_or_default(),
            table_of_contents: self.table_of_contents.unwrap_or_default(),
            slides: self
                .slides
                .unwrap_or_default()
                .into_iter()
                .map(|s| ContentSlide {
                    title: s.title.unwrap_or_default(),
                    bullets: s.content.unwrap_or_default(),
                    image_query: s.image_description,
                })
                .collect(),
            conclusion: self
                .conclusion
                .map(|c| Conclusion {
                    title: c.title.unwrap_or_default(),
                    bullets: c.content.unwrap_or_default(),
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "presentation_title": "Intro to Graph Theory",
        "table_of_contents": ["Vertices", "Edges"],
        "slides": [
            {"title": "Vertices", "content": ["a", "b", "c"], "image_description": "network"},
            {"title": "Edges", "content": ["d"]}
        ],
        "conclusion": {"title": "Summary", "content": ["x", "y"]}
    }"#;

    #[test]
    fn test_parse_full_tree() {
        let tree = parse_content(FULL).unwrap();
        assert_eq!(tree.presentation_title, "Intro to Graph Theory");
        assert_eq!(tree.table_of_contents, vec!["Vertices", "Edges"]);
        assert_eq!(tree.slides.len(), 2);
        assert_eq!(tree.slides[0].bullets, vec!["a", "b", "c"]);
        assert_eq!(tree.slides[0].image_query.as_deref(), Some("network"));
        assert_eq!(tree.slides[1].image_query, None);
        assert_eq!(tree.conclusion.title, "Summary");
        assert_eq!(tree.conclusion.bullets, vec!["x", "y"]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let tree = parse_content(r#"{"slides": [{"image_description": "cats"}, {"title": null}]}"#)
            .unwrap();
        assert_eq!(tree.presentation_title, "");
        assert!(tree.table_of_contents.is_empty());
        assert_eq!(tree.slides[0].title, "");
        assert!(tree.slides[0].bullets.is_empty());
        assert_eq!(tree.slides[0].image_query.as_deref(), Some("cats"));
        assert_eq!(tree.slides[1].title, "");
        assert_eq!(tree.conclusion, Conclusion::default());

        let empty = parse_content("{}").unwrap();
        assert_eq!(empty, ContentTree::default());
    }

    #[test]
    fn test_malformed_content_rejected() {
        for raw in ["", "   ", "not json", "[1, 2, 3]", r#"{"slides": "nope"}"#, "{\"a\": "] {
            match parse_content(raw) {
                Err(Error::MalformedContent(_)) => {}
                other => panic!("expected MalformedContent for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_error_marker_is_not_parsed() {
        let raw = "Error: Groq client not initialized";
        match parse_content(raw) {
            Err(Error::GenerationFailure(msg)) => assert_eq!(msg, raw),
            other => panic!("expected GenerationFailure, got {:?}", other),
        }
        assert!(is_error_output("  Error: rate limited"));
        assert!(!is_error_output(r#"{"presentation_title": "Error: handling"}"#));
    }

    #[test]
    fn test_fenced_json_accepted() {
        let fenced = format!("```json\n{}\n```", FULL);
        assert_eq!(parse_content(&fenced).unwrap().slides.len(), 2);

        let bare_fence = format!("```\n{}\n```", FULL);
        assert_eq!(parse_content(&bare_fence).unwrap().slides.len(), 2);
    }

    #[test]
    fn test_toc_mismatch_tolerated() {
        let tree = parse_content(
            r#"{"table_of_contents": ["A", "B", "C"], "slides": [{"title": "A", "content": []}]}"#,
        )
        .unwrap();
        assert_eq!(tree.table_of_contents.len(), 3);
        assert_eq!(tree.slides.len(), 1);
    }
}
