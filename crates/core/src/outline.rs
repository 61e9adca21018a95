//! Plain text rendering of a draft outline for review.
//!
//! Sections are separated by a blank line:
//!
//! ```text
//! # Intro to Graph Theory
//!
//! Contents:
//!   1. Vertices
//!   2. Edges
//!
//! [1] Vertices
//!   - A vertex is a point
//!   (image: network diagram)
//! ```

use crate::types::ContentTree;

/// Formatter for the human-readable outline shown between feedback rounds.
#[derive(Debug, Clone)]
pub struct OutlineFormatter {
    /// Whether to list each slide's image search query.
    show_image_queries: bool,
}

impl Default for OutlineFormatter {
    fn default() -> Self {
        Self {
            show_image_queries: true,
        }
    }
}

impl OutlineFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_queries(mut self, show: bool) -> Self {
        self.show_image_queries = show;
        self
    }

    /// Format the outline, sections separated by blank lines.
    pub fn format(&self, tree: &ContentTree) -> String {
        let mut sections = Vec::with_capacity(tree.slides.len() + 3);

        sections.push(format!("# {}", tree.presentation_title.trim()));

        if !tree.table_of_contents.is_empty() {
            let mut toc = String::from("Contents:");
            for (idx, entry) in tree.table_of_contents.iter().enumerate() {
                toc.push_str(&format!("\n  {}. {}", idx + 1, entry.trim()));
            }
            sections.push(toc);
        }

        for (idx, slide) in tree.slides.iter().enumerate() {
            let mut section = format!("[{}] {}", idx + 1, slide.title.trim());
            push_bullets(&mut section, &slide.bullets);
            if self.show_image_queries {
                if let Some(query) = slide.image_query.as_deref().filter(|q| !q.trim().is_empty())
                {
                    section.push_str(&format!("\n  (image: {})", query.trim()));
                }
            }
            sections.push(section);
        }

        let mut conclusion = format!("[Conclusion] {}", tree.conclusion.title.trim());
        push_bullets(&mut conclusion, &tree.conclusion.bullets);
        sections.push(conclusion);

        sections.join("\n\n")
    }

    /// Format and add a trailing newline.
    pub fn format_with_newline(&self, tree: &ContentTree) -> String {
        format!("{}\n", self.format(tree))
    }
}

fn push_bullets(section: &mut String, bullets: &[String]) {
    for bullet in bullets.iter().map(|b| b.trim()).filter(|b| !b.is_empty()) {
        section.push_str("\n  - ");
        section.push_str(bullet);
    }
}
