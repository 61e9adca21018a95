//! Text cleanup for bulleted slide content and titles.
//!
//! Blank bullets are removed before any sizing decision is made, so a slide
//! of whitespace never influences font selection.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Line breaks inside a single bullet, with any surrounding whitespace.
static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*(\r\n|\r|\n)+[ \t]*").unwrap());

/// Characters XML 1.0 does not allow in a document, tab, LF and CR excepted.
static CONTROL_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x{FFFE}\x{FFFF}]").unwrap());

/// Glyph placed in front of every bullet.
pub const BULLET_GLYPH: char = '•';

/// Bullet substituted for an all-blank list.
pub const EMPTY_PLACEHOLDER: &str = "(No content generated)";

/// Cleans bullet lists and formats bullet lines.
#[derive(Debug, Clone)]
pub struct BulletNormalizer {
    glyph: char,
    placeholder: String,
}

impl Default for BulletNormalizer {
    fn default() -> Self {
        Self {
            glyph: BULLET_GLYPH,
            placeholder: EMPTY_PLACEHOLDER.to_string(),
        }
    }
}

impl BulletNormalizer {
    /// Create a normalizer with the standard glyph and placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different placeholder for all-blank lists.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Normalize a single bullet: control characters and line breaks become
    /// spaces, ends are trimmed.
    pub fn normalize_bullet(&self, text: &str) -> String {
        let text = replace_control_chars(text);
        LINE_BREAK_REGEX.replace_all(text.trim(), " ").into_owned()
    }

    /// Normalize a bullet list.
    ///
    /// - Blank and whitespace-only bullets are dropped
    /// - Remaining bullets are trimmed, order preserved
    /// - An empty result becomes a single placeholder bullet
    pub fn normalize<S: AsRef<str>>(&self, bullets: &[S]) -> Vec<String> {
        let cleaned: Vec<String> = bullets
            .iter()
            .map(|b| self.normalize_bullet(b.as_ref()))
            .filter(|b| !b.is_empty())
            .collect();

        if cleaned.is_empty() {
            vec![self.placeholder.clone()]
        } else {
            cleaned
        }
    }

    /// Prefix a bullet with the glyph.
    pub fn format_bullet(&self, text: &str) -> String {
        format!("{} {}", self.glyph, text)
    }
}

/// Total characters across a bullet list, counted in Unicode scalar values.
pub fn total_chars<S: AsRef<str>>(bullets: &[S]) -> usize {
    bullets.iter().map(|b| b.as_ref().chars().count()).sum()
}

/// Replace characters that cannot appear in an XML document with spaces.
pub fn replace_control_chars(text: &str) -> Cow<'_, str> {
    CONTROL_CHAR_REGEX.replace_all(text, " ")
}

/// Title to display, substituting `fallback` for a blank one.
pub fn display_title(title: &str, fallback: &str) -> String {
    let title = replace_control_chars(title);
    let trimmed = title.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
