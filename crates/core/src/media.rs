//! Image payload sniffing for downloaded pictures.
//!
//! Only formats every presentation viewer can display are accepted.

use image::ImageReader;
use std::io::Cursor;

/// Supported picture formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF: "GIF8"
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        None
    }

    /// File extension used for the media part.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    /// MIME type registered in the package content types.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Pixel dimensions read from the image header, if recognizable.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageFormat::from_magic(bytes)?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok((width, height)) if width > 0 && height > 0 => Some((width, height)),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Unreadable image header: {}", e);
            None
        }
    }
}
