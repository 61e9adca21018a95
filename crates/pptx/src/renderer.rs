//! Writes laid-out slides into a `.pptx` package on disk.

use crate::package;
use crate::slide::SlideWriter;
use deckgen_core::descriptor::{CANVAS_HEIGHT, CANVAS_WIDTH};
use deckgen_core::{
    DeckRenderer, Emu, Error, ImageFormat, Result, ShapeDescriptor, SlideDescriptor, Theme,
};
use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Prefix of every generated deck filename.
pub const FILE_PREFIX: &str = "generated_presentation_";

/// Attempts at finding a free filename before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Renders slide descriptors to PPTX files in an output directory.
#[derive(Debug, Clone)]
pub struct PptxRenderer {
    output_dir: PathBuf,
}

impl PptxRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Claim a fresh `generated_presentation_<suffix>.pptx` in the output directory.
    fn create_unique_file(&self) -> Result<(PathBuf, fs::File)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let path = self
                .output_dir
                .join(format!("{}{}.pptx", FILE_PREFIX, &suffix[..8]));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(Error::RenderFailure(format!(
                        "cannot create '{}': {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        Err(Error::RenderFailure(format!(
            "no free filename in '{}'",
            self.output_dir.display()
        )))
    }
}

impl DeckRenderer for PptxRenderer {
    fn render(&self, slides: &[SlideDescriptor], theme: &Theme) -> Result<PathBuf> {
        let bytes = write_package(Cursor::new(Vec::new()), slides, theme)?.into_inner();

        let (path, mut file) = self.create_unique_file()?;
        if let Err(e) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                log::warn!("Could not remove partial deck {}: {}", path.display(), cleanup);
            }
            return Err(Error::RenderFailure(format!(
                "cannot write '{}': {}",
                path.display(),
                e
            )));
        }

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// Media part collected while writing slides.
struct MediaPart<'a> {
    name: String,
    format: ImageFormat,
    bytes: &'a [u8],
}

/// Write a complete PPTX package for `slides` into `sink`.
pub fn write_package<W: Write + Seek>(
    sink: W,
    slides: &[SlideDescriptor],
    theme: &Theme,
) -> Result<W> {
    let mut zip = ZipWriter::new(sink);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut media: Vec<MediaPart<'_>> = Vec::new();
    let mut slide_parts = Vec::with_capacity(slides.len());

    for (idx, slide) in slides.iter().enumerate() {
        let xml = SlideWriter::new(theme.primary).write(slide)?;

        let mut targets = Vec::new();
        for shape in &slide.shapes {
            if let ShapeDescriptor::Picture { image, .. } = shape {
                let name = format!("image{}.{}", media.len() + 1, image.format.extension());
                targets.push(name.clone());
                media.push(MediaPart {
                    name,
                    format: image.format,
                    bytes: &image.bytes,
                });
            }
        }

        slide_parts.push((idx + 1, xml, package::slide_rels_xml(&targets)));
    }

    let formats: Vec<ImageFormat> = media.iter().map(|m| m.format).collect();
    let width = Emu::from_units(CANVAS_WIDTH).0;
    let height = Emu::from_units(CANVAS_HEIGHT).0;

    let mut put = |name: &str, data: &[u8]| -> Result<()> {
        zip.start_file(name, options)
            .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
        zip.write_all(data)?;
        Ok(())
    };

    put(
        "[Content_Types].xml",
        package::content_types_xml(slides.len(), &formats).as_bytes(),
    )?;
    put("_rels/.rels", package::root_rels_xml().as_bytes())?;
    put(
        "ppt/presentation.xml",
        package::presentation_xml(slides.len(), width, height).as_bytes(),
    )?;
    put(
        "ppt/_rels/presentation.xml.rels",
        package::presentation_rels_xml(slides.len()).as_bytes(),
    )?;
    put(
        "ppt/slideMasters/slideMaster1.xml",
        package::slide_master_xml().as_bytes(),
    )?;
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        package::slide_master_rels_xml().as_bytes(),
    )?;
    put(
        "ppt/slideLayouts/slideLayout1.xml",
        package::slide_layout_xml().as_bytes(),
    )?;
    put(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        package::slide_layout_rels_xml().as_bytes(),
    )?;
    put("ppt/theme/theme1.xml", package::theme_xml().as_bytes())?;

    for (n, xml, rels) in &slide_parts {
        put(&format!("ppt/slides/slide{}.xml", n), xml)?;
        put(&format!("ppt/slides/_rels/slide{}.xml.rels", n), rels.as_bytes())?;
    }

    for part in &media {
        put(&format!("ppt/media/{}", part.name), part.bytes)?;
    }

    zip.finish()
        .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
}
