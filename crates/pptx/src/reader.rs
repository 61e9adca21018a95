//! Reads back the text and pictures of a written deck.
//!
//! Used by `deckgen inspect` and to check rendered output.

use deckgen_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Text and picture summary of one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckSlide {
    /// 1-based position in the deck.
    pub number: usize,
    /// Non-empty paragraph texts in document order.
    pub lines: Vec<String>,
    pub pictures: usize,
}

impl DeckSlide {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

/// Reader for PPTX packages.
#[derive(Debug, Default)]
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_path(&self, path: &Path) -> Result<Vec<DeckSlide>> {
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Read every slide of the package, in presentation order.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Vec<DeckSlide>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.slide_order(&mut archive)?;
        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = read_archive_file(&mut archive, slide_path)?;
            slides.push(parse_slide(&content, idx + 1)?);
        }

        Ok(slides)
    }

    /// Slide part paths in the order `p:sldIdLst` lists them.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels = read_archive_file(archive, "ppt/_rels/presentation.xml.rels")?;
        let presentation = read_archive_file(archive, "ppt/presentation.xml")?;

        let mut targets: HashMap<String, String> = HashMap::new();
        for rel in element_attributes(&rels, b"Relationship")? {
            let is_slide = rel.get("Type").is_some_and(|t| t.ends_with("/slide"));
            if let (true, Some(id), Some(target)) = (is_slide, rel.get("Id"), rel.get("Target")) {
                targets.insert(id.clone(), part_path(target));
            }
        }

        element_attributes(&presentation, b"sldId")?
            .into_iter()
            .filter_map(|slide| slide.get("r:id").cloned())
            .map(|rel_id| {
                targets.get(&rel_id).cloned().ok_or_else(|| {
                    Error::XmlError(format!("Slide relationship '{}' not found", rel_id))
                })
            })
            .collect()
    }
}

/// Attributes of every element with the given local name, in document order.
fn element_attributes(xml: &str, name: &[u8]) -> Result<Vec<HashMap<String, String>>> {
    let mut found = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == name =>
            {
                let attrs: HashMap<String, String> = e
                    .attributes()
                    .flatten()
                    .map(|attr| {
                        (
                            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                            String::from_utf8_lossy(&attr.value).into_owned(),
                        )
                    })
                    .collect();
                found.push(attrs);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing package part: {}", e))),
            _ => {}
        }
    }

    Ok(found)
}

/// Archive path of a relationship target relative to `ppt/`.
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

fn parse_slide(xml: &str, number: usize) -> Result<DeckSlide> {
    let mut slide = DeckSlide::new(number);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_text_body = false;
    let mut in_text = false;
    let mut paragraph: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"pic" => slide.pictures += 1,
                b"txBody" => in_text_body = true,
                b"p" if in_text_body => paragraph = Some(String::new()),
                b"t" if paragraph.is_some() => in_text = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                if let Some(ref mut text) = paragraph {
                    let value = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad text in slide {}: {}", number, e)))?;
                    text.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(text) = paragraph.take() {
                        let text = text.trim();
                        if !text.is_empty() {
                            slide.lines.push(text.to_string());
                        }
                    }
                }
                b"txBody" => in_text_body = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide {}: {}",
                    number, e
                )))
            }
            _ => {}
        }
    }

    Ok(slide)
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Local part of a possibly prefixed element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{write_package, PptxRenderer};
    use deckgen_core::{build_presentation, layout_deck, ContentTree, DeckRenderer, ImageProvider};
    use deckgen_core::{Conclusion, ContentSlide, RenderOptions, SlideImages, Theme};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    struct OneImage;

    impl ImageProvider for OneImage {
        fn fetch_image(&self, query: &str) -> Option<Vec<u8>> {
            (query == "network diagram").then(|| png(1200, 627))
        }
    }

    const SLIDE_REL: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// A package holding only the parts the reader needs.
    fn minimal_package(slide_ids: &[&str], rels: &[(&str, &str)], slides: &[&str]) -> Vec<u8> {
        use std::io::Write;
        use zip::write::FileOptions;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let ids: String = slide_ids
            .iter()
            .enumerate()
            .map(|(n, id)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + n, id))
            .collect();
        zip.start_file("ppt/presentation.xml", options).unwrap();
        write!(
            zip,
            r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            ids
        )
        .unwrap();

        let entries: String = rels
            .iter()
            .map(|(id, target)| {
                format!(r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, SLIDE_REL, target)
            })
            .collect();
        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        write!(zip, "<Relationships>{}</Relationships>", entries).unwrap();

        for (n, text) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", n + 1), options).unwrap();
            write!(
                zip,
                r#"<p:sld xmlns:p="p" xmlns:a="a"><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sld>"#,
                text
            )
            .unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_slides_follow_the_id_list() {
        let package = minimal_package(
            &["rId9", "rId2", "rId4"],
            &[
                ("rId2", "slides/slide1.xml"),
                ("rId4", "/ppt/slides/slide3.xml"),
                ("rId9", "slides/slide2.xml"),
            ],
            &["first part", "second part", "third part"],
        );

        let read = DeckReader::new().read(Cursor::new(package)).unwrap();
        let lines: Vec<&str> = read.iter().map(|s| s.lines[0].as_str()).collect();
        assert_eq!(lines, vec!["second part", "first part", "third part"]);
        assert_eq!(read[2].number, 3);
    }

    #[test]
    fn test_unknown_slide_relationship() {
        let package = minimal_package(&["rId2", "rId3"], &[("rId2", "slides/slide1.xml")], &["only"]);
        let result = DeckReader::new().read(Cursor::new(package));
        assert!(matches!(result, Err(Error::XmlError(msg)) if msg.contains("rId3")));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_rendered_deck_reads_back_in_order() {
        let raw = r#"{
            "presentation_title": "Intro to Graph Theory",
            "table_of_contents": ["Vertices", "Edges"],
            "slides": [
                {"title": "Vertices", "content": ["A vertex is a point", ""], "image_description": "network diagram"},
                {"title": "Edges", "content": ["Edges join vertices"], "image_description": "bridges"}
            ],
            "conclusion": {"title": "Summary", "content": ["Graphs are everywhere"]}
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let renderer = PptxRenderer::new(dir.path());

        let path = build_presentation(raw, &RenderOptions::default(), Some(&OneImage), &renderer)
            .unwrap();
        let slides = DeckReader::new().read_path(&path).unwrap();

        assert_eq!(slides.len(), 6);
        assert_eq!(
            slides.iter().map(|s| s.number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );

        assert_eq!(slides[0].lines, vec!["Intro to Graph Theory", "Generated by AI Agent"]);
        assert!(slides[1].contains_text("Table of Contents"));
        assert!(slides[1].contains_text("• Vertices"));
        assert_eq!(slides[2].lines, vec!["Vertices", "• A vertex is a point"]);
        assert_eq!(slides[2].pictures, 1);
        assert_eq!(slides[3].pictures, 0);
        assert!(slides[4].contains_text("• Graphs are everywhere"));
        assert_eq!(slides[5].lines, vec!["Thank You"]);
    }

    #[test]
    fn test_escaped_text_round_trips() {
        let tree = ContentTree {
            presentation_title: "Fish & Chips <UK>".to_string(),
            table_of_contents: Vec::new(),
            slides: vec![ContentSlide::new("\"Quoted\"", vec!["a < b".to_string()])],
            conclusion: Conclusion::default(),
        };
        let slides = layout_deck(&tree, &Theme::default(), &SlideImages::new());
        let bytes = write_package(Cursor::new(Vec::new()), &slides, &Theme::default())
            .unwrap()
            .into_inner();

        let read = DeckReader::new().read(Cursor::new(bytes)).unwrap();
        assert_eq!(read[0].lines[0], "Fish & Chips <UK>");
        assert_eq!(read[2].lines, vec!["\"Quoted\"", "• a < b"]);
        assert!(read[3].contains_text("(No content generated)"));
    }

    #[test]
    fn test_not_a_zip() {
        let result = DeckReader::new().read(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }

    #[test]
    fn test_renderer_trait_object() {
        let dir = tempfile::tempdir().unwrap();
        let renderer: Box<dyn DeckRenderer> = Box::new(PptxRenderer::new(dir.path()));
        let slides = layout_deck(&ContentTree::default(), &Theme::default(), &SlideImages::new());
        let path = renderer.render(&slides, &Theme::default()).unwrap();

        let read = DeckReader::new().read_path(&path).unwrap();
        assert_eq!(read.len(), 4);
        assert_eq!(read[0].lines[0], "Presentation");
    }
}
