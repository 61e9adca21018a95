//! Slide part serialization.

use crate::package::{NS_A, NS_P, NS_R, SP_TREE_HEADER};
use deckgen_core::normalize::replace_control_chars;
use deckgen_core::{
    Alignment, Emu, Error, Frame, Result, Rgb, ShapeDescriptor, SlideDescriptor, TextRun,
    VerticalAnchor,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Picture border width.
const PICTURE_BORDER: Emu = Emu(25_400);

/// Serializes one slide descriptor into a `p:sld` part.
pub(crate) struct SlideWriter {
    writer: Writer<Vec<u8>>,
    next_shape_id: u32,
    next_picture_rel: usize,
    border: Rgb,
}

impl SlideWriter {
    /// `border` is the colour of the frame drawn around pictures.
    pub(crate) fn new(border: Rgb) -> Self {
        Self {
            writer: Writer::new(Vec::with_capacity(4096)),
            // id 1 is the group shape of the spTree
            next_shape_id: 2,
            next_picture_rel: 2,
            border,
        }
    }

    /// Write the slide. Picture relationships are numbered `rId2..` in shape order.
    pub(crate) fn write(mut self, slide: &SlideDescriptor) -> Result<Vec<u8>> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        self.start(
            "p:sld",
            &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
        )?;
        self.start("p:cSld", &[])?;

        let background = slide.shapes.iter().find_map(|shape| match shape {
            ShapeDescriptor::Background { color } => Some(*color),
            _ => None,
        });
        if let Some(color) = background {
            self.start("p:bg", &[])?;
            self.start("p:bgPr", &[])?;
            self.solid_fill(color)?;
            self.empty("a:effectLst", &[])?;
            self.end("p:bgPr")?;
            self.end("p:bg")?;
        }

        self.start("p:spTree", &[])?;
        self.raw(SP_TREE_HEADER)?;
        for shape in &slide.shapes {
            match shape {
                ShapeDescriptor::Background { .. } => {}
                ShapeDescriptor::Rectangle { frame, fill } => self.rectangle(frame, *fill)?,
                ShapeDescriptor::TextBox {
                    frame,
                    anchor,
                    paragraphs,
                } => self.text_box(frame, *anchor, paragraphs)?,
                ShapeDescriptor::Picture {
                    frame, description, ..
                } => self.picture(frame, description)?,
            }
        }
        self.end("p:spTree")?;

        self.end("p:cSld")?;
        self.start("p:clrMapOvr", &[])?;
        self.empty("a:masterClrMapping", &[])?;
        self.end("p:clrMapOvr")?;
        self.end("p:sld")?;

        Ok(self.writer.into_inner())
    }

    fn rectangle(&mut self, frame: &Frame, fill: Rgb) -> Result<()> {
        let id = self.shape_id();
        self.start("p:sp", &[])?;
        self.start("p:nvSpPr", &[])?;
        self.empty("p:cNvPr", &[("id", &id.to_string()), ("name", &format!("Rectangle {}", id))])?;
        self.empty("p:cNvSpPr", &[])?;
        self.empty("p:nvPr", &[])?;
        self.end("p:nvSpPr")?;

        self.start("p:spPr", &[])?;
        self.transform(frame)?;
        self.preset_rect()?;
        self.solid_fill(fill)?;
        self.start("a:ln", &[])?;
        self.empty("a:noFill", &[])?;
        self.end("a:ln")?;
        self.end("p:spPr")?;
        self.end("p:sp")
    }

    fn text_box(&mut self, frame: &Frame, anchor: VerticalAnchor, paragraphs: &[TextRun]) -> Result<()> {
        let id = self.shape_id();
        self.start("p:sp", &[])?;
        self.start("p:nvSpPr", &[])?;
        self.empty("p:cNvPr", &[("id", &id.to_string()), ("name", &format!("TextBox {}", id))])?;
        self.empty("p:cNvSpPr", &[("txBox", "1")])?;
        self.empty("p:nvPr", &[])?;
        self.end("p:nvSpPr")?;

        self.start("p:spPr", &[])?;
        self.transform(frame)?;
        self.preset_rect()?;
        self.empty("a:noFill", &[])?;
        self.end("p:spPr")?;

        self.start("p:txBody", &[])?;
        self.empty(
            "a:bodyPr",
            &[("wrap", "square"), ("rtlCol", "0"), ("anchor", anchor_attr(anchor))],
        )?;
        self.empty("a:lstStyle", &[])?;
        if paragraphs.is_empty() {
            self.start("a:p", &[])?;
            self.empty("a:endParaRPr", &[("lang", "en-US")])?;
            self.end("a:p")?;
        }
        for run in paragraphs {
            self.paragraph(run)?;
        }
        self.end("p:txBody")?;
        self.end("p:sp")
    }

    fn paragraph(&mut self, run: &TextRun) -> Result<()> {
        self.start("a:p", &[])?;

        let level = run.indent_level.to_string();
        self.start(
            "a:pPr",
            &[("lvl", &level), ("algn", alignment_attr(run.alignment))],
        )?;
        if let Some(points) = run.space_before {
            self.spacing("a:spcBef", points)?;
        }
        if let Some(points) = run.space_after {
            self.spacing("a:spcAft", points)?;
        }
        self.end("a:pPr")?;

        // sz is in hundredths of a point
        let size = (run.font_size * 100).to_string();
        self.start("a:r", &[])?;
        self.start(
            "a:rPr",
            &[
                ("lang", "en-US"),
                ("sz", &size),
                ("b", if run.bold { "1" } else { "0" }),
                ("dirty", "0"),
            ],
        )?;
        self.solid_fill(run.color)?;
        self.end("a:rPr")?;
        self.start("a:t", &[])?;
        self.event(Event::Text(BytesText::new(&replace_control_chars(&run.text))))?;
        self.end("a:t")?;
        self.end("a:r")?;

        self.end("a:p")
    }

    fn spacing(&mut self, tag: &str, points: u32) -> Result<()> {
        self.start(tag, &[])?;
        self.empty("a:spcPts", &[("val", &(points * 100).to_string())])?;
        self.end(tag)
    }

    fn picture(&mut self, frame: &Frame, description: &str) -> Result<()> {
        let id = self.shape_id();
        let rel = format!("rId{}", self.next_picture_rel);
        self.next_picture_rel += 1;

        self.start("p:pic", &[])?;
        self.start("p:nvPicPr", &[])?;
        self.empty(
            "p:cNvPr",
            &[
                ("id", &id.to_string()),
                ("name", &format!("Picture {}", id)),
                ("descr", &replace_control_chars(description)),
            ],
        )?;
        self.start("p:cNvPicPr", &[])?;
        self.empty("a:picLocks", &[("noChangeAspect", "1")])?;
        self.end("p:cNvPicPr")?;
        self.empty("p:nvPr", &[])?;
        self.end("p:nvPicPr")?;

        self.start("p:blipFill", &[])?;
        self.empty("a:blip", &[("r:embed", &rel)])?;
        self.start("a:stretch", &[])?;
        self.empty("a:fillRect", &[])?;
        self.end("a:stretch")?;
        self.end("p:blipFill")?;

        self.start("p:spPr", &[])?;
        self.transform(frame)?;
        self.preset_rect()?;
        self.start("a:ln", &[("w", &PICTURE_BORDER.0.to_string())])?;
        self.solid_fill(self.border)?;
        self.end("a:ln")?;
        self.end("p:spPr")?;
        self.end("p:pic")
    }

    fn transform(&mut self, frame: &Frame) -> Result<()> {
        self.start("a:xfrm", &[])?;
        self.empty(
            "a:off",
            &[("x", &frame.x.0.to_string()), ("y", &frame.y.0.to_string())],
        )?;
        self.empty(
            "a:ext",
            &[
                ("cx", &frame.width.0.to_string()),
                ("cy", &frame.height.0.to_string()),
            ],
        )?;
        self.end("a:xfrm")
    }

    fn preset_rect(&mut self) -> Result<()> {
        self.start("a:prstGeom", &[("prst", "rect")])?;
        self.empty("a:avLst", &[])?;
        self.end("a:prstGeom")
    }

    fn solid_fill(&mut self, color: Rgb) -> Result<()> {
        self.start("a:solidFill", &[])?;
        self.empty("a:srgbClr", &[("val", &color.to_hex())])?;
        self.end("a:solidFill")
    }

    fn shape_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(elem))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(elem))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Write pre-escaped markup.
    fn raw(&mut self, markup: &str) -> Result<()> {
        self.writer
            .get_mut()
            .extend_from_slice(markup.as_bytes());
        Ok(())
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Failed to write slide XML: {}", e)))
    }
}

fn anchor_attr(anchor: VerticalAnchor) -> &'static str {
    match anchor {
        VerticalAnchor::Top => "t",
        VerticalAnchor::Middle => "ctr",
        VerticalAnchor::Bottom => "b",
    }
}

fn alignment_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
    }
}
