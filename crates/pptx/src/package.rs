//! Fixed package parts shared by every generated deck.
//!
//! A deck carries a single blank slide layout, one master and one theme;
//! all visual styling lives on the slides themselves.

use deckgen_core::ImageFormat;
use std::fmt::Write as _;

pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Relationship ids in presentation.xml.rels; slides follow from `FIRST_SLIDE_REL`.
pub(crate) const MASTER_REL_ID: &str = "rId1";
pub(crate) const THEME_REL_ID: &str = "rId2";
pub(crate) const FIRST_SLIDE_REL: usize = 3;

/// `[Content_Types].xml` for a deck with `slide_count` slides and the given media.
pub(crate) fn content_types_xml(slide_count: usize, media: &[ImageFormat]) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut seen: Vec<ImageFormat> = Vec::new();
    for format in media {
        if !seen.contains(format) {
            seen.push(*format);
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            );
        }
    }

    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        );
    }
    xml.push_str("</Types>");
    xml
}

/// Package-level relationships pointing at the presentation part.
pub(crate) fn root_rels_xml() -> String {
    relationships_xml(&[(
        "rId1".to_string(),
        REL_OFFICE_DOCUMENT,
        "ppt/presentation.xml".to_string(),
    )])
}

/// Relationships of presentation.xml: master, theme, then slides in order.
pub(crate) fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels = vec![
        (
            MASTER_REL_ID.to_string(),
            REL_SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        (
            THEME_REL_ID.to_string(),
            REL_THEME,
            "theme/theme1.xml".to_string(),
        ),
    ];
    for n in 1..=slide_count {
        rels.push((
            slide_rel_id(n),
            REL_SLIDE,
            format!("slides/slide{}.xml", n),
        ));
    }
    relationships_xml(&rels)
}

/// Relationship id of the 1-based slide `n` inside presentation.xml.rels.
pub(crate) fn slide_rel_id(n: usize) -> String {
    format!("rId{}", FIRST_SLIDE_REL + n - 1)
}

/// presentation.xml with the given slide size in EMUs.
pub(crate) fn presentation_xml(slide_count: usize, width: i64, height: i64) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    let _ = write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    );
    let _ = write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="{}"/></p:sldMasterIdLst>"#,
        MASTER_REL_ID
    );
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for n in 1..=slide_count {
            let _ = write!(
                xml,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                255 + n,
                slide_rel_id(n)
            );
        }
        xml.push_str("</p:sldIdLst>");
    }
    let _ = write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, width, height);
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    xml
}

/// Relationships of a slide: its layout, then one per picture.
pub(crate) fn slide_rels_xml(media_targets: &[String]) -> String {
    let mut rels = vec![(
        "rId1".to_string(),
        REL_SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml".to_string(),
    )];
    for (idx, target) in media_targets.iter().enumerate() {
        rels.push((format!("rId{}", idx + 2), REL_IMAGE, format!("../media/{}", target)));
    }
    relationships_xml(&rels)
}

pub(crate) fn slide_master_rels_xml() -> String {
    relationships_xml(&[
        (
            "rId1".to_string(),
            REL_SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml".to_string(),
        ),
        (
            "rId2".to_string(),
            REL_THEME,
            "../theme/theme1.xml".to_string(),
        ),
    ])
}

pub(crate) fn slide_layout_rels_xml() -> String {
    relationships_xml(&[(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".to_string(),
    )])
}

fn relationships_xml(rels: &[(String, &str, String)]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECL);
    let _ = write!(
        xml,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    );
    for (id, rel_type, target) in rels {
        debug_assert!(rel_type.starts_with(REL_BASE));
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        );
    }
    xml.push_str("</Relationships>");
    xml
}

/// Empty group-shape header every spTree starts with.
pub(crate) const SP_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

pub(crate) fn slide_master_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            r#"<p:spTree>{tree}</p:spTree></p:cSld>"#,
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            r#"</p:sldMaster>"#
        ),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = SP_TREE_HEADER
    )
}

pub(crate) fn slide_layout_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{tree}</p:spTree></p:cSld>"#,
            r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
            r#"</p:sldLayout>"#
        ),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = SP_TREE_HEADER
    )
}

pub(crate) fn theme_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<a:theme xmlns:a="{a}" name="Deck Theme"><a:themeElements>"#,
            r#"<a:clrScheme name="Deck">"#,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2>"#,
            r#"<a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
            r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1>"#,
            r#"<a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
            r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3>"#,
            r#"<a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
            r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5>"#,
            r#"<a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
            r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink>"#,
            r#"<a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
            r#"</a:clrScheme>"#,
            r#"<a:fontScheme name="Deck">"#,
            r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
            r#"</a:fontScheme>"#,
            r#"<a:fmtScheme name="Deck">"#,
            r#"<a:fillStyleLst>"#,
            r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
            r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
            r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
            r#"</a:fillStyleLst>"#,
            r#"<a:lnStyleLst>"#,
            r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
            r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
            r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
            r#"</a:lnStyleLst>"#,
            r#"<a:effectStyleLst>"#,
            r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
            r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
            r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
            r#"</a:effectStyleLst>"#,
            r#"<a:bgFillStyleLst>"#,
            r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
            r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
            r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
            r#"</a:bgFillStyleLst>"#,
            r#"</a:fmtScheme>"#,
            r#"</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
        ),
        a = NS_A
    )
}
