mod format;
mod outline;
mod styles;

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Error;
use crate::model::{Profile, Report};
use crate::numbering::{self, NumberingScheme, Paragraph};
use crate::xml::{self, XmlElement, XmlNode};

pub(crate) use styles::StyleSheet;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Child order of `w:pPr` (ECMA-376 CT_PPr).
pub(super) const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Child order of `w:rPr` (CT_RPr).
pub(super) const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

/// Child order of `w:tblPr` (CT_TblPr).
pub(super) const TBLPR_ORDER: &[&str] = &[
    "w:tblStyle",
    "w:tblpPr",
    "w:tblOverlap",
    "w:bidiVisual",
    "w:tblStyleRowBandSize",
    "w:tblStyleColBandSize",
    "w:tblW",
    "w:jc",
    "w:tblCellSpacing",
    "w:tblInd",
    "w:tblBorders",
    "w:shd",
    "w:tblLayout",
    "w:tblCellMar",
    "w:tblLook",
    "w:tblCaption",
    "w:tblDescription",
    "w:tblPrChange",
];

/// Elements that wrap runs inside a paragraph.
const RUN_CONTAINERS: &[&str] = &[
    "w:hyperlink",
    "w:ins",
    "w:smartTag",
    "w:fldSimple",
    "w:customXml",
    "w:sdt",
    "w:sdtContent",
];

/// Paragraph children that survive a text rewrite.
const KEPT_ON_REWRITE: &[&str] = &[
    "w:pPr",
    "w:bookmarkStart",
    "w:bookmarkEnd",
    "w:commentRangeStart",
    "w:commentRangeEnd",
    "w:permStart",
    "w:permEnd",
];

const VISUAL_CONTENT: &[&str] = &["w:drawing", "w:pict", "w:object"];

pub(super) fn pts_to_twips(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

pub(super) fn cm_to_twips(cm: f32) -> i64 {
    (cm * 1440.0 / 2.54).round() as i64
}

pub(super) fn inches_to_twips(inches: f32) -> i64 {
    (inches * 1440.0).round() as i64
}

pub(super) fn pts_to_half_points(pt: f32) -> i64 {
    (pt * 2.0).round() as i64
}

/// `w:line` value for an auto line rule: 240 per single line.
pub(super) fn line_value(multiple: f32) -> i64 {
    (multiple * 240.0).round() as i64
}

pub(super) fn wml_val(name: &str, val: impl Into<String>) -> XmlElement {
    XmlElement::new(name).with_attr("w:val", val)
}

/// Spacing before/after in points and an auto line rule at `line_spacing` lines.
pub(super) fn set_spacing(ppr: &mut XmlElement, before_pt: f32, after_pt: f32, line_spacing: f32) {
    let spacing = ppr.ensure_child("w:spacing", PPR_ORDER);
    spacing.set_attr("w:before", pts_to_twips(before_pt).to_string());
    spacing.set_attr("w:after", pts_to_twips(after_pt).to_string());
    spacing.set_attr("w:line", line_value(line_spacing).to_string());
    spacing.set_attr("w:lineRule", "auto");
    // Line-based and auto spacing take precedence over the point values.
    for attr in ["w:beforeLines", "w:afterLines", "w:beforeAutospacing", "w:afterAutospacing"] {
        spacing.remove_attr(attr);
    }
}

pub(super) fn set_first_line_indent(ppr: &mut XmlElement, cm: f32) {
    let ind = ppr.ensure_child("w:ind", PPR_ORDER);
    ind.set_attr("w:firstLine", cm_to_twips(cm).to_string());
    for attr in ["w:hanging", "w:firstLineChars", "w:hangingChars"] {
        ind.remove_attr(attr);
    }
}

fn read_zip_text<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// An opened `.docx` with its main document and style parts parsed.
pub(crate) struct Package {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    pub(crate) document: XmlElement,
    pub(crate) styles: StyleSheet,
}

impl Package {
    pub(crate) fn open(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

        let mut xml_content = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
            .read_to_string(&mut xml_content)?;
        let document = xml::parse(&xml_content)?;

        let styles = match read_zip_text(&mut archive, STYLES_PART) {
            Some(text) => Some(xml::parse(&text)?),
            None => {
                log::warn!("No {STYLES_PART}; heading promotion and style formatting are skipped");
                None
            }
        };

        Ok(Self {
            archive,
            document,
            styles: StyleSheet::new(styles),
        })
    }

    /// Write a new archive: edited parts are re-serialized, every other entry
    /// is copied without recompression.
    pub(crate) fn to_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(i)?;
            let replacement = match entry.name() {
                DOCUMENT_PART => Some(self.document.to_xml()),
                STYLES_PART => self.styles.root().map(XmlElement::to_xml),
                _ => None,
            };
            match replacement {
                Some(xml) => {
                    let name = entry.name().to_string();
                    drop(entry);
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(xml.as_bytes())?;
                }
                None => writer.raw_copy_file(entry)?,
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Run every pass over the package, in order.
pub(crate) fn tidy(pkg: &mut Package, profile: &Profile) -> Result<Report, Error> {
    let mut report = Report::default();
    let Package {
        document, styles, ..
    } = pkg;

    outline::restructure(document, styles, &profile.outline, &mut report)?;
    outline::strip_numbering(document, styles, profile, &mut report)?;
    number_headings(document, styles, &profile.numbering, &mut report)?;
    format::apply(document, styles, profile, &mut report)?;

    Ok(report)
}

fn number_headings(
    document: &mut XmlElement,
    styles: &StyleSheet,
    scheme: &NumberingScheme,
    report: &mut Report,
) -> Result<(), Error> {
    if !scheme.enabled {
        return Ok(());
    }
    let mut paragraphs = body_paragraphs(document)?;
    let before: Vec<Paragraph> = paragraphs
        .iter()
        .map(|p| Paragraph {
            text: paragraph_text(p),
            level: styles.heading_level(paragraph_style(p)),
        })
        .collect();

    let mut after = before.clone();
    let summary = numbering::number_headings(&mut after, scheme);
    report.numbered += summary.numbered;
    report.stripped_prefixes += summary.stripped;

    for ((p, old), new) in paragraphs.iter_mut().zip(&before).zip(&after) {
        if old.text != new.text {
            set_paragraph_text(p, &new.text);
        }
    }
    Ok(())
}

pub(super) enum Block<'a> {
    Paragraph(&'a mut XmlElement),
    Table(&'a mut XmlElement),
}

/// Paragraphs and tables of a container in document order, looking through
/// content controls and custom XML wrappers.
pub(super) fn collect_blocks<'a>(parent: &'a mut XmlElement, out: &mut Vec<Block<'a>>) {
    for child in parent.elements_mut() {
        if child.is("w:p") {
            out.push(Block::Paragraph(child));
        } else if child.is("w:tbl") {
            out.push(Block::Table(child));
        } else if child.is("w:sdt") {
            if let Some(content) = child.child_mut("w:sdtContent") {
                collect_blocks(content, out);
            }
        } else if child.is("w:customXml") {
            collect_blocks(child, out);
        }
    }
}

pub(super) fn body_blocks(document: &mut XmlElement) -> Result<Vec<Block<'_>>, Error> {
    let body = document
        .child_mut("w:body")
        .ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;
    let mut blocks = Vec::new();
    collect_blocks(body, &mut blocks);
    Ok(blocks)
}

pub(super) fn body_paragraphs(document: &mut XmlElement) -> Result<Vec<&mut XmlElement>, Error> {
    Ok(body_blocks(document)?
        .into_iter()
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
        .collect())
}

pub(super) fn paragraph_style(p: &XmlElement) -> Option<&str> {
    p.child("w:pPr").and_then(|ppr| ppr.child_val("w:pStyle"))
}

/// Existing `w:pPr`, or a new one as the paragraph's first child.
pub(super) fn ppr_mut(p: &mut XmlElement) -> &mut XmlElement {
    p.ensure_child("w:pPr", &["w:pPr"])
}

pub(super) fn set_paragraph_style(p: &mut XmlElement, style_id: Option<&str>) {
    match style_id {
        Some(id) => ppr_mut(p).put_child(wml_val("w:pStyle", id), PPR_ORDER),
        None => {
            if let Some(ppr) = p.child_mut("w:pPr") {
                ppr.remove_children("w:pStyle");
            }
        }
    }
}

fn collect_runs<'a>(parent: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in parent.elements() {
        if child.is("w:r") {
            out.push(child);
        } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
            collect_runs(child, out);
        }
    }
}

fn collect_runs_mut<'a>(parent: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
    for child in parent.elements_mut() {
        if child.is("w:r") {
            out.push(child);
        } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
            collect_runs_mut(child, out);
        }
    }
}

/// Runs of a paragraph, including those inside hyperlinks and tracked insertions.
pub(super) fn runs_mut(p: &mut XmlElement) -> Vec<&mut XmlElement> {
    let mut runs = Vec::new();
    collect_runs_mut(p, &mut runs);
    runs
}

fn run_text(run: &XmlElement, out: &mut String) {
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text()),
            "w:tab" | "w:ptab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            "w:noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

pub(super) fn paragraph_text(p: &XmlElement) -> String {
    let mut runs = Vec::new();
    collect_runs(p, &mut runs);
    let mut text = String::new();
    for run in runs {
        run_text(run, &mut text);
    }
    text
}

pub(super) fn has_visual_content(p: &XmlElement) -> bool {
    p.has_descendant(VISUAL_CONTENT)
}

fn text_element(text: &str) -> XmlElement {
    let mut t = XmlElement::new("w:t").with_attr("xml:space", "preserve");
    t.push_text(text);
    t
}

fn build_run(text: &str, rpr: Option<XmlElement>) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    if let Some(rpr) = rpr {
        run.children.push(XmlNode::Element(rpr));
    }
    let mut pending = String::new();
    for c in text.chars() {
        let special = match c {
            '\t' => "w:tab",
            '\n' => "w:br",
            _ => {
                pending.push(c);
                continue;
            }
        };
        if !pending.is_empty() {
            run.children
                .push(XmlNode::Element(text_element(&std::mem::take(&mut pending))));
        }
        run.children.push(XmlNode::Element(XmlElement::new(special)));
    }
    if !pending.is_empty() {
        run.children.push(XmlNode::Element(text_element(&pending)));
    }
    run
}

/// Replace the paragraph's content with a single run holding `text`. The run
/// takes the formatting of the first existing run; paragraph properties and
/// bookmarks stay where they are.
pub(super) fn set_paragraph_text(p: &mut XmlElement, text: &str) {
    let rpr = {
        let mut runs = Vec::new();
        collect_runs(p, &mut runs);
        runs.first().and_then(|r| r.child("w:rPr")).cloned()
    };

    let mut kept = Vec::with_capacity(p.children.len());
    let mut insert_at = None;
    for node in std::mem::take(&mut p.children) {
        let keep = match &node {
            XmlNode::Element(e) => KEPT_ON_REWRITE.contains(&e.name.as_str()),
            _ => true,
        };
        if keep {
            kept.push(node);
        } else if insert_at.is_none() {
            insert_at = Some(kept.len());
        }
    }
    p.children = kept;

    if text.is_empty() {
        return;
    }
    let at = insert_at.unwrap_or(p.children.len());
    p.children
        .insert(at, XmlNode::Element(build_run(text, rpr)));
}

/// Remove leading whitespace from the paragraph text in place, without
/// merging runs. Stops at the first visible character or non-text run content.
pub(super) fn trim_leading_whitespace(p: &mut XmlElement) -> bool {
    enum Lead {
        Properties,
        Blank,
        Text,
        Other,
    }

    let mut changed = false;
    for run in runs_mut(p) {
        let mut i = 0;
        while i < run.children.len() {
            let XmlNode::Element(child) = &mut run.children[i] else {
                i += 1;
                continue;
            };
            let lead = match child.name.as_str() {
                "w:rPr" => Lead::Properties,
                "w:tab" | "w:br" | "w:cr" => Lead::Blank,
                "w:t" => Lead::Text,
                _ => Lead::Other,
            };
            match lead {
                Lead::Properties => i += 1,
                Lead::Blank => {
                    run.children.remove(i);
                    changed = true;
                }
                Lead::Text => {
                    let text = child.text();
                    let trimmed = text.trim_start();
                    if trimmed.len() != text.len() {
                        child.children = vec![XmlNode::Text(trimmed.to_string())];
                        changed = true;
                    }
                    if !trimmed.is_empty() {
                        return changed;
                    }
                    i += 1;
                }
                Lead::Other => return changed,
            }
        }
    }
    changed
}
