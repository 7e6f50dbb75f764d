#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Entry the tool never touches; used to check pass-through copying.
pub const EXTRA_PART: &str = "customXml/item1.xml";
pub const EXTRA_CONTENT: &str = "<?xml version=\"1.0\"?><data><keep me=\"as is\"/></data>";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Normal (default), Heading 1..9 and List Paragraph. Heading 1 and List
/// Paragraph carry their own list numbering.
pub fn styles_xml() -> String {
    let mut styles = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="7"/></w:numPr><w:ind w:left="720"/></w:pPr></w:style>
<w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/></w:style>
"#,
    );
    for level in 1..=9 {
        let num_pr = if level == 1 {
            r#"<w:numPr><w:numId w:val="3"/></w:numPr>"#
        } else {
            ""
        };
        styles.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/>{num_pr}<w:outlineLvl w:val="{}"/></w:pPr></w:style>
"#,
            level - 1
        ));
    }
    styles.push_str("</w:styles>");
    styles
}

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#
    )
}

fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn para(text: &str) -> String {
    format!("<w:p>{}</w:p>", run(text))
}

pub fn heading(level: u8, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>{}</w:p>"#,
        run(text)
    )
}

/// Normal paragraph that only carries an outline level (0-based, as stored).
pub fn outline_para(outline_lvl: u8, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:outlineLvl w:val="{outline_lvl}"/></w:pPr>{}</w:p>"#,
        run(text)
    )
}

pub fn list_para(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="7"/></w:numPr></w:pPr>{}</w:p>"#,
        run(text)
    )
}

pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from(r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblLook w:val="04A0"/></w:tblPr>"#);
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str(&format!("<w:tc>{}</w:tc>", para(cell)));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

pub fn build_docx_with(document: &str, styles: Option<&str>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut add = |name: &str, content: &str| {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", CONTENT_TYPES);
    add("_rels/.rels", RELS);
    add("word/document.xml", document);
    if let Some(styles) = styles {
        add("word/styles.xml", styles);
    }
    add(EXTRA_PART, EXTRA_CONTENT);
    zip.finish().unwrap().into_inner()
}

/// A DOCX whose body is `body` and whose styles come from `styles_xml`.
pub fn build_docx(body: &str) -> Vec<u8> {
    build_docx_with(&document_xml(body), Some(styles_xml().as_str()))
}

pub fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

pub fn part_names(docx: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

fn w<'a>(name: &'a str) -> (&'static str, &'a str) {
    (W_NS, name)
}

pub fn w_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((W_NS, name))
}

pub fn child<'a, 'i>(node: roxmltree::Node<'a, 'i>, name: &str) -> Option<roxmltree::Node<'a, 'i>> {
    node.children().find(|c| c.has_tag_name(w(name)))
}

pub fn node_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.has_tag_name(w("t")))
        .filter_map(|n| n.text())
        .collect()
}

/// A parsed document part plus lookup helpers. Keeps the source text alive
/// for the borrowed `roxmltree` nodes.
pub struct Part {
    text: String,
}

impl Part {
    pub fn document(docx: &[u8]) -> Self {
        Self {
            text: read_part(docx, "word/document.xml"),
        }
    }

    pub fn styles(docx: &[u8]) -> Self {
        Self {
            text: read_part(docx, "word/styles.xml"),
        }
    }

    pub fn parse(&self) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(&self.text).unwrap()
    }
}

/// Top-level body paragraphs as (style id, text).
pub fn body_paragraphs(docx: &[u8]) -> Vec<(Option<String>, String)> {
    let part = Part::document(docx);
    let doc = part.parse();
    let body = child(doc.root_element(), "body").unwrap();
    body.children()
        .filter(|n| n.has_tag_name(w("p")))
        .map(|p| {
            let style = child(p, "pPr")
                .and_then(|ppr| child(ppr, "pStyle"))
                .and_then(|s| w_attr(s, "val"))
                .map(str::to_string);
            (style, node_text(p))
        })
        .collect()
}

pub fn body_texts(docx: &[u8]) -> Vec<String> {
    body_paragraphs(docx).into_iter().map(|(_, t)| t).collect()
}

/// Style id of the top-level paragraph whose text is `text`.
pub fn style_of(docx: &[u8], text: &str) -> Option<String> {
    body_paragraphs(docx)
        .into_iter()
        .find(|(_, t)| t == text)
        .and_then(|(s, _)| s)
}
