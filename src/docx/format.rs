use crate::error::Error;
use crate::model::{BodyFormat, HeadingStyle, Profile, Report, TableFormat};
use crate::numbering::MAX_LEVEL;
use crate::xml::XmlElement;

use super::{
    Block, RPR_ORDER, StyleSheet, TBLPR_ORDER, body_blocks, collect_blocks, inches_to_twips,
    paragraph_style, ppr_mut, pts_to_half_points, runs_mut, set_first_line_indent, set_spacing,
    wml_val,
};

/// Theme font references win over explicit names, so they are dropped.
const THEME_FONT_ATTRS: &[&str] = &["w:asciiTheme", "w:hAnsiTheme", "w:eastAsiaTheme"];

fn rpr_mut(run: &mut XmlElement) -> &mut XmlElement {
    run.ensure_child("w:rPr", &["w:rPr"])
}

fn set_run_fonts(run: &mut XmlElement, east_asia: &str, latin: &str) {
    let fonts = rpr_mut(run).ensure_child("w:rFonts", RPR_ORDER);
    for attr in THEME_FONT_ATTRS {
        fonts.remove_attr(attr);
    }
    fonts.set_attr("w:eastAsia", east_asia);
    fonts.set_attr("w:ascii", latin);
    fonts.set_attr("w:hAnsi", latin);
}

fn set_run_size(run: &mut XmlElement, size_pt: f32) {
    let half_points = pts_to_half_points(size_pt).to_string();
    rpr_mut(run).put_child(wml_val("w:sz", half_points), RPR_ORDER);
}

fn set_run_bold(run: &mut XmlElement, bold: bool) {
    let b = if bold {
        XmlElement::new("w:b")
    } else {
        wml_val("w:b", "0")
    };
    rpr_mut(run).put_child(b, RPR_ORDER);
}

fn format_heading(p: &mut XmlElement, rule: &HeadingStyle) {
    // Paragraph-level spacing and indent would mask the heading style.
    if let Some(ppr) = p.child_mut("w:pPr") {
        ppr.remove_children("w:spacing");
        ppr.remove_children("w:ind");
    }
    for run in runs_mut(p) {
        set_run_fonts(run, &rule.east_asia_font, &rule.font);
        set_run_size(run, rule.size_pt);
        set_run_bold(run, rule.bold);
    }
}

fn format_body(p: &mut XmlElement, body: &BodyFormat) {
    let ppr = ppr_mut(p);
    set_spacing(ppr, body.space_before_pt, body.space_after_pt, body.line_spacing);
    set_first_line_indent(ppr, body.first_line_indent_cm);
    for run in runs_mut(p) {
        set_run_fonts(run, &body.east_asia_font, &body.font);
        set_run_size(run, body.size_pt);
    }
}

fn format_cell_paragraph(p: &mut XmlElement, table: &TableFormat) {
    set_spacing(ppr_mut(p), table.space_before_pt, table.space_after_pt, table.line_spacing);
    for run in runs_mut(p) {
        set_run_fonts(run, &table.east_asia_font, &table.font);
        set_run_size(run, table.size_pt);
    }
}

/// Width on the outer table, cell text formatting everywhere. Nested tables
/// keep the width they have inside their cell.
fn format_table(tbl: &mut XmlElement, table: &TableFormat, nested: bool) {
    if !nested {
        let width = XmlElement::new("w:tblW")
            .with_attr("w:w", inches_to_twips(table.width_in).to_string())
            .with_attr("w:type", "dxa");
        tbl.ensure_child("w:tblPr", &["w:tblPr"]).put_child(width, TBLPR_ORDER);
    }

    let mut rows = Vec::new();
    collect_rows(tbl, &mut rows);
    for row in rows {
        for cell in row.elements_mut().filter(|c| c.is("w:tc")) {
            let mut blocks = Vec::new();
            collect_blocks(cell, &mut blocks);
            for block in blocks {
                match block {
                    Block::Paragraph(p) => format_cell_paragraph(p, table),
                    Block::Table(inner) => format_table(inner, table, true),
                }
            }
        }
    }
}

fn collect_rows<'a>(parent: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
    for child in parent.elements_mut() {
        if child.is("w:tr") {
            out.push(child);
        } else if child.is("w:sdt") {
            if let Some(content) = child.child_mut("w:sdtContent") {
                collect_rows(content, out);
            }
        } else if child.is("w:customXml") {
            collect_rows(child, out);
        }
    }
}

/// Apply heading, body and table formatting to the whole document body.
pub(super) fn apply(
    document: &mut XmlElement,
    styles: &mut StyleSheet,
    profile: &Profile,
    report: &mut Report,
) -> Result<(), Error> {
    for level in 1..=MAX_LEVEL {
        if let Some(rule) = profile.heading(level) {
            styles.apply_heading_style(level, rule);
        }
    }

    for block in body_blocks(document)? {
        match block {
            Block::Paragraph(p) => {
                let heading = styles
                    .heading_level(paragraph_style(p))
                    .and_then(|level| profile.heading(level));
                match heading {
                    Some(rule) => {
                        format_heading(p, rule);
                        report.headings_formatted += 1;
                    }
                    None => {
                        format_body(p, &profile.body);
                        report.body_paragraphs_formatted += 1;
                    }
                }
            }
            Block::Table(tbl) => {
                format_table(tbl, &profile.table, false);
                report.tables_formatted += 1;
            }
        }
    }
    Ok(())
}
