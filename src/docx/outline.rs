use crate::error::Error;
use crate::model::{OutlineOptions, Profile, Report};
use crate::xml::XmlElement;

use super::{
    Block, PPR_ORDER, StyleSheet, body_blocks, body_paragraphs, has_visual_content,
    paragraph_style, paragraph_text, ppr_mut, set_paragraph_style, trim_leading_whitespace,
};

/// Character-unit and logical-direction variants of `w:ind` that would
/// override the twip values written by `zero_indent`.
const IND_OVERRIDES: &[&str] = &[
    "w:leftChars",
    "w:rightChars",
    "w:firstLineChars",
    "w:hanging",
    "w:hangingChars",
    "w:start",
    "w:end",
    "w:startChars",
    "w:endChars",
];

/// Clear left/right/first-line indents and tab stops, then drop leading
/// whitespace from the text.
fn zero_indent(p: &mut XmlElement) {
    let ppr = ppr_mut(p);
    let ind = ppr.ensure_child("w:ind", PPR_ORDER);
    for attr in IND_OVERRIDES {
        ind.remove_attr(attr);
    }
    ind.set_attr("w:left", "0");
    ind.set_attr("w:right", "0");
    ind.set_attr("w:firstLine", "0");
    ppr.remove_children("w:tabs");

    trim_leading_whitespace(p);
}

fn outline_level(p: &XmlElement) -> Option<u8> {
    p.child("w:pPr")?
        .child_val("w:outlineLvl")?
        .parse::<u8>()
        .ok()
}

/// Give a default-style paragraph with an outline level the matching heading style.
fn promote(p: &mut XmlElement, styles: &StyleSheet) -> bool {
    if !styles.is_default(paragraph_style(p)) {
        return false;
    }
    let Some(level) = outline_level(p).and_then(|l| l.checked_add(1)) else {
        return false;
    };
    let Some(id) = styles.heading_style_id(level).map(str::to_string) else {
        return false;
    };
    set_paragraph_style(p, Some(&id));
    true
}

fn is_heading(p: &XmlElement, styles: &StyleSheet) -> bool {
    styles.heading_level(paragraph_style(p)).is_some()
}

fn is_heading_block(block: &Block, styles: &StyleSheet) -> bool {
    matches!(block, Block::Paragraph(p) if is_heading(p, styles))
}

fn is_blank(p: &XmlElement) -> bool {
    paragraph_text(p).trim().is_empty() && !has_visual_content(p)
}

fn has_content(block: &Block) -> bool {
    match block {
        Block::Paragraph(p) => !is_blank(p),
        Block::Table(_) => true,
    }
}

/// Fix up the heading outline before numbering: indents, promotion of
/// outline-level paragraphs and demotion of headings that head nothing.
pub(super) fn restructure(
    document: &mut XmlElement,
    styles: &StyleSheet,
    options: &OutlineOptions,
    report: &mut Report,
) -> Result<(), Error> {
    let mut blocks = body_blocks(document)?;

    for block in blocks.iter_mut() {
        let Block::Paragraph(p) = block else {
            continue;
        };
        if options.zero_indents {
            zero_indent(p);
        }
        if options.promote_outline_levels && promote(p, styles) {
            report.promoted += 1;
        }
    }

    if options.demote_empty_headings {
        for block in blocks.iter_mut() {
            let Block::Paragraph(p) = block else {
                continue;
            };
            if is_heading(p, styles) && is_blank(p) {
                set_paragraph_style(p, None);
                report.demoted_empty += 1;
            }
        }
    }

    // Walk backwards so a demoted heading counts as content for the one above it.
    if options.demote_headings_without_content {
        let heading_idx: Vec<usize> = blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| is_heading_block(b, styles))
            .map(|(i, _)| i)
            .collect();
        for &i in heading_idx.iter().rev() {
            let followed_by_content = blocks[i + 1..]
                .iter()
                .take_while(|b| !is_heading_block(b, styles))
                .any(has_content);
            if followed_by_content {
                continue;
            }
            if let Block::Paragraph(p) = &mut blocks[i] {
                log::debug!("Demoting heading without content: {:?}", paragraph_text(p));
                set_paragraph_style(p, None);
                report.demoted_without_content += 1;
            }
        }
    }

    if report.promoted + report.demoted_empty + report.demoted_without_content > 0 {
        log::debug!(
            "Outline: promoted={}, demoted empty={}, demoted without content={}",
            report.promoted,
            report.demoted_empty,
            report.demoted_without_content
        );
    }
    Ok(())
}

/// Remove Word list numbering: from the heading styles and heading paragraphs
/// when headings are renumbered, and from every body paragraph when asked to.
pub(super) fn strip_numbering(
    document: &mut XmlElement,
    styles: &mut StyleSheet,
    profile: &Profile,
    report: &mut Report,
) -> Result<(), Error> {
    let renumbering = profile.numbering.enabled;
    if renumbering {
        styles.strip_style_numbering();
    }

    for p in body_paragraphs(document)? {
        let heading = is_heading(p, styles);
        if !((heading && renumbering) || profile.outline.strip_list_numbering) {
            continue;
        }
        if let Some(ppr) = p.child_mut("w:pPr")
            && ppr.remove_children("w:numPr") > 0
        {
            report.list_numbering_removed += 1;
        }
    }
    Ok(())
}
