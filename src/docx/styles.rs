use std::collections::HashMap;

use crate::model::HeadingStyle;
use crate::numbering::MAX_LEVEL;
use crate::xml::XmlElement;

use super::{set_first_line_indent, set_spacing};

/// Child order of `w:style` (CT_Style).
const STYLE_ORDER: &[&str] = &[
    "w:name",
    "w:aliases",
    "w:basedOn",
    "w:next",
    "w:link",
    "w:autoRedefine",
    "w:hidden",
    "w:uiPriority",
    "w:semiHidden",
    "w:unhideWhenUsed",
    "w:qFormat",
    "w:locked",
    "w:personal",
    "w:personalCompose",
    "w:personalReply",
    "w:rsid",
    "w:pPr",
    "w:rPr",
    "w:tblPr",
    "w:trPr",
    "w:tcPr",
    "w:tblStylePr",
];

/// Styles whose own numbering definitions are removed before headings are renumbered.
const NUMBERED_STYLE_NAMES: &[&str] = &["list paragraph"];

/// `heading 3` (or the localized `标题 3`) → 3.
fn parse_heading_level(name: &str) -> Option<u8> {
    let name = name.trim().to_lowercase();
    let rest = name
        .strip_prefix("heading")
        .or_else(|| name.strip_prefix("标题"))?;
    rest.trim()
        .parse::<u8>()
        .ok()
        .filter(|l| (1..=MAX_LEVEL).contains(l))
}

/// `word/styles.xml` plus an index of its paragraph styles.
pub(crate) struct StyleSheet {
    root: Option<XmlElement>,
    /// style id → lowercase style name
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
    headings: [Option<String>; MAX_LEVEL as usize],
}

impl StyleSheet {
    pub(crate) fn new(root: Option<XmlElement>) -> Self {
        let mut names = HashMap::new();
        let mut default_paragraph = None;
        let mut headings: [Option<String>; MAX_LEVEL as usize] = Default::default();

        for style in root.iter().flat_map(|r| r.elements()) {
            if !style.is("w:style") || style.attr("w:type") != Some("paragraph") {
                continue;
            }
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let name = style
                .child_val("w:name")
                .unwrap_or(id)
                .to_lowercase();
            if matches!(style.attr("w:default"), Some("1" | "true" | "on")) && default_paragraph.is_none() {
                default_paragraph = Some(id.to_string());
            }
            if let Some(level) = parse_heading_level(&name) {
                let slot = &mut headings[usize::from(level - 1)];
                if slot.is_none() {
                    *slot = Some(id.to_string());
                }
            }
            names.insert(id.to_string(), name);
        }

        Self {
            root,
            names,
            default_paragraph,
            headings,
        }
    }

    pub(crate) fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }

    /// Whether a paragraph with this `w:pStyle` (or none) uses the default paragraph style.
    pub(crate) fn is_default(&self, style_id: Option<&str>) -> bool {
        match style_id {
            None => true,
            Some(id) => self.default_paragraph.as_deref() == Some(id),
        }
    }

    pub(crate) fn heading_level(&self, style_id: Option<&str>) -> Option<u8> {
        self.names
            .get(style_id?)
            .and_then(|name| parse_heading_level(name))
    }

    pub(crate) fn heading_style_id(&self, level: u8) -> Option<&str> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return None;
        }
        self.headings[usize::from(level - 1)].as_deref()
    }

    fn style_mut(&mut self, id: &str) -> Option<&mut XmlElement> {
        self.root
            .as_mut()?
            .elements_mut()
            .find(|s| s.is("w:style") && s.attr("w:styleId") == Some(id))
    }

    /// Drop `w:numPr` from the heading and list paragraph styles so Word's
    /// automatic numbering does not stack on top of the generated numbers.
    pub(crate) fn strip_style_numbering(&mut self) -> usize {
        let ids: Vec<String> = self
            .names
            .iter()
            .filter(|(_, name)| {
                parse_heading_level(name).is_some() || NUMBERED_STYLE_NAMES.contains(&name.as_str())
            })
            .map(|(id, _)| id.clone())
            .collect();

        let mut removed = 0;
        for id in ids {
            if let Some(ppr) = self.style_mut(&id).and_then(|s| s.child_mut("w:pPr")) {
                removed += ppr.remove_children("w:numPr");
            }
        }
        if removed > 0 {
            log::debug!("Removed numbering from {removed} styles");
        }
        removed
    }

    /// Put the heading rule's spacing, line spacing and first-line indent on
    /// the style of that heading level.
    pub(crate) fn apply_heading_style(&mut self, level: u8, rule: &HeadingStyle) -> bool {
        let Some(id) = self.heading_style_id(level).map(str::to_string) else {
            return false;
        };
        let Some(style) = self.style_mut(&id) else {
            return false;
        };
        let ppr = style.ensure_child("w:pPr", STYLE_ORDER);

        set_spacing(ppr, rule.space_before_pt, rule.space_after_pt, rule.line_spacing);
        set_first_line_indent(ppr, rule.first_line_indent_cm);
        true
    }
}
