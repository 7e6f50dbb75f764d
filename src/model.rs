use serde::{Deserialize, Serialize};

use crate::numbering::{MAX_LEVEL, NumberingScheme};

/// Formatting for body paragraphs outside tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyFormat {
    pub east_asia_font: String,
    pub font: String,
    pub size_pt: f32,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub line_spacing: f32, // multiple of single spacing
    pub first_line_indent_cm: f32,
}

impl Default for BodyFormat {
    fn default() -> Self {
        Self {
            east_asia_font: "宋体".into(),
            font: "Times New Roman".into(),
            size_pt: 10.5,
            space_before_pt: 6.0,
            space_after_pt: 6.0,
            line_spacing: 1.0,
            first_line_indent_cm: 0.75,
        }
    }
}

/// Formatting for tables and the paragraphs inside their cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableFormat {
    pub east_asia_font: String,
    pub font: String,
    pub size_pt: f32,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub line_spacing: f32,
    pub width_in: f32,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            east_asia_font: "宋体".into(),
            font: "Times New Roman".into(),
            size_pt: 10.5,
            space_before_pt: 4.0,
            space_after_pt: 4.0,
            line_spacing: 1.0,
            width_in: 6.0,
        }
    }
}

/// Look of one heading level. Spacing and indent go on the heading style,
/// fonts and size on the heading's runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadingStyle {
    pub font: String,
    pub east_asia_font: String,
    pub size_pt: f32,
    pub bold: bool,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub line_spacing: f32,
    pub first_line_indent_cm: f32,
}

impl HeadingStyle {
    fn new(
        font: &str,
        east_asia_font: &str,
        size_pt: f32,
        bold: bool,
        space_pt: f32,
        line_spacing: f32,
        first_line_indent_cm: f32,
    ) -> Self {
        Self {
            font: font.into(),
            east_asia_font: east_asia_font.into(),
            size_pt,
            bold,
            space_before_pt: space_pt,
            space_after_pt: space_pt,
            line_spacing,
            first_line_indent_cm,
        }
    }
}

pub fn default_heading_styles() -> [HeadingStyle; MAX_LEVEL as usize] {
    [
        HeadingStyle::new("Arial", "黑体", 14.0, true, 12.0, 1.5, 0.0),
        HeadingStyle::new("Arial", "黑体", 12.0, true, 12.0, 1.5, 0.75),
        HeadingStyle::new("Times New Roman", "宋体", 10.5, false, 8.0, 1.0, 1.5),
        HeadingStyle::new("Times New Roman", "宋体", 10.5, false, 8.0, 1.0, 2.25),
        HeadingStyle::new("Times New Roman", "宋体", 10.5, false, 6.0, 1.0, 3.0),
        HeadingStyle::new("Arial", "宋体", 9.0, false, 2.0, 1.0, 0.0),
        HeadingStyle::new("Arial", "宋体", 8.0, false, 0.0, 1.0, 0.0),
        HeadingStyle::new("Arial", "宋体", 7.0, false, 0.0, 1.0, 0.0),
        HeadingStyle::new("Arial", "宋体", 6.0, false, 0.0, 1.0, 0.0),
    ]
}

/// Switches for the outline clean-up that runs before numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineOptions {
    /// Give default-style paragraphs with an outline level the matching heading style.
    pub promote_outline_levels: bool,
    pub demote_empty_headings: bool,
    /// Demote headings followed by nothing but other headings.
    pub demote_headings_without_content: bool,
    pub zero_indents: bool,
    /// Remove list numbering from every body paragraph, not just headings.
    pub strip_list_numbering: bool,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            promote_outline_levels: true,
            demote_empty_headings: true,
            demote_headings_without_content: true,
            zero_indents: true,
            strip_list_numbering: true,
        }
    }
}

impl OutlineOptions {
    pub fn disabled() -> Self {
        Self {
            promote_outline_levels: false,
            demote_empty_headings: false,
            demote_headings_without_content: false,
            zero_indents: false,
            strip_list_numbering: false,
        }
    }
}

/// Everything one run of the tool is configured with.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub numbering: NumberingScheme,
    pub outline: OutlineOptions,
    pub body: BodyFormat,
    pub table: TableFormat,
    pub headings: [HeadingStyle; MAX_LEVEL as usize],
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            numbering: NumberingScheme::default(),
            outline: OutlineOptions::default(),
            body: BodyFormat::default(),
            table: TableFormat::default(),
            headings: default_heading_styles(),
        }
    }
}

impl Profile {
    pub fn heading(&self, level: u8) -> Option<&HeadingStyle> {
        (1..=MAX_LEVEL)
            .contains(&level)
            .then(|| &self.headings[usize::from(level - 1)])
    }
}

/// Counts of what was changed in one document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub promoted: usize,
    pub demoted_empty: usize,
    pub demoted_without_content: usize,
    pub list_numbering_removed: usize,
    pub numbered: usize,
    pub stripped_prefixes: usize,
    pub body_paragraphs_formatted: usize,
    pub headings_formatted: usize,
    pub tables_formatted: usize,
}
