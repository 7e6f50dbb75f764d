//! JSON profile files.
//!
//! A profile only needs the fields it changes:
//!
//! ```json
//! {
//!   "numbering": { "levels": { "3": { "format": "dotted_path" } } },
//!   "body": { "size_pt": 12 },
//!   "headings": { "1": { "size_pt": 16, "east_asia_font": "方正小标宋简体" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{BodyFormat, HeadingStyle, OutlineOptions, Profile, TableFormat};
use crate::numbering::{MAX_LEVEL, NumberingScheme};

const FONT_SIZE_PT: RangeInclusive<f32> = 5.0..=30.0;
const SPACING_PT: RangeInclusive<f32> = 0.0..=50.0;
const LINE_SPACING: RangeInclusive<f32> = 0.5..=3.0;
const FIRST_LINE_INDENT_CM: RangeInclusive<f32> = 0.0..=5.0;
const TABLE_WIDTH_IN: RangeInclusive<f32> = 1.0..=10.0;

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfileFile {
    numbering: NumberingScheme,
    outline: OutlineOptions,
    body: BodyFormat,
    table: TableFormat,
    headings: BTreeMap<u8, HeadingStylePatch>,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeadingStylePatch {
    font: Option<String>,
    east_asia_font: Option<String>,
    size_pt: Option<f32>,
    bold: Option<bool>,
    space_before_pt: Option<f32>,
    space_after_pt: Option<f32>,
    line_spacing: Option<f32>,
    first_line_indent_cm: Option<f32>,
}

impl HeadingStylePatch {
    fn apply(self, style: &mut HeadingStyle) {
        if let Some(v) = self.font {
            style.font = v;
        }
        if let Some(v) = self.east_asia_font {
            style.east_asia_font = v;
        }
        if let Some(v) = self.size_pt {
            style.size_pt = v;
        }
        if let Some(v) = self.bold {
            style.bold = v;
        }
        if let Some(v) = self.space_before_pt {
            style.space_before_pt = v;
        }
        if let Some(v) = self.space_after_pt {
            style.space_after_pt = v;
        }
        if let Some(v) = self.line_spacing {
            style.line_spacing = v;
        }
        if let Some(v) = self.first_line_indent_cm {
            style.first_line_indent_cm = v;
        }
    }
}

#[derive(Serialize)]
struct ProfileOut<'a> {
    numbering: &'a NumberingScheme,
    outline: &'a OutlineOptions,
    body: &'a BodyFormat,
    table: &'a TableFormat,
    headings: BTreeMap<u8, &'a HeadingStyle>,
}

fn check(field: &str, value: f32, range: &RangeInclusive<f32>) -> Result<(), Error> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{field} = {value} is outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}

fn check_font(field: &str, name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

impl Profile {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let file: ProfileFile = serde_json::from_str(text)?;
        let mut profile = Profile {
            numbering: file.numbering,
            outline: file.outline,
            body: file.body,
            table: file.table,
            ..Profile::default()
        };
        for (level, patch) in file.headings {
            if !(1..=MAX_LEVEL).contains(&level) {
                return Err(Error::Config(format!(
                    "heading level {level} is outside 1..={MAX_LEVEL}"
                )));
            }
            patch.apply(&mut profile.headings[usize::from(level - 1)]);
        }
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        let out = ProfileOut {
            numbering: &self.numbering,
            outline: &self.outline,
            body: &self.body,
            table: &self.table,
            headings: (1..=MAX_LEVEL).zip(self.headings.iter()).collect(),
        };
        Ok(serde_json::to_string_pretty(&out)?)
    }

    /// Reject values outside the ranges the formatting rules accept.
    pub fn validate(&self) -> Result<(), Error> {
        let b = &self.body;
        check_font("body.font", &b.font)?;
        check_font("body.east_asia_font", &b.east_asia_font)?;
        check("body.size_pt", b.size_pt, &FONT_SIZE_PT)?;
        check("body.space_before_pt", b.space_before_pt, &SPACING_PT)?;
        check("body.space_after_pt", b.space_after_pt, &SPACING_PT)?;
        check("body.line_spacing", b.line_spacing, &LINE_SPACING)?;
        check("body.first_line_indent_cm", b.first_line_indent_cm, &FIRST_LINE_INDENT_CM)?;

        let t = &self.table;
        check_font("table.font", &t.font)?;
        check_font("table.east_asia_font", &t.east_asia_font)?;
        check("table.size_pt", t.size_pt, &FONT_SIZE_PT)?;
        check("table.space_before_pt", t.space_before_pt, &SPACING_PT)?;
        check("table.space_after_pt", t.space_after_pt, &SPACING_PT)?;
        check("table.line_spacing", t.line_spacing, &LINE_SPACING)?;
        check("table.width_in", t.width_in, &TABLE_WIDTH_IN)?;

        for (i, h) in self.headings.iter().enumerate() {
            let level = i + 1;
            check_font(&format!("headings.{level}.font"), &h.font)?;
            check_font(&format!("headings.{level}.east_asia_font"), &h.east_asia_font)?;
            check(&format!("headings.{level}.size_pt"), h.size_pt, &FONT_SIZE_PT)?;
            check(&format!("headings.{level}.space_before_pt"), h.space_before_pt, &SPACING_PT)?;
            check(&format!("headings.{level}.space_after_pt"), h.space_after_pt, &SPACING_PT)?;
            check(&format!("headings.{level}.line_spacing"), h.line_spacing, &LINE_SPACING)?;
            check(
                &format!("headings.{level}.first_line_indent_cm"),
                h.first_line_indent_cm,
                &FIRST_LINE_INDENT_CM,
            )?;
        }
        Ok(())
    }
}
