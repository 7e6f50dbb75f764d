mod format;
mod strip;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use format::{NumberFormat, chinese_numeral, circled, to_roman};
pub use strip::{manual_numbering_len, strip_manual_numbering};

pub const MAX_LEVEL: u8 = 9;

/// A paragraph as the numbering engine sees it: its text and, for headings,
/// the outline level (1..=9). Levels outside that range are left alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub level: Option<u8>,
}

impl Paragraph {
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: None,
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: Some(level),
        }
    }
}

/// Current number of every heading level while scanning one document.
/// Slots deeper than the most recently advanced level are always zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeadingCounters([u32; MAX_LEVEL as usize]);

impl HeadingCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: u8) -> Option<u32> {
        slot(level).map(|i| self.0[i])
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Counters of levels 1..=level.
    pub fn path(&self, level: u8) -> &[u32] {
        match slot(level) {
            Some(i) => &self.0[..=i],
            None => &[],
        }
    }

    /// Bump `level` and zero every deeper level.
    pub fn advance(mut self, level: u8) -> Self {
        if let Some(i) = slot(level) {
            self.0[i] += 1;
            self.reset_below_slot(i);
        }
        self
    }

    /// Zero every level deeper than `level` without touching `level` itself.
    pub fn reset_below(mut self, level: u8) -> Self {
        if let Some(i) = slot(level) {
            self.reset_below_slot(i);
        }
        self
    }

    fn reset_below_slot(&mut self, i: usize) {
        for c in &mut self.0[i + 1..] {
            *c = 0;
        }
    }
}

fn slot(level: u8) -> Option<usize> {
    (1..=MAX_LEVEL)
        .contains(&level)
        .then(|| usize::from(level - 1))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelNumbering {
    pub apply: bool,
    pub format: NumberFormat,
}

impl Default for LevelNumbering {
    fn default() -> Self {
        Self {
            apply: true,
            format: NumberFormat::ArabicDot,
        }
    }
}

/// Which format every heading level is numbered with, plus a global switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberingScheme {
    pub enabled: bool,
    levels: [LevelNumbering; MAX_LEVEL as usize],
}

impl Default for NumberingScheme {
    fn default() -> Self {
        let mut levels = [LevelNumbering {
            apply: true,
            format: NumberFormat::Circled,
        }; MAX_LEVEL as usize];
        levels[0].format = NumberFormat::Chinese;
        levels[1].format = NumberFormat::ChineseBracket;
        levels[2].format = NumberFormat::ArabicDot;
        levels[3].format = NumberFormat::ArabicBracket;
        Self {
            enabled: true,
            levels,
        }
    }
}

impl NumberingScheme {
    /// Every level uses `format`.
    pub fn uniform(format: NumberFormat) -> Self {
        Self {
            enabled: true,
            levels: [LevelNumbering {
                apply: true,
                format,
            }; MAX_LEVEL as usize],
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn level(&self, level: u8) -> Option<&LevelNumbering> {
        slot(level).map(|i| &self.levels[i])
    }

    pub fn level_mut(&mut self, level: u8) -> Option<&mut LevelNumbering> {
        slot(level).map(|i| &mut self.levels[i])
    }

    pub fn with_format(mut self, level: u8, format: NumberFormat) -> Self {
        if let Some(rule) = self.level_mut(level) {
            rule.format = format;
        }
        self
    }

    pub fn without_level(mut self, level: u8) -> Self {
        if let Some(rule) = self.level_mut(level) {
            rule.apply = false;
        }
        self
    }
}

/// JSON shape: `{ "enabled": true, "levels": { "1": { "format": "chinese" } } }`.
/// Levels not listed keep their defaults.
#[derive(Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SchemeRepr {
    enabled: bool,
    levels: BTreeMap<u8, LevelNumbering>,
}

impl Default for SchemeRepr {
    fn default() -> Self {
        Self {
            enabled: true,
            levels: BTreeMap::new(),
        }
    }
}

impl Serialize for NumberingScheme {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SchemeRepr {
            enabled: self.enabled,
            levels: (1..=MAX_LEVEL)
                .zip(self.levels.iter().copied())
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NumberingScheme {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SchemeRepr::deserialize(deserializer)?;
        let mut scheme = NumberingScheme {
            enabled: repr.enabled,
            ..NumberingScheme::default()
        };
        for (level, rule) in repr.levels {
            let Some(slot) = scheme.level_mut(level) else {
                return Err(serde::de::Error::custom(format!(
                    "heading level {level} is outside 1..={MAX_LEVEL}"
                )));
            };
            *slot = rule;
        }
        Ok(scheme)
    }
}

/// What happened to a single heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadingOutcome {
    /// New text with the rendered number in front.
    Numbered { text: String, prefix: String },
    /// Level has numbering switched off; the text is only stripped.
    Unnumbered { text: String },
    /// Level outside 1..=9 or numbering disabled globally; text untouched.
    Skipped,
}

/// Run one heading through the state machine. Pure: the caller keeps the
/// returned counters for the next heading.
pub fn number_heading(
    counters: HeadingCounters,
    level: u8,
    text: &str,
    scheme: &NumberingScheme,
) -> (HeadingCounters, HeadingOutcome) {
    let Some(rule) = scheme.level(level).filter(|_| scheme.enabled) else {
        return (counters, HeadingOutcome::Skipped);
    };
    let stripped = strip_manual_numbering(text);
    if !rule.apply {
        return (
            counters.reset_below(level),
            HeadingOutcome::Unnumbered {
                text: stripped.to_string(),
            },
        );
    }
    let counters = counters.advance(level);
    let prefix = rule.format.render(counters.path(level));
    let text = format!("{prefix}{stripped}");
    (counters, HeadingOutcome::Numbered { text, prefix })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NumberingSummary {
    pub numbered: usize,
    pub unnumbered: usize,
    pub skipped: usize,
    /// Headings whose text lost a hand-typed number.
    pub stripped: usize,
}

/// Number every heading of one document in place. Body paragraphs are left as
/// they are; a fresh set of counters is used for every call.
pub fn number_headings(paragraphs: &mut [Paragraph], scheme: &NumberingScheme) -> NumberingSummary {
    let mut summary = NumberingSummary::default();
    let mut counters = HeadingCounters::new();

    for paragraph in paragraphs.iter_mut() {
        let Some(level) = paragraph.level else {
            continue;
        };
        let had_prefix = manual_numbering_len(paragraph.text.trim_start()) > 0;
        let (next, outcome) = number_heading(counters, level, &paragraph.text, scheme);
        counters = next;
        match outcome {
            HeadingOutcome::Numbered { text, prefix } => {
                log::debug!("H{level} {prefix} <- {:?}", paragraph.text);
                paragraph.text = text;
                summary.numbered += 1;
            }
            HeadingOutcome::Unnumbered { text } => {
                paragraph.text = text;
                summary.unnumbered += 1;
            }
            HeadingOutcome::Skipped => {
                if scheme.enabled {
                    log::debug!("Skipping heading with unsupported level {level}");
                }
                summary.skipped += 1;
                continue;
            }
        }
        if had_prefix {
            summary.stripped += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(paragraphs: &[Paragraph]) -> Vec<&str> {
        paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn advance_resets_deeper_levels() {
        let c = HeadingCounters::new().advance(1).advance(2).advance(3).advance(2);
        assert_eq!(c.as_slice(), &[1, 2, 0, 0, 0, 0, 0, 0, 0]);
        let c = c.advance(9).advance(1);
        assert_eq!(c.as_slice(), &[2, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn out_of_range_levels_are_ignored_by_counters() {
        let c = HeadingCounters::new().advance(1);
        assert_eq!(c.advance(0), c);
        assert_eq!(c.advance(10), c);
        assert_eq!(c.get(10), None);
        assert!(c.path(0).is_empty());
    }

    #[test]
    fn disabled_level_resets_children_without_advancing() {
        let scheme = NumberingScheme::uniform(NumberFormat::ArabicDot).without_level(1);
        let mut doc = vec![
            Paragraph::heading(2, "a"),
            Paragraph::heading(2, "b"),
            Paragraph::heading(1, "1. Part"),
            Paragraph::heading(2, "c"),
        ];
        let summary = number_headings(&mut doc, &scheme);
        assert_eq!(texts(&doc), ["1.a", "2.b", "Part", "1.c"]);
        assert_eq!(summary.numbered, 3);
        assert_eq!(summary.unnumbered, 1);
        assert_eq!(summary.stripped, 1);
    }

    #[test]
    fn scheme_json_overrides_single_levels() {
        let scheme: NumberingScheme = serde_json::from_str(
            r#"{ "levels": { "3": { "format": "dotted_path" }, "5": { "apply": false } } }"#,
        )
        .unwrap();
        assert!(scheme.enabled);
        assert_eq!(scheme.level(1).unwrap().format, NumberFormat::Chinese);
        assert_eq!(scheme.level(3).unwrap().format, NumberFormat::DottedPath);
        assert!(!scheme.level(5).unwrap().apply);

        let bad = serde_json::from_str::<NumberingScheme>(r#"{ "levels": { "12": {} } }"#);
        assert!(bad.is_err());
    }
}
