use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const CHINESE_DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// How the counter of one heading level is rendered in front of the heading text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// `一、`
    Chinese,
    /// `（一）`
    ChineseBracket,
    /// `1.`
    ArabicDot,
    /// `（1）`
    ArabicBracket,
    /// `i.`
    RomanLower,
    /// `I.`
    RomanUpper,
    /// `a.`, falling back to `27.` past `z`
    AlphabetLower,
    /// `A.`, falling back to `27.` past `Z`
    AlphabetUpper,
    /// `①` up to `⑳`, plain decimal beyond
    Circled,
    /// Counters of every level down to this one, e.g. `2.1.3.`
    DottedPath,
}

impl NumberFormat {
    pub const ALL: [NumberFormat; 10] = [
        NumberFormat::Chinese,
        NumberFormat::ChineseBracket,
        NumberFormat::ArabicDot,
        NumberFormat::ArabicBracket,
        NumberFormat::RomanLower,
        NumberFormat::RomanUpper,
        NumberFormat::AlphabetLower,
        NumberFormat::AlphabetUpper,
        NumberFormat::Circled,
        NumberFormat::DottedPath,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            NumberFormat::Chinese => "chinese",
            NumberFormat::ChineseBracket => "chinese_bracket",
            NumberFormat::ArabicDot => "arabic_dot",
            NumberFormat::ArabicBracket => "arabic_bracket",
            NumberFormat::RomanLower => "roman_lower",
            NumberFormat::RomanUpper => "roman_upper",
            NumberFormat::AlphabetLower => "alphabet_lower",
            NumberFormat::AlphabetUpper => "alphabet_upper",
            NumberFormat::Circled => "circled",
            NumberFormat::DottedPath => "dotted_path",
        }
    }

    /// Render the prefix for a heading. `path` holds the counters of levels
    /// 1..=L, so its last element is the counter of the heading's own level.
    pub fn render(self, path: &[u32]) -> String {
        let n = path.last().copied().unwrap_or(0);
        match self {
            NumberFormat::Chinese => format!("{}、", chinese_numeral(n)),
            NumberFormat::ChineseBracket => format!("（{}）", chinese_numeral(n)),
            NumberFormat::ArabicDot => format!("{n}."),
            NumberFormat::ArabicBracket => format!("（{n}）"),
            NumberFormat::RomanLower => format!("{}.", to_roman(n)),
            NumberFormat::RomanUpper => format!("{}.", to_roman(n).to_uppercase()),
            NumberFormat::AlphabetLower => format!("{}.", letter(n, b'a')),
            NumberFormat::AlphabetUpper => format!("{}.", letter(n, b'A')),
            NumberFormat::Circled => circled(n),
            // Unnumbered parents keep their `0` slot, as Word lists do.
            NumberFormat::DottedPath => {
                let mut out = String::new();
                for value in path {
                    out.push_str(&value.to_string());
                    out.push('.');
                }
                out
            }
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for NumberFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        NumberFormat::ALL
            .into_iter()
            .find(|f| f.identifier() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = NumberFormat::ALL.iter().map(|f| f.identifier()).collect();
                format!("unknown number format '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Chinese numeral text for 0..=100. Larger values come back as decimal digits.
pub fn chinese_numeral(n: u32) -> String {
    match n {
        0..=9 => CHINESE_DIGITS[n as usize].to_string(),
        10..=19 => {
            let ones = n - 10;
            if ones == 0 {
                "十".to_string()
            } else {
                format!("十{}", CHINESE_DIGITS[ones as usize])
            }
        }
        20..=99 => {
            let tens = CHINESE_DIGITS[(n / 10) as usize];
            let ones = n % 10;
            if ones == 0 {
                format!("{tens}十")
            } else {
                format!("{tens}十{}", CHINESE_DIGITS[ones as usize])
            }
        }
        100 => "一百".to_string(),
        _ => n.to_string(),
    }
}

pub fn to_roman(mut n: u32) -> String {
    const TABLE: &[(u32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut result = String::new();
    for &(value, numeral) in TABLE {
        while n >= value {
            result.push_str(numeral);
            n -= value;
        }
    }
    result
}

fn letter(n: u32, base: u8) -> String {
    if (1..=26).contains(&n) {
        char::from(base + (n - 1) as u8).to_string()
    } else {
        n.to_string()
    }
}

/// `①`..`⑳` for 1..=20, decimal otherwise.
pub fn circled(n: u32) -> String {
    if (1..=20).contains(&n) {
        char::from_u32(0x245F + n)
            .map(String::from)
            .unwrap_or_else(|| n.to_string())
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_numerals_match_canonical_forms() {
        let expected = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
        for (n, want) in expected.iter().enumerate() {
            assert_eq!(chinese_numeral(n as u32), *want);
        }
        assert_eq!(chinese_numeral(10), "十");
        assert_eq!(chinese_numeral(11), "十一");
        assert_eq!(chinese_numeral(19), "十九");
        assert_eq!(chinese_numeral(20), "二十");
        assert_eq!(chinese_numeral(35), "三十五");
        assert_eq!(chinese_numeral(99), "九十九");
        assert_eq!(chinese_numeral(100), "一百");
        assert_eq!(chinese_numeral(101), "101");
    }

    #[test]
    fn renders_every_format() {
        assert_eq!(NumberFormat::Chinese.render(&[3]), "三、");
        assert_eq!(NumberFormat::ChineseBracket.render(&[1, 12]), "（十二）");
        assert_eq!(NumberFormat::ArabicDot.render(&[7]), "7.");
        assert_eq!(NumberFormat::ArabicBracket.render(&[1, 2, 4]), "（4）");
        assert_eq!(NumberFormat::RomanLower.render(&[14]), "xiv.");
        assert_eq!(NumberFormat::RomanUpper.render(&[9]), "IX.");
        assert_eq!(NumberFormat::AlphabetLower.render(&[26]), "z.");
        assert_eq!(NumberFormat::AlphabetLower.render(&[27]), "27.");
        assert_eq!(NumberFormat::AlphabetUpper.render(&[2]), "B.");
        assert_eq!(NumberFormat::Circled.render(&[1]), "①");
        assert_eq!(NumberFormat::Circled.render(&[20]), "⑳");
        assert_eq!(NumberFormat::Circled.render(&[21]), "21");
        assert_eq!(NumberFormat::DottedPath.render(&[2, 1, 3]), "2.1.3.");
    }

    #[test]
    fn parses_identifiers() {
        assert_eq!("arabic_dot".parse::<NumberFormat>(), Ok(NumberFormat::ArabicDot));
        assert_eq!("Dotted-Path".parse::<NumberFormat>(), Ok(NumberFormat::DottedPath));
        assert!("hex".parse::<NumberFormat>().is_err());
    }
}
