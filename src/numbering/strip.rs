//! Recognizes hand-typed heading numbers such as `一、`, `（二）`, `3.`,
//! `1.2.3.` or `①` at the start of a heading.
//!
//! ```text
//! prefix     := segment (ws* segment)* ws*
//! segment    := open? ws* numeral{1,4} terminator
//!             | open? circled{1,4} terminator?
//! open       := '(' | '（'
//! terminator := '.' | '．' | '、' | ')' | '）' | ws
//! ```
//!
//! Segments are only taken when they match completely, so a heading such as
//! `2024年工作总结` keeps its leading digits.

const MAX_NUMERAL_CHARS: usize = 4;

fn is_open(c: char) -> bool {
    matches!(c, '(' | '（')
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '．' | '、' | ')' | '）') || c.is_whitespace()
}

fn is_circled(c: char) -> bool {
    ('\u{2460}'..='\u{2473}').contains(&c)
}

fn is_numeral(c: char) -> bool {
    c.is_ascii_digit()
        || ('０'..='９').contains(&c)
        || matches!(
            c,
            '〇' | '零' | '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九' | '十' | '百'
        )
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn eat(&mut self, pred: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(c) if pred(c) => {
                self.pos += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.eat(&pred) {}
        &self.text[start..self.pos]
    }
}

/// Byte length of one numbering segment at the start of `s`.
fn segment_len(s: &str) -> Option<usize> {
    let mut cur = Cursor::new(s);
    if cur.eat(is_open) {
        cur.eat_while(char::is_whitespace);
    }
    // Circled glyphs form their own run, so `①一体化` stops after `①`.
    if cur.peek().is_some_and(is_circled) {
        let count = cur.eat_while(is_circled).chars().count();
        if count > MAX_NUMERAL_CHARS {
            return None;
        }
        cur.eat(is_terminator);
        return Some(cur.pos);
    }
    let count = cur.eat_while(is_numeral).chars().count();
    if count == 0 || count > MAX_NUMERAL_CHARS {
        return None;
    }
    cur.eat(is_terminator).then_some(cur.pos)
}

/// Byte length of the manual numbering prefix of `text`, including the
/// whitespace after it. Zero when `text` does not start with numbering.
pub fn manual_numbering_len(text: &str) -> usize {
    let mut cur = Cursor::new(text);
    let mut end = 0;
    loop {
        let before = cur.pos;
        if end > 0 {
            cur.eat_while(char::is_whitespace);
        }
        match segment_len(&text[cur.pos..]) {
            Some(len) => {
                cur.pos += len;
                end = cur.pos;
            }
            None => {
                cur.pos = before;
                break;
            }
        }
    }
    if end == 0 {
        return 0;
    }
    cur.pos = end;
    cur.eat_while(char::is_whitespace);
    cur.pos
}

/// Heading text with any leading manual numbering removed and surrounding
/// whitespace trimmed.
pub fn strip_manual_numbering(text: &str) -> &str {
    let text = text.trim_start();
    text[manual_numbering_len(text)..].trim()
}
