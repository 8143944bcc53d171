//! G-Code line parser
//!
//! Splits a line into its code and comment parts and extracts the address
//! words (`X10.5`, `E-.8`, ...). Parsing never fails: a word whose numeric
//! literal is malformed is simply treated as absent.

use regex::Regex;
use std::sync::OnceLock;
use wavekit_core::Point2D;

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Za-z])([^A-Za-z\s]*)").expect("invalid regex pattern")
    })
}

fn number_regex() -> &'static Regex {
    static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    NUMBER_REGEX
        .get_or_init(|| Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)$").expect("invalid regex pattern"))
}

/// One address word such as `X10.5`
#[derive(Debug, Clone, PartialEq)]
struct Word {
    letter: char,
    value: Option<f64>,
}

/// A single parsed G-Code line
///
/// Borrows the raw text; rewriting produces new strings rather than mutating
/// the line.
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeLine<'a> {
    raw: &'a str,
    code: &'a str,
    comment: Option<&'a str>,
    words: Vec<Word>,
}

impl<'a> GcodeLine<'a> {
    /// Parse a raw line
    pub fn parse(raw: &'a str) -> Self {
        let (code, comment) = match raw.find(';') {
            Some(pos) => (&raw[..pos], Some(&raw[pos + 1..])),
            None => (raw, None),
        };

        let words = word_regex()
            .captures_iter(code)
            .filter_map(|caps| {
                let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
                let number = caps.get(2)?;
                let value = if number_regex().is_match(number.as_str()) {
                    number.as_str().parse::<f64>().ok()
                } else {
                    None
                };
                Some(Word { letter, value })
            })
            .collect();

        Self {
            raw,
            code,
            comment,
            words,
        }
    }

    /// The original text
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Text before the comment, trimmed
    pub fn code(&self) -> &'a str {
        self.code.trim()
    }

    /// Text after the first `;`, if any
    pub fn comment(&self) -> Option<&'a str> {
        self.comment
    }

    /// Command word, e.g. `('G', 1.0)` for `G1`
    pub fn command(&self) -> Option<(char, f64)> {
        let first = self.words.first()?;
        Some((first.letter, first.value?))
    }

    /// Whether this is a `G0`/`G1` motion command
    pub fn is_motion(&self) -> bool {
        matches!(self.command(), Some(('G', n)) if n == 0.0 || n == 1.0)
    }

    /// Whether this is a `G1` linear move
    pub fn is_linear(&self) -> bool {
        matches!(self.command(), Some(('G', n)) if n == 1.0)
    }

    /// Value of the first parameter word with `letter`, skipping the command word
    pub fn field(&self, letter: char) -> Option<f64> {
        let letter = letter.to_ascii_uppercase();
        self.words
            .iter()
            .skip(1)
            .find(|w| w.letter == letter)
            .and_then(|w| w.value)
    }

    /// Whether a parameter word with `letter` is present with a valid number
    pub fn has_field(&self, letter: char) -> bool {
        self.field(letter).is_some()
    }

    pub fn x(&self) -> Option<f64> {
        self.field('X')
    }

    pub fn y(&self) -> Option<f64> {
        self.field('Y')
    }

    pub fn z(&self) -> Option<f64> {
        self.field('Z')
    }

    pub fn e(&self) -> Option<f64> {
        self.field('E')
    }

    pub fn f(&self) -> Option<f64> {
        self.field('F')
    }

    /// Whether the line names either planar coordinate
    pub fn has_xy(&self) -> bool {
        self.x().is_some() || self.y().is_some()
    }

    /// Planar target of the move
    ///
    /// A missing axis is taken from `from`; without a previous position both
    /// axes must be present.
    pub fn target(&self, from: Option<Point2D>) -> Option<Point2D> {
        match (self.x(), self.y(), from) {
            (Some(x), Some(y), _) => Some(Point2D::new(x, y)),
            (Some(x), None, Some(p)) => Some(Point2D::new(x, p.y)),
            (None, Some(y), Some(p)) => Some(Point2D::new(p.x, y)),
            _ => None,
        }
    }
}
