//! Question marker recognition.
//!
//! All patterns run on text folded by [`fold_diacritics`], so "QUESTÃO",
//! "Questão" and "questao" are the same keyword.

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Remove combining marks after canonical decomposition ("ã" becomes "a").
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// What a single stripped line says about question numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatch {
    /// Keyword followed by a number on the same line ("Questão 07", "Questão07")
    Start(u32),
    /// The keyword with nothing else ("QUESTÃO")
    KeywordAlone,
    /// A bare numeral ("07")
    NumberAlone(u32),
    /// Anything else
    None,
}

/// Compiled question patterns, built once per run and passed explicitly.
#[derive(Debug, Clone)]
pub struct QuestionPatterns {
    start: Regex,
    keyword_alone: Regex,
    number_alone: Regex,
    in_text: Regex,
}

impl QuestionPatterns {
    /// Compile the patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            start: compile(r"(?i)\bquestao\s*0*(\d{1,3})\b")?,
            keyword_alone: compile(r"(?i)^questao$")?,
            number_alone: compile(r"^0*(\d{1,3})$")?,
            in_text: compile(r"(?i)questao\s*\d{1,3}")?,
        })
    }

    /// Number announced by a "start" line, if any.
    pub fn start_number(&self, line: &str) -> Option<u32> {
        let folded = fold_diacritics(line.trim());
        parse_capture(&self.start, &folded)
    }

    /// Whether the line holds the keyword and nothing else.
    pub fn is_keyword_alone(&self, line: &str) -> bool {
        self.keyword_alone.is_match(&fold_diacritics(line.trim()))
    }

    /// Numeral of a line that holds only a number.
    pub fn number_alone(&self, line: &str) -> Option<u32> {
        parse_capture(&self.number_alone, line.trim())
    }

    /// Whether the keyword followed by a number appears anywhere in `text`.
    pub fn mentions_question(&self, text: &str) -> bool {
        self.in_text.is_match(&fold_diacritics(text))
    }

    /// Classify one line. "Start" wins over "keyword alone".
    pub fn classify(&self, line: &str) -> LineMatch {
        if let Some(n) = self.start_number(line) {
            LineMatch::Start(n)
        } else if self.is_keyword_alone(line) {
            LineMatch::KeywordAlone
        } else if let Some(n) = self.number_alone(line) {
            LineMatch::NumberAlone(n)
        } else {
            LineMatch::None
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("invalid pattern {pattern}: {e}")))
}

fn parse_capture(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
