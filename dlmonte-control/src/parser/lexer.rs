//! Line normalization: comments, whitespace and blank lines

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Everything from this character to the end of the line is a comment
pub const COMMENT_MARKER: char = '#';

/// A normalized statement line together with its position in the raw text
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct Line {
    /// 1-based line number in the raw input
    pub number: usize,
    /// Comment-free text with single spaces between tokens
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self { number, text: text.into() }
    }

    /// Placeholder for "ran out of lines" after `last`
    pub fn end_of_input(last: Option<&Line>) -> Self {
        Self {
            number: last.map(|l| l.number + 1).unwrap_or(1),
            text: String::new(),
        }
    }

    /// Whitespace-separated tokens (original case)
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    /// Lower-cased copy of the text, used for keyword matching
    pub fn lowercase(&self) -> String {
        self.text.to_lowercase()
    }

    /// Lower-cased first token (empty for an end-of-input marker)
    pub fn keyword(&self) -> String {
        self.text.split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase()
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "line {}: end of input", self.number)
        }
        else {
            write!(f, "line {}: '{}'", self.number, self.text)
        }
    }
}

/// Strip the comment from a single line and compact its whitespace
pub fn normalize_line(line: &str) -> String {
    let content = match line.find(COMMENT_MARKER) {
        Some(idx) => &line[..idx],
        None => line,
    };
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn raw text into the ordered list of non-empty statement lines
pub fn normalize(text: &str) -> Vec<Line> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let text = normalize_line(raw);
            if text.is_empty() {
                None
            }
            else {
                Some(Line::new(idx + 1, text))
            }
        })
        .collect()
}
