//! Whole CONTROL documents: title, use block and main block

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::control::{ParserOptions, TrailingContent};
use crate::error::{ControlError, Result};

use super::*;

/// A parsed CONTROL file
#[derive(Clone,Debug,Default,PartialEq,Serialize,Deserialize)]
pub struct ControlDocument {
    /// Free text first line (case preserved)
    pub title: String,
    pub use_block: UseBlock,
    pub main_block: MainBlock,
}

/// The three contiguous spans of a normalized document
struct Spans<'a> {
    title: &'a Line,
    use_lines: &'a [Line],
    main_lines: &'a [Line],
}

fn is_fed_start(line: &Line) -> bool {
    let tokens = line.tokens();
    tokens.len() >= 2 && tokens[0].eq_ignore_ascii_case("use") && tokens[1].eq_ignore_ascii_case("fed")
}

fn is_fed_done(line: &Line) -> bool {
    line.lowercase() == "fed done"
}

/// Split normalized lines at the use and main terminators. The FED block is
/// skipped as a unit so nothing inside it can end the use span.
fn split_spans<'a>(lines: &'a [Line], options: &ParserOptions) -> Result<Spans<'a>> {
    let (title, body) = lines.split_first().ok_or_else(|| ControlError::MalformedDocument {
        reason: "empty document".into(),
        at: Line::end_of_input(None),
    })?;

    let mut in_fed = false;
    let mut finish = None;
    for (idx, line) in body.iter().enumerate() {
        if in_fed {
            if line.keyword() == "finish" {
                return Err(ControlError::MalformedDocument {
                    reason: "'finish' inside a fed block, expected 'fed done' first".into(),
                    at: line.clone(),
                });
            }
            in_fed = !is_fed_done(line);
        }
        else if is_fed_start(line) {
            in_fed = true;
        }
        else if line.keyword() == "finish" {
            finish = Some(idx);
            break;
        }
    }
    let finish = match finish {
        Some(idx) => idx,
        None => return Err(ControlError::MalformedDocument {
            reason: if in_fed {
                "fed block without 'fed done' before the end of the use block".into()
            }
            else {
                format!("no '{}' terminator", USE_BLOCK_TERMINATOR)
            },
            at: Line::end_of_input(body.last().or(Some(title))),
        }),
    };
    let use_lines = &body[..finish];
    let rest = &body[finish + 1..];

    let start = rest.iter().position(|line| line.keyword() == "start").ok_or_else(|| {
        ControlError::MalformedDocument {
            reason: format!("no '{}' terminator", MAIN_BLOCK_TERMINATOR),
            at: Line::end_of_input(rest.last().or(Some(&body[finish]))),
        }
    })?;
    let main_lines = &rest[..start];
    let trailing = &rest[start + 1..];
    if let Some(first) = trailing.first() {
        match options.trailing_content {
            TrailingContent::Ignore => tracing::warn!(line = first.number, count = trailing.len(),
                "ignoring content after '{}'", MAIN_BLOCK_TERMINATOR),
            TrailingContent::Reject => return Err(ControlError::MalformedDocument {
                reason: format!("content after '{}'", MAIN_BLOCK_TERMINATOR),
                at: first.clone(),
            }),
        }
    }
    tracing::debug!(title = %title.text, use_lines = use_lines.len(), main_lines = main_lines.len(),
        "split control document");
    Ok(Spans { title, use_lines, main_lines })
}

impl ControlDocument {
    pub fn new(title: impl Into<String>, use_block: UseBlock, main_block: MainBlock) -> Self {
        Self { title: title.into(), use_block, main_block }
    }

    /// Parse with explicit options
    pub fn parse_with(text: &str, options: &ParserOptions) -> Result<ControlDocument> {
        let lines = normalize(text);
        let spans = split_spans(&lines, options)?;
        let use_block = UseBlock::parse(spans.use_lines, options)?;
        let main_block = MainBlock::parse(spans.main_lines)?;
        Ok(ControlDocument {
            title: spans.title.text.clone(),
            use_block,
            main_block,
        })
    }

    /// Activities of all grand-canonical movers, in move order
    pub fn activities(&self) -> Vec<(String, f64)> {
        self.main_block.moves.iter().flat_map(|mv| mv.activities()).collect()
    }

    /// Text the DL_MONTE executable accepts, after checking that a
    /// hand-built document would read back as itself
    pub fn serialize(&self) -> Result<String> {
        self.check()?;
        Ok(self.to_string())
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.title.is_empty() || normalize_line(&self.title) != self.title {
            return Err(ControlError::invariant(format!(
                "title must be a non-empty single line without '{}' or extra whitespace, got {:?}",
                COMMENT_MARKER, self.title)));
        }
        self.use_block.check()?;
        self.main_block.check()
    }
}

impl FromStr for ControlDocument {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with(s, &ParserOptions::default())
    }
}

impl Display for ControlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.use_block)?;
        write!(f, "{}", self.main_block)
    }
}
