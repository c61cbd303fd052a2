//! Parser builder

use crate::error::Result;
use crate::parser::ControlDocument;

/// What to do with a second `fed method` or `fed order` section
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq)]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateSection`
    #[default]
    Reject,
    /// Later section replaces the earlier one
    KeepLast,
}

/// What to do with lines after `start simulation`
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq)]
pub enum TrailingContent {
    /// Drop them (with a warning)
    #[default]
    Ignore,
    /// Fail with `MalformedDocument`
    Reject,
}

#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct ParserOptions {
    pub duplicate_fed_sections: DuplicatePolicy,
    pub trailing_content: TrailingContent,
}

/// Reusable CONTROL parser with fixed options
#[derive(Clone,Debug,Default)]
pub struct ControlParser {
    options: ParserOptions,
}

impl ControlParser {
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, text: &str) -> Result<ControlDocument> {
        ControlDocument::parse_with(text, &self.options)
    }
}

/// Builder for `ControlParser` with default values
#[derive(Default)]
pub struct ParserBuilder {
    options: ParserOptions,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_fed_sections(mut self, policy: DuplicatePolicy) -> Self {
        self.options.duplicate_fed_sections = policy;
        self
    }

    pub fn with_trailing_content(mut self, handling: TrailingContent) -> Self {
        self.options.trailing_content = handling;
        self
    }

    pub fn build(self) -> ControlParser {
        ControlParser { options: self.options }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_on_duplicates_lenient_on_trailing() {
        let parser = ParserBuilder::new().build();
        assert_eq!(parser.options().duplicate_fed_sections, DuplicatePolicy::Reject);
        assert_eq!(parser.options().trailing_content, TrailingContent::Ignore);
    }

    #[test]
    fn options_reach_the_grammar() {
        let text = "Title\nuse fed generic\nfed order temp 1 1 2\nfed order temp 2 1 2\nfed done\nfinish\nstart";
        assert!(ControlParser::default().parse(text).is_err(), "Duplicate accepted by default");
        let parser = ParserBuilder::new()
            .with_duplicate_fed_sections(DuplicatePolicy::KeepLast)
            .with_trailing_content(TrailingContent::Reject)
            .build();
        let doc = parser.parse(text).expect("KeepLast parser rejected duplicate");
        let op = doc.use_block.fed().and_then(|fed| fed.order_parameter.as_ref());
        assert_eq!(op.map(|op| op.to_string()).as_deref(), Some("fed order param temp 2 1.0 2.0"));
        assert!(parser.parse("Title\nfinish\nstart\nextra").is_err(), "Trailing content accepted");
    }
}
