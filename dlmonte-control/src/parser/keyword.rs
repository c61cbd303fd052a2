//! Keyword matching for the (abbreviation-tolerant) dispatch tables

/// How a table entry recognises its keyword
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub(crate) enum KeyMatch {
    /// Whole-word match
    Exact(&'static str),
    /// Any word starting with the prefix (DL_MONTE abbreviations)
    Prefix(&'static str),
}

impl KeyMatch {
    /// `word` must already be lower-case
    pub(crate) fn matches(&self, word: &str) -> bool {
        match self {
            KeyMatch::Exact(key) => word == *key,
            KeyMatch::Prefix(prefix) => word.starts_with(prefix),
        }
    }
}

/// First entry of an ordered table whose matcher accepts `word`
pub(crate) fn lookup<'t, T>(table: &'t [(KeyMatch, T)], word: &str) -> Option<&'t T> {
    table.iter()
        .find(|(matcher, _)| matcher.matches(word))
        .map(|(_, value)| value)
}
