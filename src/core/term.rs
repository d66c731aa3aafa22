//! The record attached to every dictionary term.

/// A dictionary term, or a synthesized single-character span.
///
/// Terms stored in a [`Trie`](super::Trie) always have `matched == true`.
/// Lexers synthesize unmatched terms (see [`Term::unmatched`]) for characters
/// that start no dictionary hit, when asked to emit them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    text: String,
    position: usize,
    flags: u64,
    matched: bool,
}

impl Term {
    /// Create a matched term.
    pub fn new(text: impl Into<String>, position: usize, flags: u64) -> Self {
        Self {
            text: text.into(),
            position,
            flags,
            matched: true,
        }
    }

    /// Create the fallback term for a character that matched nothing.
    ///
    /// Flags and position are zero.
    pub fn unmatched(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            position: 0,
            flags: 0,
            matched: false,
        }
    }

    /// Exact, case-preserved text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters, i.e. how far a batch caller skips.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Position counter assigned at insertion.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The 64-bit flag set.
    pub fn flags(&self) -> u64 {
        self.flags
    }

    /// `true` for dictionary hits, `false` for fallback spans.
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Check that every bit of `flags` is set.
    pub fn has_flags(&self, flags: u64) -> bool {
        self.flags & flags == flags
    }

    /// Set every bit of `flags`, keeping the others.
    pub fn set_flags(&mut self, flags: u64) {
        self.flags |= flags;
    }

    /// Clear every bit of `flags`, keeping the others.
    pub fn unset_flags(&mut self, flags: u64) {
        self.flags &= !flags;
    }

    pub(crate) fn replace_flags(&mut self, flags: u64) {
        self.flags = flags;
    }
}
