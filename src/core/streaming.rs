//! Streaming lexer over a pull-based character source.
//!
//! [`StreamingLexer`] produces the same lexemes as [`Trie::tokenize`] without
//! holding the whole input in memory. It keeps a small queue of characters
//! that were read as lookahead but not consumed. The next step replays them
//! before pulling anything new, so every character is read from the source
//! exactly once.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io;

use tracing::warn;

use super::matcher::{MatchOptions, Walker};
use super::source::CharSource;
use super::term::Term;
use super::trie::Trie;

/// A stateful longest-match lexer over a [`CharSource`].
///
/// Drive it with [`advance`](Self::advance) and read each step with
/// [`current`](Self::current) and [`span`](Self::span). One lexer belongs to
/// one consumer at a time; the [`Trie`] it borrows can be shared freely.
///
/// # Example
///
/// ```
/// use trex::{StreamingLexer, StrSource, TrieBuilder};
///
/// let trie = [("flag", 1), (" ", 0)].into_iter().collect::<TrieBuilder>().build();
/// let mut lexer = StreamingLexer::new(&trie, StrSource::new("FLAG flags"))
///     .case_insensitive(true)
///     .emit_unmatched(true);
///
/// let mut spans = Vec::new();
/// while lexer.advance() {
///     spans.push(lexer.span().to_string());
/// }
/// assert!(lexer.last_error().is_none());
/// assert_eq!(spans, ["FLAG", " ", "flag", "s"]);
/// ```
pub struct StreamingLexer<'t, S> {
    trie: &'t Trie,
    source: S,
    options: MatchOptions,
    buffer: VecDeque<char>,
    exhausted: bool,
    current: Option<Cow<'t, Term>>,
    span: String,
    error: Option<io::Error>,
}

impl<'t, S: CharSource> StreamingLexer<'t, S> {
    /// Create a lexer with default options: case-sensitive, unmatched
    /// characters skipped silently.
    pub fn new(trie: &'t Trie, source: S) -> Self {
        Self::with_options(trie, source, MatchOptions::default())
    }

    pub fn with_options(trie: &'t Trie, source: S, options: MatchOptions) -> Self {
        Self {
            trie,
            source,
            options,
            buffer: VecDeque::with_capacity(16),
            exhausted: false,
            current: None,
            span: String::new(),
            error: None,
        }
    }

    /// Accept hits that differ from the input only by letter case.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.options.case_insensitive = case_insensitive;
        self
    }

    /// Emit single-character unmatched terms where nothing matched.
    pub fn emit_unmatched(mut self, emit_unmatched: bool) -> Self {
        self.options.emit_unmatched = emit_unmatched;
        self
    }

    /// The options this lexer resolves with.
    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Consume the next lexeme.
    ///
    /// Returns `true` when a step was taken; [`current`](Self::current) may
    /// still be `None` if the step skipped an unmatched character. Returns
    /// `false` at clean end of input, or after a source failure, which is
    /// then available from [`last_error`](Self::last_error).
    pub fn advance(&mut self) -> bool {
        self.current = None;
        self.span.clear();

        if self.error.is_some() {
            return false;
        }

        let mut walker = Walker::new(self.trie);
        let mut broken = false;

        // Replay lookahead left over from the previous step
        for &ch in &self.buffer {
            if !walker.feed(ch) {
                broken = true;
                break;
            }
        }

        while !broken && !self.exhausted {
            match self.source.next_char() {
                Ok(Some(ch)) => {
                    self.buffer.push_back(ch);
                    broken = !walker.feed(ch);
                }
                Ok(None) => self.exhausted = true,
                Err(err) => {
                    warn!(error = %err, pending = self.buffer.len(), "character source failed");
                    self.error = Some(err);
                    return false;
                }
            }
        }

        if self.buffer.is_empty() {
            return false;
        }

        let candidate: String = self.buffer.iter().take(walker.needed_chars()).collect();
        let Some(step) = walker.finish(&candidate, self.options) else {
            return false;
        };

        self.buffer.drain(..step.chars);
        self.span.push_str(&candidate[..step.bytes]);
        self.current = step.term;
        true
    }

    /// The term produced by the latest step, if any.
    pub fn current(&self) -> Option<&Term> {
        self.current.as_deref()
    }

    /// Take ownership of the latest term, leaving `None` behind.
    pub fn take_current(&mut self) -> Option<Cow<'t, Term>> {
        self.current.take()
    }

    /// Exact input text consumed by the latest step.
    ///
    /// For case-insensitive hits this is the text as it appeared in the
    /// input, which may differ in case from the term.
    pub fn span(&self) -> &str {
        &self.span
    }

    /// The source failure that stopped this lexer, if any. Never cleared.
    pub fn last_error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Check if lookahead characters are waiting for the next step.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Number of lookahead characters waiting for the next step.
    pub fn pending_chars(&self) -> usize {
        self.buffer.len()
    }

    /// Unwrap the source. Pending lookahead is discarded.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S> std::fmt::Debug for StreamingLexer<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingLexer")
            .field("options", &self.options)
            .field("buffer", &self.buffer)
            .field("exhausted", &self.exhausted)
            .field("current", &self.current)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
