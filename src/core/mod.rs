//! Core matching engine for trex.
//!
//! # Architecture
//!
//! - [`Term`]: the record attached to every dictionary entry
//! - [`TrieBuilder`] / [`Trie`]: arena-backed prefix tree over lowercased
//!   characters, mutable while building and read-only once built
//! - [`matcher`]: the longest-match walk shared by every entry point, plus the
//!   batch API ([`Trie::search`], [`Trie::tokenize`], [`Trie::tokenize_batch`])
//! - [`StreamingLexer`]: the same walk over a pull-based [`CharSource`], with
//!   bounded lookahead
//! - [`corpus`]: n-gram loader that seeds a builder from running text
//!
//! # Matching
//!
//! At each position the lexers take the longest dictionary term that prefixes
//! the remaining input. Where nothing matches, exactly one character is
//! consumed and either skipped or emitted as an unmatched [`Term`].

pub mod corpus;
pub mod matcher;
mod source;
mod streaming;
mod term;
mod trie;

pub use corpus::{gram_flag, load_ngrams, CorpusError};
pub use matcher::{Lexeme, MatchOptions, Tokens};
pub use source::{CharSource, StrSource, Utf8Source};
pub use streaming::StreamingLexer;
pub use term::Term;
pub use trie::{fold_char, NodeView, Trie, TrieBuilder};
