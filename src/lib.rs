//! trex - dictionary-driven longest-match tokenizer.
//!
//! Build a [`Trie`] of known terms, each with a 64-bit flag set, then split
//! text into the longest terms it contains:
//!
//! - in memory, with [`Trie::search`] and [`Trie::tokenize`]
//! - in parallel across many texts, with [`Trie::tokenize_batch`] (Rayon)
//! - from any reader, with [`StreamingLexer`], one character pulled at a time
//!
//! ```
//! use trex::{MatchOptions, TrieBuilder};
//!
//! let mut builder = TrieBuilder::new();
//! builder.insert("three flags", 0b111);
//! builder.insert("flag", 0b001);
//! builder.insert(" ", 0);
//! let trie = builder.build();
//!
//! let options = MatchOptions::default().case_insensitive(true);
//! let spans: Vec<_> = trie
//!     .tokenize("Three Flags flagged", options)
//!     .map(|lexeme| (lexeme.span, lexeme.is_matched()))
//!     .collect();
//!
//! assert_eq!(spans[0], ("Three Flags", true));
//! assert_eq!(spans[2], ("flag", true));
//! ```

pub mod core;

pub use crate::core::{
    corpus, fold_char, gram_flag, load_ngrams, matcher, CharSource, CorpusError, Lexeme,
    MatchOptions, NodeView, StrSource, StreamingLexer, Term, Tokens, Trie, TrieBuilder,
    Utf8Source,
};
