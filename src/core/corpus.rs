//! N-gram corpus loader.
//!
//! Seeds a [`TrieBuilder`] with multi-word terms taken from running text.
//! Words are whitespace-delimited and read through a sliding window. At every
//! window position each prefix of the window is inserted as one term, words
//! joined by a single space.
//!
//! # Example
//!
//! With a gram range of `(1, 2)` the window holds two words, and the corpus
//! `the rain grows` yields:
//!
//! ```text
//! position 0: "the", "the rain"
//! position 1: "rain", "rain grows"
//! position 2: "grows"
//! ```
//!
//! Each term's flags carry [`gram_flag`] of its word count and its position is
//! the window index. A term seen at several positions keeps the first one.

use std::collections::VecDeque;
use std::io::BufRead;

use thiserror::Error;
use tracing::debug;

use super::trie::TrieBuilder;

/// Largest window, one flag bit per gram length.
pub const MAX_WINDOW: usize = u64::BITS as usize;

/// Errors that can occur when loading a corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Invalid gram range {min}..={max}: need 1 <= min <= max and at most 64 words per window")]
    InvalidGramRange { min: usize, max: usize },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Flag bit tagging a gram of `len` words (`1 <= len <= 64`), or `0` outside
/// that range.
pub fn gram_flag(len: usize) -> u64 {
    match len {
        1..=MAX_WINDOW => 1 << (len - 1),
        _ => 0,
    }
}

/// Load n-grams from `reader` into `builder`.
///
/// `min` and `max` bound the gram lengths; the window holds
/// `max - min + 1` words. Returns the number of window positions processed.
pub fn load_ngrams<R: BufRead>(
    builder: &mut TrieBuilder,
    reader: R,
    min: usize,
    max: usize,
) -> Result<usize, CorpusError> {
    if min == 0 || min > max || max - min >= MAX_WINDOW {
        return Err(CorpusError::InvalidGramRange { min, max });
    }

    let size = max - min + 1;
    let mut window: VecDeque<String> = VecDeque::with_capacity(size);
    let mut position = 0;
    let terms_before = builder.len();

    for line in reader.lines() {
        let line = line?;
        for word in line.split_whitespace() {
            window.push_back(word.to_owned());
            if window.len() == size {
                insert_window(builder, &window, position);
                position += 1;
                window.pop_front();
            }
        }
    }

    // Tail: keep sliding until the window is empty
    while !window.is_empty() {
        insert_window(builder, &window, position);
        position += 1;
        window.pop_front();
    }

    debug!(
        windows = position,
        window_size = size,
        new_terms = builder.len() - terms_before,
        "corpus loaded"
    );

    Ok(position)
}

fn insert_window(builder: &mut TrieBuilder, window: &VecDeque<String>, position: usize) {
    let mut gram = String::new();
    for (i, word) in window.iter().enumerate() {
        if i > 0 {
            gram.push(' ');
        }
        gram.push_str(word);
        builder.insert_at(&gram, gram_flag(i + 1), position);
    }
}
