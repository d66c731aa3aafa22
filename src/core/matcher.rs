//! Longest-match resolution shared by the batch and streaming lexers.
//!
//! Both lexers drive the same [`Walker`]: feed it characters until it reports a
//! broken path (or input runs out), then ask it to resolve the consumed text.
//! The only difference between the two is where the characters come from.

use std::borrow::Cow;
use std::iter::FusedIterator;

use rayon::prelude::*;
use thiserror::Error;

use super::term::Term;
use super::trie::{fold_char, NodeId, Trie, ROOT};

/// Switches that change how a walk is resolved.
///
/// ```
/// use trex::MatchOptions;
///
/// let options = MatchOptions::default().case_insensitive(true);
/// assert!(options.case_insensitive);
/// assert!(!options.emit_unmatched);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatchOptions {
    /// Accept a hit whose spelling differs from the input only by case.
    pub case_insensitive: bool,
    /// Emit a single-character unmatched [`Term`] where nothing matched,
    /// instead of skipping the character silently.
    pub emit_unmatched: bool,
}

impl MatchOptions {
    /// Set [`case_insensitive`](Self::case_insensitive).
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Set [`emit_unmatched`](Self::emit_unmatched).
    pub fn emit_unmatched(mut self, emit_unmatched: bool) -> Self {
        self.emit_unmatched = emit_unmatched;
        self
    }
}

/// Internal signal: nothing in the dictionary resolves at this position.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No match found")]
pub(crate) struct NoMatch;

#[derive(Debug, Clone, Copy)]
struct Mark {
    node: NodeId,
    chars: usize,
    bytes: usize,
}

/// A resolved dictionary hit and the length of input it consumes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hit<'t> {
    pub(crate) term: &'t Term,
    pub(crate) chars: usize,
    pub(crate) bytes: usize,
}

/// Outcome of one lexing step: how much input it consumed and what it emits.
#[derive(Debug, Clone)]
pub(crate) struct Step<'t> {
    pub(crate) chars: usize,
    pub(crate) bytes: usize,
    pub(crate) term: Option<Cow<'t, Term>>,
}

/// Longest-match walk from the trie root.
#[derive(Debug, Clone)]
pub(crate) struct Walker<'t> {
    trie: &'t Trie,
    node: NodeId,
    chars: usize,
    bytes: usize,
    best: Option<Mark>,
}

impl<'t> Walker<'t> {
    pub(crate) fn new(trie: &'t Trie) -> Self {
        Self {
            trie,
            node: ROOT,
            chars: 0,
            bytes: 0,
            best: None,
        }
    }

    /// Descend by one character. Returns `false` once the path is broken; the
    /// walker must not be fed again after that.
    #[inline]
    pub(crate) fn feed(&mut self, ch: char) -> bool {
        let Some(next) = self.trie.node(self.node).child(fold_char(ch)) else {
            return false;
        };

        self.node = next;
        self.chars += 1;
        self.bytes += ch.len_utf8();

        if self.trie.node(next).has_terms() {
            self.best = Some(Mark {
                node: next,
                chars: self.chars,
                bytes: self.bytes,
            });
        }
        true
    }

    /// Characters needed in the candidate text to resolve this walk.
    pub(crate) fn needed_chars(&self) -> usize {
        self.best.map_or(1, |best| best.chars.max(1))
    }

    /// Resolve the longest terminal node seen against `consumed`, the input
    /// text starting at the position the walk started from.
    pub(crate) fn resolve(
        &self,
        consumed: &str,
        case_insensitive: bool,
    ) -> Result<Hit<'t>, NoMatch> {
        let best = self.best.ok_or(NoMatch)?;
        let node = self.trie.node(best.node);
        let exact = consumed.get(..best.bytes).ok_or(NoMatch)?;

        let term = match node.term(exact) {
            Some(term) => term,
            None if case_insensitive => node.any_term().ok_or(NoMatch)?,
            None => return Err(NoMatch),
        };

        Ok(Hit {
            term,
            chars: best.chars,
            bytes: best.bytes,
        })
    }

    /// Resolve and apply the no-hit fallback.
    ///
    /// Returns `None` only when `consumed` is empty.
    pub(crate) fn finish(&self, consumed: &str, options: MatchOptions) -> Option<Step<'t>> {
        match self.resolve(consumed, options.case_insensitive) {
            Ok(hit) => Some(Step {
                chars: hit.chars,
                bytes: hit.bytes,
                term: Some(Cow::Borrowed(hit.term)),
            }),
            Err(NoMatch) => {
                let first = consumed.chars().next()?;
                Some(Step {
                    chars: 1,
                    bytes: first.len_utf8(),
                    term: options
                        .emit_unmatched
                        .then(|| Cow::Owned(Term::unmatched(first))),
                })
            }
        }
    }
}

/// One step of a batch tokenization: the exact input consumed and the term
/// emitted for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'t, 's> {
    /// Exact slice of the input consumed by this step.
    pub span: &'s str,
    /// `None` when nothing matched and unmatched spans are not emitted.
    pub term: Option<Cow<'t, Term>>,
}

impl Lexeme<'_, '_> {
    /// `true` if this step produced a dictionary hit.
    pub fn is_matched(&self) -> bool {
        self.term.as_ref().is_some_and(|term| term.is_matched())
    }
}

/// Batch lexer over an in-memory string, see [`Trie::tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'t, 's> {
    trie: &'t Trie,
    rest: &'s str,
    options: MatchOptions,
}

impl<'t, 's> Iterator for Tokens<'t, 's> {
    type Item = Lexeme<'t, 's>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut walker = Walker::new(self.trie);
        for ch in self.rest.chars() {
            if !walker.feed(ch) {
                break;
            }
        }

        let step = walker.finish(self.rest, self.options)?;
        let (span, rest) = self.rest.split_at(step.bytes);
        self.rest = rest;

        Some(Lexeme {
            span,
            term: step.term,
        })
    }
}

impl FusedIterator for Tokens<'_, '_> {}

impl Trie {
    /// Longest dictionary hit at the start of `text`.
    ///
    /// With `case_sensitive`, the input must spell a term exactly. Otherwise a
    /// differently-cased input resolves to one of the terms stored for its
    /// lowercased spelling (which one is unspecified).
    ///
    /// Callers scanning a whole text skip the hit's
    /// [`char_len`](Term::char_len) characters, or one character on `None`.
    ///
    /// ```
    /// use trex::TrieBuilder;
    ///
    /// let trie = [("flag", 1), ("flags", 2)].into_iter().collect::<TrieBuilder>().build();
    /// assert_eq!(trie.search("flagpole", true).unwrap().text(), "flag");
    /// assert_eq!(trie.search("flagship", true).unwrap().text(), "flags");
    /// assert_eq!(trie.search("flags!", true).unwrap().text(), "flags");
    /// assert!(trie.search("FLAGS", true).is_none());
    /// assert!(trie.search("FLAGS", false).is_some());
    /// ```
    pub fn search(&self, text: &str, case_sensitive: bool) -> Option<&Term> {
        let mut walker = Walker::new(self);
        for ch in text.chars() {
            if !walker.feed(ch) {
                break;
            }
        }

        walker
            .resolve(text, !case_sensitive)
            .ok()
            .map(|hit| hit.term)
    }

    /// Split `text` into consecutive lexemes, longest match first.
    ///
    /// The spans of the returned lexemes always concatenate back to `text`.
    pub fn tokenize<'t, 's>(&'t self, text: &'s str, options: MatchOptions) -> Tokens<'t, 's> {
        Tokens {
            trie: self,
            rest: text,
            options,
        }
    }

    /// Tokenize many texts in parallel with Rayon.
    ///
    /// Parallelizes across texts, not within a single text.
    pub fn tokenize_batch<'t, 's>(
        &'t self,
        texts: &'s [String],
        options: MatchOptions,
    ) -> Vec<Vec<Lexeme<'t, 's>>> {
        texts
            .par_iter()
            .map(|text| self.tokenize(text, options).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trie::TrieBuilder;
    use pretty_assertions::assert_eq;

    const FLAG1: u64 = 1;
    const FLAG2: u64 = 1 << 1;
    const FLAG3: u64 = 1 << 2;

    fn make_test_trie() -> Trie {
        let mut builder = TrieBuilder::new();
        builder.insert("three flags", FLAG1 | FLAG2 | FLAG3);
        builder.insert("flag", FLAG1);
        builder.insert("Flag", FLAG2);
        builder.insert("\n", 0);
        builder.insert(" ", 0);
        builder.build()
    }

    fn texts(lexemes: &[Lexeme<'_, '_>]) -> Vec<Option<String>> {
        lexemes
            .iter()
            .map(|l| l.term.as_ref().map(|t| t.text().to_string()))
            .collect()
    }

    #[test]
    fn test_search_exact() {
        let trie = make_test_trie();
        for text in ["three flags", "flag", "Flag", "\n", " "] {
            let term = trie.search(text, true).unwrap();
            assert_eq!(term.text(), text);
            assert_eq!(Some(term), trie.get(text));
        }
    }

    #[test]
    fn test_search_longest_match() {
        let trie = [("in", 1), ("in the", 2), ("in the evening", 3)]
            .into_iter()
            .collect::<TrieBuilder>()
            .build();

        assert_eq!(trie.search("in the evening, where", true).unwrap().flags(), 3);
        assert_eq!(trie.search("in the eve", true).unwrap().flags(), 2);
        assert_eq!(trie.search("in th", true).unwrap().flags(), 1);
        assert!(trie.search("i", true).is_none());
    }

    #[test]
    fn test_search_prefers_longer_term_inside_word() {
        let trie = [("flag", 1), ("flags", 2)]
            .into_iter()
            .collect::<TrieBuilder>()
            .build();

        assert_eq!(trie.search("flagship", true).unwrap().text(), "flags");
        assert_eq!(trie.search("flagpole", true).unwrap().text(), "flag");
    }

    #[test]
    fn test_search_case_sensitive_wrong_case() {
        let trie = make_test_trie();
        // the path f-l-a-g exists, but neither spelling is "FLAG"
        assert!(trie.search("FLAG", true).is_none());
        assert!(trie.search("Three Flags", true).is_none());
    }

    #[test]
    fn test_search_case_insensitive_ambiguous() {
        let trie = make_test_trie();
        let term = trie.search("FLAG", false).unwrap();
        assert!(term.is_matched());
        assert!(term.flags() == FLAG1 || term.flags() == FLAG2);
        assert_eq!(term.text().to_lowercase(), "flag");

        // exact spelling still wins when it exists
        assert_eq!(trie.search("Flag", false).unwrap().flags(), FLAG2);
        assert_eq!(trie.search("flag", false).unwrap().flags(), FLAG1);
    }

    #[test]
    fn test_search_case_insensitive_single_variant() {
        let trie = make_test_trie();
        let term = trie.search("three fLAgs have", false).unwrap();
        assert_eq!(term.text(), "three flags");
        assert_eq!(term.flags(), FLAG1 | FLAG2 | FLAG3);
    }

    #[test]
    fn test_search_empty() {
        let trie = make_test_trie();
        assert!(trie.search("", true).is_none());
        assert!(Trie::default().search("flag", false).is_none());
    }

    #[test]
    fn test_tokenize_fallback_is_one_char() {
        let trie = [("abc", 1), ("b", 2)].into_iter().collect::<TrieBuilder>().build();
        let options = MatchOptions::default().emit_unmatched(true);

        // "ab" walks two nodes deep but never reaches a terminal one
        let lexemes: Vec<_> = trie.tokenize("abd", options).collect();
        let spans: Vec<_> = lexemes.iter().map(|l| l.span).collect();
        assert_eq!(spans, vec!["a", "b", "d"]);
        assert_eq!(
            lexemes.iter().map(Lexeme::is_matched).collect::<Vec<_>>(),
            vec![false, true, false]
        );
    }

    #[test]
    fn test_tokenize_suppressed_unmatched() {
        let trie = make_test_trie();
        let lexemes: Vec<_> = trie.tokenize("a flag", MatchOptions::default()).collect();

        assert_eq!(
            texts(&lexemes),
            vec![None, Some(" ".to_string()), Some("flag".to_string())]
        );
        assert_eq!(lexemes.iter().map(|l| l.span).collect::<String>(), "a flag");
    }

    #[test]
    fn test_tokenize_case_sensitive_mismatch_falls_back() {
        let trie = make_test_trie();
        let options = MatchOptions::default().emit_unmatched(true);
        let lexemes: Vec<_> = trie.tokenize("FLAG", options).collect();

        assert_eq!(
            texts(&lexemes),
            ["F", "L", "A", "G"].map(|s| Some(s.to_string())).to_vec()
        );
        assert!(lexemes.iter().all(|l| !l.is_matched()));
    }

    #[test]
    fn test_tokenize_unmatched_term_fields() {
        let trie = make_test_trie();
        let options = MatchOptions::default().emit_unmatched(true);
        let lexeme = trie.tokenize("ü", options).next().unwrap();

        assert_eq!(lexeme.span, "ü");
        let term = lexeme.term.unwrap();
        assert_eq!(term.text(), "ü");
        assert_eq!(term.flags(), 0);
        assert_eq!(term.position(), 0);
        assert!(!term.is_matched());
    }

    #[test]
    fn test_tokenize_multibyte_terms() {
        let trie = [("日本", 1), ("日本語", 2), ("ÉTÉ", 3)]
            .into_iter()
            .collect::<TrieBuilder>()
            .build();
        let options = MatchOptions::default().case_insensitive(true);

        let lexemes: Vec<_> = trie.tokenize("日本語と été", options).collect();
        let spans: Vec<_> = lexemes.iter().map(|l| l.span).collect();
        assert_eq!(spans, vec!["日本語", "と", " ", "été"]);
        assert_eq!(lexemes[3].term.as_ref().unwrap().text(), "ÉTÉ");
    }

    #[test]
    fn test_tokenize_batch_matches_sequential() {
        let trie = make_test_trie();
        let options = MatchOptions::default()
            .case_insensitive(true)
            .emit_unmatched(true);
        let inputs: Vec<String> = vec![
            "three flags have flagged".to_string(),
            "\nFLAG flag Flag".to_string(),
            String::new(),
        ];

        let batch = trie.tokenize_batch(&inputs, options);
        assert_eq!(batch.len(), inputs.len());
        for (text, lexemes) in inputs.iter().zip(&batch) {
            let sequential: Vec<_> = trie.tokenize(text, options).collect();
            assert_eq!(&sequential, lexemes);
        }
        assert!(batch[2].is_empty());
    }
}
