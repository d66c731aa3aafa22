//! Property-based tests for insertion and longest-match lexing.

use std::collections::HashMap;

use proptest::prelude::*;
use trex::{MatchOptions, StrSource, StreamingLexer, Trie, TrieBuilder};

/// Small alphabet so random terms share prefixes and actually match.
fn dictionary_strategy() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec(("[abAB ]{1,5}", any::<u64>()), 0..12)
}

fn options_strategy() -> impl Strategy<Value = MatchOptions> {
    (any::<bool>(), any::<bool>()).prop_map(|(case_insensitive, emit_unmatched)| MatchOptions {
        case_insensitive,
        emit_unmatched,
    })
}

fn build(words: &[(String, u64)]) -> Trie {
    words.iter().cloned().collect::<TrieBuilder>().build()
}

proptest! {
    #[test]
    fn test_inserted_terms_are_found(words in dictionary_strategy()) {
        let trie = build(&words);

        // later insertions of the same text win
        let latest: HashMap<&str, u64> = words.iter().map(|(t, f)| (t.as_str(), *f)).collect();
        prop_assert_eq!(trie.len(), latest.len());

        for (text, flags) in latest {
            let term = trie.search(text, true);
            prop_assert!(term.is_some(), "{:?} not found", text);
            let term = term.unwrap();
            prop_assert_eq!(term.text(), text);
            prop_assert_eq!(term.flags(), flags);
            prop_assert!(term.is_matched());
        }
    }

    #[test]
    fn test_longest_match_wins(
        prefix in "[a-z]{1,6}",
        suffix in "[a-z]{1,6}",
        tail in "[a-z ]{0,6}",
    ) {
        let longer = format!("{prefix}{suffix}");
        let trie = build(&[(prefix.clone(), 1), (longer.clone(), 2)]);

        let input = format!("{longer}{tail}");
        let term = trie.search(&input, true).unwrap();
        prop_assert_eq!(term.text(), longer.as_str());
        prop_assert_eq!(term.flags(), 2);
    }

    #[test]
    fn test_case_insensitive_always_matches_folded_spelling(
        word in "[a-z]{1,8}",
        masks in prop::collection::vec(prop::collection::vec(any::<bool>(), 8), 1..4),
    ) {
        let variants: Vec<(String, u64)> = masks
            .iter()
            .enumerate()
            .map(|(i, mask)| {
                let text = word
                    .chars()
                    .zip(mask)
                    .map(|(c, &upper)| if upper { c.to_ascii_uppercase() } else { c })
                    .collect();
                (text, 1 << i)
            })
            .collect();
        let trie = build(&variants);

        let query = word.to_uppercase();
        let term = trie.search(&query, false).unwrap();
        prop_assert!(term.is_matched());
        prop_assert!(variants.iter().any(|(text, _)| text == term.text()));
        prop_assert_eq!(Some(term), trie.get(term.text()));

        let exact = variants.iter().any(|(text, _)| *text == query);
        prop_assert_eq!(trie.search(&query, true).is_some(), exact);
    }

    #[test]
    fn test_streaming_reconstructs_input(
        words in dictionary_strategy(),
        input in "[abAB c]{0,40}",
        options in options_strategy(),
    ) {
        let trie = build(&words);
        let mut lexer = StreamingLexer::with_options(&trie, StrSource::new(&input), options);

        let mut rebuilt = String::new();
        while lexer.advance() {
            let span = lexer.span();
            prop_assert!(!span.is_empty());
            if let Some(term) = lexer.current() {
                if term.is_matched() {
                    prop_assert_eq!(term.text().to_lowercase(), span.to_lowercase());
                } else {
                    prop_assert_eq!(term.text(), span);
                }
            }
            rebuilt.push_str(span);
        }

        prop_assert!(lexer.last_error().is_none());
        prop_assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_batch_matches_streaming(
        words in dictionary_strategy(),
        input in "[abAB c]{0,40}",
        options in options_strategy(),
    ) {
        let trie = build(&words);

        let batch: Vec<(String, Option<String>)> = trie
            .tokenize(&input, options)
            .map(|l| (l.span.to_string(), l.term.map(|t| t.text().to_string())))
            .collect();

        let mut lexer = StreamingLexer::with_options(&trie, StrSource::new(&input), options);
        let mut streamed = Vec::new();
        while lexer.advance() {
            streamed.push((
                lexer.span().to_string(),
                lexer.current().map(|t| t.text().to_string()),
            ));
        }

        prop_assert_eq!(batch, streamed);
    }
}
