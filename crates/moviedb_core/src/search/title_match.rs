//! Title search expression builder for the `movies_fts` index.
//!
//! # Invariants
//! - Tokenization mirrors the `unicode61` tokenizer: runs of grapheme clusters
//!   whose base character is alphanumeric are tokens, everything else
//!   separates. Combining marks stay with the letter they modify.
//! - Every produced term is quoted, so user text can never form FTS5 operators.
//! - Case folding is left to the tokenizer.

use unicode_segmentation::UnicodeSegmentation;

/// How the title clause of a listing query should behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    /// Empty search text: the clause accepts every row.
    Any,
    /// Search text with no searchable tokens: the clause accepts no row.
    Nothing,
    /// FTS5 expression requiring every term.
    Terms(String),
}

/// Builds the title clause for `text`.
pub fn build_title_match(text: &str) -> TitleMatch {
    if text.is_empty() {
        return TitleMatch::Any;
    }

    let terms = tokenize(text)
        .into_iter()
        .map(|term| format!("\"{term}\""))
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return TitleMatch::Nothing;
    }

    TitleMatch::Terms(terms.join(" AND "))
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut term_start = None;

    for (offset, grapheme) in text.grapheme_indices(true) {
        let is_term_char = grapheme.chars().next().is_some_and(char::is_alphanumeric);
        match (is_term_char, term_start) {
            (true, None) => term_start = Some(offset),
            (false, Some(start)) => {
                terms.push(&text[start..offset]);
                term_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = term_start {
        terms.push(&text[start..]);
    }
    terms
}
