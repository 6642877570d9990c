//! Company-entry normalisation.
//!
//! Turns one scraped "past company" string into at most one clean label.
//! The stages run strictly in sequence, each on the previous stage's output:
//!
//! 1. [`normalize_spacing`]: split glued words, drop separator glyphs
//! 2. [`trim_repeated_phrase`]: collapse a leading phrase scraped twice
//! 3. [`strip_noise`]: truncate at dates, follower counts, tenure, job type
//! 4. [`tidy_residue`]: second separator pass, trim stray hyphens
//! 5. [`collapse_adjacent_duplicates`]: "Acme Acme" → "Acme"
//! 6. length gate: fewer than [`MIN_LABEL_CHARS`] characters is discarded
//!
//! ```ignore
//! let label = clean_company_entry("GoogleSoftware Engineer · Full-time Jun 2019");
//! assert_eq!(label.as_deref(), Some("Google Software Engineer"));
//! ```

pub mod noise;

use lazy_static::lazy_static;
use regex::Regex;

pub use noise::{strip_noise, NoiseMarker};

/// Longest phrase (in tokens) that [`trim_repeated_phrase`] will collapse.
pub const MAX_PHRASE_TOKENS: usize = 8;

/// Labels shorter than this (in characters) are discarded.
pub const MIN_LABEL_CHARS: usize = 2;

lazy_static! {
    static ref SEPARATOR_RUN: Regex = Regex::new(r"[•·|]+").unwrap();
}

/// Normalise one raw entry. `None` means the entry carried no usable label.
///
/// Pure and infallible: any string input yields a result.
pub fn clean_company_entry(entry: &str) -> Option<String> {
    if entry.is_empty() {
        return None;
    }

    let spaced = normalize_spacing(entry);
    let trimmed = trim_repeated_phrase(&spaced);
    let denoised = strip_noise(&trimmed);
    let tidied = tidy_residue(&denoised);
    let label = collapse_adjacent_duplicates(&tidied);

    if label.chars().count() < MIN_LABEL_CHARS {
        None
    } else {
        Some(label)
    }
}

/// Insert a space at every lower→upper transition and between an acronym
/// and a following capitalised word ("ABCFoo" → "ABC Foo"), replace the
/// separator glyphs `·`, `•`, `|` with spaces, then collapse whitespace.
///
/// Case transitions only consider ASCII letters.
pub fn normalize_spacing(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut spaced = String::with_capacity(text.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let camel = prev.is_ascii_lowercase() && c.is_ascii_uppercase();
            let acronym = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if camel || acronym {
                spaced.push(' ');
            }
        }
        spaced.push(match c {
            '·' | '•' | '|' => ' ',
            other => other,
        });
    }

    collapse_whitespace(&spaced)
}

/// If the entry starts with a phrase of up to [`MAX_PHRASE_TOKENS`] tokens
/// immediately repeated, keep one copy of it and drop the rest of the entry.
///
/// The longest qualifying phrase wins. Only repetition anchored at the start
/// is detected.
pub fn trim_repeated_phrase(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let max_size = (tokens.len() / 2).min(MAX_PHRASE_TOKENS);

    for size in (1..=max_size).rev() {
        if tokens[..size] == tokens[size..2 * size] {
            return tokens[..size].join(" ");
        }
    }
    text.to_string()
}

/// Replace leftover separator runs, collapse whitespace, and strip leading
/// and trailing spaces, hyphens and middle dots.
pub fn tidy_residue(text: &str) -> String {
    let replaced = SEPARATOR_RUN.replace_all(text, " ");
    collapse_whitespace(&replaced)
        .trim_matches(|c| matches!(c, ' ' | '-' | '·'))
        .to_string()
}

/// Drop any token equal (ignoring case) to the token kept just before it.
pub fn collapse_adjacent_duplicates(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for token in text.split_whitespace() {
        let repeat = kept
            .last()
            .is_some_and(|prev| prev.to_lowercase() == token.to_lowercase());
        if !repeat {
            kept.push(token);
        }
    }
    kept.join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
