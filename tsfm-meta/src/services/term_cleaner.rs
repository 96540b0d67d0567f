//! Radio metadata term cleaning
//!
//! Now-playing feeds carry annotations that the catalog does not index:
//! "(feat. X)", "[Radio Edit]", "- Official Video". Cleaning strips them so
//! the qualified search strategies have a chance of an exact hit.
//!
//! Cleaning is applied until a fixed point, which makes it idempotent even
//! for nested brackets and stacked suffixes.

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)|\[[^\[\]]*\]").expect("valid bracket pattern"));

static MEDIA_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+-\s*(?:(?:official|lyric|music)\s*)?(?:video|audio|mix|remix|version)\s*$")
        .expect("valid suffix pattern")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip bracketed spans and media suffixes, collapse whitespace, trim
pub fn clean(term: &str) -> String {
    let mut current = clean_once(term);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(term: &str) -> String {
    let without_brackets = BRACKETED.replace_all(term, " ");
    let without_suffix = MEDIA_SUFFIX.replace(&without_brackets, "");
    WHITESPACE.replace_all(&without_suffix, " ").trim().to_string()
}

/// Raw and cleaned forms of one (artist, title) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedTerms {
    pub raw_artist: String,
    pub raw_title: String,
    pub artist: String,
    pub title: String,
}

impl CleanedTerms {
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            raw_artist: artist.to_string(),
            raw_title: title.to_string(),
            artist: clean(artist),
            title: clean(title),
        }
    }

    /// Whether cleaning altered either term
    pub fn changed(&self) -> bool {
        self.artist != self.raw_artist.trim() || self.title != self.raw_title.trim()
    }

    /// Artist text to validate candidates against
    ///
    /// Falls back to the raw term when cleaning removed everything.
    pub fn reference_artist(&self) -> &str {
        if self.artist.is_empty() {
            &self.raw_artist
        } else {
            &self.artist
        }
    }

    /// Title text to validate candidates against
    pub fn reference_title(&self) -> &str {
        if self.title.is_empty() {
            &self.raw_title
        } else {
            &self.title
        }
    }
}
