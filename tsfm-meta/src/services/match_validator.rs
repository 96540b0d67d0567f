//! Candidate match validator
//!
//! Decides whether a catalog candidate is the track the radio feed meant.
//!
//! **Policy:**
//! - Title token overlap is a hard gate: reject below 50%
//! - Artist token overlap is advisory: below 30% is logged, never rejected
//!
//! Overlap is |shared words| / |original words|, so extra words in the
//! catalog title ("Remastered 2011") never count against a candidate.

use std::collections::HashSet;

use crate::models::CatalogTrack;

/// Minimum title overlap for acceptance
pub const TITLE_OVERLAP_THRESHOLD: f64 = 0.5;

/// Artist overlap below which a low-confidence note is logged
pub const ARTIST_OVERLAP_THRESHOLD: f64 = 0.3;

const SEPARATORS: &[char] = &['&', ',', '-', '+', '(', ')', '[', ']', '\'', '"'];

/// Validation outcome for one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct MatchAssessment {
    /// `None` when either title token set was empty (check skipped)
    pub title_overlap: Option<f64>,
    /// `None` when either artist token set was empty
    pub artist_overlap: Option<f64>,
    pub accepted: bool,
    pub low_artist_confidence: bool,
}

/// Lowercase, turn separators into spaces, collapse whitespace
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word set of a normalized string
///
/// A standalone "x" is a collaboration marker ("A x B") and is dropped.
pub fn tokenize(text: &str) -> HashSet<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty() && *w != "x")
        .map(str::to_string)
        .collect()
}

/// |original ∩ candidate| / |original|, or `None` if either set is empty
pub fn token_overlap(original: &HashSet<String>, candidate: &HashSet<String>) -> Option<f64> {
    if original.is_empty() || candidate.is_empty() {
        return None;
    }
    let shared = original.intersection(candidate).count();
    Some(shared as f64 / original.len() as f64)
}

/// Match validator
pub struct MatchValidator {
    /// Title gate (default 0.5)
    title_threshold: f64,

    /// Artist advisory level (default 0.3)
    artist_threshold: f64,
}

impl MatchValidator {
    pub fn new() -> Self {
        Self {
            title_threshold: TITLE_OVERLAP_THRESHOLD,
            artist_threshold: ARTIST_OVERLAP_THRESHOLD,
        }
    }

    /// Assess a candidate against the original artist and title
    pub fn assess(
        &self,
        candidate: &CatalogTrack,
        original_artist: &str,
        original_title: &str,
    ) -> MatchAssessment {
        let title_overlap = token_overlap(&tokenize(original_title), &tokenize(&candidate.title));
        let artist_overlap = token_overlap(
            &tokenize(original_artist),
            &tokenize(&candidate.joined_artists()),
        );

        let accepted = match title_overlap {
            Some(overlap) => overlap >= self.title_threshold,
            None => true,
        };

        let low_artist_confidence = matches!(artist_overlap, Some(o) if o < self.artist_threshold);

        if accepted && low_artist_confidence {
            tracing::info!(
                original_artist = %original_artist,
                candidate_artist = %candidate.joined_artists(),
                artist_overlap = artist_overlap.unwrap_or_default(),
                "Low artist confidence, accepting on title match"
            );
        }

        if !accepted {
            tracing::debug!(
                original_title = %original_title,
                candidate_title = %candidate.title,
                title_overlap = title_overlap.unwrap_or_default(),
                "Candidate rejected on title overlap"
            );
        }

        MatchAssessment {
            title_overlap,
            artist_overlap,
            accepted,
            low_artist_confidence,
        }
    }

    pub fn validate(
        &self,
        candidate: &CatalogTrack,
        original_artist: &str,
        original_title: &str,
    ) -> bool {
        self.assess(candidate, original_artist, original_title).accepted
    }
}

impl Default for MatchValidator {
    fn default() -> Self {
        Self::new()
    }
}
