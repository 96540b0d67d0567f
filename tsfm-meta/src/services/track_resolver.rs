//! Multi-strategy track resolution
//!
//! Turns a noisy (artist, title) pair from the now-playing feed into the best
//! catalog match, or `None`.
//!
//! **Strategy order** (first accepted candidate wins, later strategies never run):
//! 1. `artist:"<artist>" track:"<title>"` (limit 1)
//! 2. `artist:<artist> track:<title>` (limit 1)
//! 3. `<artist> <title>` (limit 5)
//! 4. Raw uncleaned terms, unqualified (limit 5), only when cleaning changed something
//! 5. `track:"<title>"` (limit 5), ignores the artist entirely
//!
//! Strategies 1-3 and 5 use cleaned terms. Each strategy yields an explicit
//! `StrategyOutcome`; only `Failed` stops the sequence early.
//!
//! **Failure policy:** credential problems (missing configuration, issuer
//! rejection, catalog 401) recur identically for every remaining strategy,
//! so they end the resolution with an error. Timeouts, transport errors,
//! rate limiting and unparseable responses mean "this strategy found
//! nothing" and the next strategy runs.

use std::sync::Arc;
use thiserror::Error;

use crate::models::{CatalogTrack, TrackMetadata};
use crate::services::catalog_client::{CatalogError, CatalogSearch};
use crate::services::match_validator::MatchValidator;
use crate::services::term_cleaner::CleanedTerms;
use crate::services::token_authority::{AuthError, TokenAuthority};

/// Resolution errors surfaced to callers
///
/// "No match" is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Credentials missing; an operator must fix configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Issuer rejected the credentials or the catalog rejected the token
    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl From<AuthError> for ResolveError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured => ResolveError::Configuration(err.to_string()),
            other => ResolveError::Authentication(other.to_string()),
        }
    }
}

/// One query-construction approach in the fallback sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StrictQualified,
    UnquotedQualified,
    General,
    OriginalTerms,
    TitleOnly,
}

impl Strategy {
    /// Fixed execution order
    pub const ORDER: [Strategy; 5] = [
        Strategy::StrictQualified,
        Strategy::UnquotedQualified,
        Strategy::General,
        Strategy::OriginalTerms,
        Strategy::TitleOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::StrictQualified => "strict_qualified",
            Strategy::UnquotedQualified => "unquoted_qualified",
            Strategy::General => "general",
            Strategy::OriginalTerms => "original_terms",
            Strategy::TitleOnly => "title_only",
        }
    }

    /// Result limit requested from the catalog
    pub fn limit(&self) -> u8 {
        match self {
            Strategy::StrictQualified | Strategy::UnquotedQualified => 1,
            Strategy::General | Strategy::OriginalTerms | Strategy::TitleOnly => 5,
        }
    }

    /// Build this strategy's query, or `None` when it should be skipped
    ///
    /// Skipped when a cleaned term it embeds is empty, and (for
    /// `OriginalTerms`) when cleaning left both terms unchanged.
    pub fn build_query(&self, terms: &CleanedTerms) -> Option<SearchQuery> {
        let artist = terms.artist.as_str();
        let title = terms.title.as_str();
        let both_present = !artist.is_empty() && !title.is_empty();

        let text = match self {
            Strategy::StrictQualified if both_present => format!(
                "artist:\"{}\" track:\"{}\"",
                strip_quotes(artist),
                strip_quotes(title)
            ),
            Strategy::UnquotedQualified if both_present => {
                format!("artist:{} track:{}", artist, title)
            }
            Strategy::General if both_present => format!("{} {}", artist, title),
            Strategy::OriginalTerms if terms.changed() => {
                format!("{} {}", terms.raw_artist.trim(), terms.raw_title.trim())
            }
            Strategy::TitleOnly if !title.is_empty() => {
                format!("track:\"{}\"", strip_quotes(title))
            }
            _ => return None,
        };

        Some(SearchQuery {
            text,
            limit: self.limit(),
        })
    }
}

fn strip_quotes(term: &str) -> String {
    term.replace('"', "")
}

/// Catalog query text plus its result limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub limit: u8,
}

/// Result of running one strategy
#[derive(Debug)]
pub enum StrategyOutcome {
    /// A candidate passed validation
    Matched(CatalogTrack),
    /// Nothing acceptable (empty result, rejected candidates, or a transient failure)
    NoCandidate,
    /// A failure that would recur for every remaining strategy
    Failed(ResolveError),
}

/// Track resolver
///
/// Holds no per-call state; safe to share across concurrent requests.
pub struct TrackResolver {
    catalog: Arc<dyn CatalogSearch>,
    tokens: Arc<TokenAuthority>,
    validator: MatchValidator,
}

impl TrackResolver {
    pub fn new(catalog: Arc<dyn CatalogSearch>, tokens: Arc<TokenAuthority>) -> Self {
        Self {
            catalog,
            tokens,
            validator: MatchValidator::new(),
        }
    }

    /// Whether catalog credentials are configured at all
    pub fn is_configured(&self) -> bool {
        self.tokens.is_configured()
    }

    /// Resolve an (artist, title) pair to normalized metadata
    ///
    /// Empty or whitespace-only input returns `Ok(None)` without any network call.
    pub async fn resolve(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<TrackMetadata>, ResolveError> {
        if artist.trim().is_empty() || title.trim().is_empty() {
            tracing::warn!("Artist or title is missing");
            return Ok(None);
        }

        let terms = CleanedTerms::new(artist, title);
        tracing::debug!(
            artist = %terms.raw_artist,
            title = %terms.raw_title,
            clean_artist = %terms.artist,
            clean_title = %terms.title,
            "Resolving track"
        );

        for strategy in Strategy::ORDER {
            let Some(query) = strategy.build_query(&terms) else {
                tracing::debug!(strategy = strategy.name(), "Strategy skipped");
                continue;
            };

            match self.attempt(strategy, &query, &terms).await {
                StrategyOutcome::Matched(track) => {
                    tracing::info!(
                        strategy = strategy.name(),
                        artist = %artist,
                        title = %title,
                        matched_title = %track.title,
                        matched_artist = %track.joined_artists(),
                        "Found Spotify match"
                    );
                    return Ok(Some(TrackMetadata::from(track)));
                }
                StrategyOutcome::NoCandidate => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        query = %query.text,
                        "No acceptable candidate"
                    );
                }
                StrategyOutcome::Failed(err) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %err,
                        "Aborting resolution, failure would repeat for remaining strategies"
                    );
                    return Err(err);
                }
            }
        }

        tracing::info!(artist = %artist, title = %title, "No Spotify results found");
        Ok(None)
    }

    /// Run a single strategy: fetch token, search, validate candidates in order
    async fn attempt(
        &self,
        strategy: Strategy,
        query: &SearchQuery,
        terms: &CleanedTerms,
    ) -> StrategyOutcome {
        let token = match self.tokens.get_token().await {
            Ok(token) => token,
            Err(e) => return StrategyOutcome::Failed(e.into()),
        };

        tracing::debug!(
            strategy = strategy.name(),
            query = %query.text,
            limit = query.limit,
            "Trying strategy"
        );

        let candidates = match self.catalog.search_tracks(&query.text, query.limit, &token).await {
            Ok(candidates) => candidates,
            Err(CatalogError::Unauthorized) => {
                self.tokens.invalidate_if(&token).await;
                return StrategyOutcome::Failed(ResolveError::Authentication(
                    CatalogError::Unauthorized.to_string(),
                ));
            }
            Err(e) => {
                tracing::warn!(strategy = strategy.name(), error = %e, "Error searching Spotify");
                return StrategyOutcome::NoCandidate;
            }
        };

        candidates
            .into_iter()
            .take(query.limit as usize)
            .find(|candidate| {
                self.validator
                    .validate(candidate, terms.reference_artist(), terms.reference_title())
            })
            .map_or(StrategyOutcome::NoCandidate, StrategyOutcome::Matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_for_noisy_input() {
        let terms = CleanedTerms::new("Daft Punk", "Get Lucky (feat. Pharrell Williams)");
        let queries: Vec<Option<String>> = Strategy::ORDER
            .iter()
            .map(|s| s.build_query(&terms).map(|q| q.text))
            .collect();

        assert_eq!(
            queries,
            vec![
                Some("artist:\"Daft Punk\" track:\"Get Lucky\"".to_string()),
                Some("artist:Daft Punk track:Get Lucky".to_string()),
                Some("Daft Punk Get Lucky".to_string()),
                Some("Daft Punk Get Lucky (feat. Pharrell Williams)".to_string()),
                Some("track:\"Get Lucky\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_original_terms_skipped_when_clean() {
        let terms = CleanedTerms::new("Chance the Rapper", "Blessings");
        assert!(Strategy::OriginalTerms.build_query(&terms).is_none());
        assert!(Strategy::General.build_query(&terms).is_some());
    }

    #[test]
    fn test_limits() {
        let limits: Vec<u8> = Strategy::ORDER.iter().map(|s| s.limit()).collect();
        assert_eq!(limits, vec![1, 1, 5, 5, 5]);
    }

    #[test]
    fn test_empty_cleaned_title_skips_title_strategies() {
        let terms = CleanedTerms::new("Daft Punk", "(Intro)");
        assert!(Strategy::StrictQualified.build_query(&terms).is_none());
        assert!(Strategy::TitleOnly.build_query(&terms).is_none());
        assert_eq!(
            Strategy::OriginalTerms.build_query(&terms).map(|q| q.text),
            Some("Daft Punk (Intro)".to_string())
        );
    }

    #[test]
    fn test_embedded_quotes_stripped_from_qualified_query() {
        let terms = CleanedTerms::new("Band", "Say \"Hi\"");
        let query = Strategy::StrictQualified.build_query(&terms).unwrap();
        assert_eq!(query.text, "artist:\"Band\" track:\"Say Hi\"");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ResolveError::from(AuthError::NotConfigured),
            ResolveError::Configuration(_)
        ));
        assert!(matches!(
            ResolveError::from(AuthError::Rejected(401, String::new())),
            ResolveError::Authentication(_)
        ));
    }
}
