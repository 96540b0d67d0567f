//! Business logic services for tsfm-meta

pub mod catalog_client;
pub mod match_validator;
pub mod now_playing;
pub mod term_cleaner;
pub mod token_authority;
pub mod track_resolver;

pub use catalog_client::{CatalogError, CatalogSearch, HttpCatalogClient};
pub use match_validator::{MatchAssessment, MatchValidator};
pub use now_playing::parse_song_string;
pub use term_cleaner::{clean, CleanedTerms};
pub use token_authority::{
    AuthError, Credential, CredentialIssuer, HttpCredentialIssuer, IssuedToken, TokenAuthority,
};
pub use track_resolver::{ResolveError, Strategy, StrategyOutcome, TrackResolver};
