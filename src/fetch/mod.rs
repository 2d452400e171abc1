//! Release index access.
//!
//! The detection core only depends on the [`ReleaseFetcher`] trait; the
//! UUP Dump implementation lives in [`uupdump`]. Tests swap in an
//! in-memory fetcher.

pub mod uupdump;

pub use uupdump::UupDumpFetcher;

use crate::detection::types::Release;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the upstream release index. An empty candidate list is a
/// valid outcome, never an error.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, or timeout failure before a response arrived.
    #[error("release index request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The index answered with a non-success status.
    #[error("release index returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The index answered 200 but the body did not have the expected shape.
    #[error("malformed release index response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Transport and status failures are worth one retry; a malformed body
    /// will not fix itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

/// Source of candidate releases, already filtered to the architectures and
/// channels in scope.
#[async_trait]
pub trait ReleaseFetcher: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<Release>, FetchError>;
}
