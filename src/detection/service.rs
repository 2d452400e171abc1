//! Detection run orchestration.
//!
//! `DetectionService` composes the leaf components into one run:
//! fetch candidates, classify each, drop the already-tracked ones, record
//! the rest in the ledger, expand the classified newcomers into the build
//! matrix, and close out the run's bookkeeping counters.
//!
//! The ledger state is passed in and mutated in place; loading it from and
//! persisting it back to disk stays with the caller, so a failed run never
//! touches the file and tests drive the service with plain fixtures.

use crate::classify;
use crate::config::{ConfigError, WatchConfig};
use crate::detection::types::ClassifiedRelease;
use crate::fetch::{FetchError, ReleaseFetcher};
use crate::ledger::LedgerState;
use crate::matrix::{BuildJobDescriptor, MatrixGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a detection run.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Outcome of one detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// True when at least one previously unseen build was recorded, even
    /// if the classifier could not place it (the matrix may still be
    /// empty then).
    pub has_new: bool,
    /// Newly detected releases in fetch order. This, not the matrix, is
    /// what issue-creation tooling consumes: one entry per release.
    pub new_releases: Vec<ClassifiedRelease>,
    /// Expanded build matrix over the classified newcomers.
    pub matrix: Vec<BuildJobDescriptor>,
    /// Candidates skipped because their `build_id` was already tracked.
    pub already_tracked: usize,
    pub checked_at: DateTime<Utc>,
}

impl DetectionReport {
    /// One-paragraph human summary for logs and the human output format.
    pub fn summary(&self) -> String {
        if !self.has_new {
            return format!(
                "No new releases detected ({} candidate(s) already tracked).",
                self.already_tracked
            );
        }
        let classified = self
            .new_releases
            .iter()
            .filter(|r| r.version.is_known())
            .count();
        format!(
            "Found {} new release(s) ({} classified, {} already tracked); emitted {} build job(s).",
            self.new_releases.len(),
            classified,
            self.already_tracked,
            self.matrix.len()
        )
    }
}

impl fmt::Display for DetectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for release in &self.new_releases {
            writeln!(
                f,
                "  - {} (build {}) -> {} [{}]",
                release.release.title,
                release.release.build_number,
                release.version,
                release.stage
            )?;
        }
        Ok(())
    }
}

/// Orchestrates one fetch-classify-record-expand cycle per invocation.
pub struct DetectionService<F> {
    fetcher: F,
    generator: MatrixGenerator,
}

impl<F: ReleaseFetcher> DetectionService<F> {
    pub fn new(config: &WatchConfig, fetcher: F) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = MatrixGenerator::new(&config.build_types, &config.editions)?;
        Ok(Self { fetcher, generator })
    }

    /// Run detection once, to completion. `state` is only mutated after
    /// the fetch succeeded; a [`FetchError`] therefore leaves it exactly
    /// as passed in.
    pub async fn run(
        &self,
        state: &mut LedgerState,
        now: DateTime<Utc>,
    ) -> Result<DetectionReport, DetectError> {
        let candidates = self.fetcher.fetch_candidates().await?;
        info!(count = candidates.len(), "fetched release candidates");

        let mut new_releases = Vec::new();
        let mut already_tracked = 0usize;

        for release in candidates {
            if state.contains(&release.build_id) {
                debug!(build_id = %release.build_id, "already tracked, skipping");
                already_tracked += 1;
                continue;
            }

            let (version, stage) = classify::classify(&release.title, &release.build_number);
            info!(
                build_id = %release.build_id,
                version = %version,
                %stage,
                title = %release.title,
                "new release detected"
            );

            state.record(&release, &version, now);
            new_releases.push(ClassifiedRelease {
                release,
                version,
                stage,
            });
        }

        let matrix = self.generator.generate(&new_releases);
        state.finalize(now);

        info!(
            new = new_releases.len(),
            already_tracked,
            jobs = matrix.len(),
            check_count = state.check_count,
            "detection run complete"
        );

        Ok(DetectionReport {
            has_new: !new_releases.is_empty(),
            new_releases,
            matrix,
            already_tracked,
            checked_at: now,
        })
    }
}
