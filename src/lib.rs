//! isowatch - Windows 11 release detection and build-matrix generation
//!
//! This library polls a release index for Windows 11 builds, classifies
//! each previously unseen build into a canonical version label, records it
//! in a persistent deduplicating ledger, and expands the newcomers into a
//! deterministic cartesian build matrix for downstream CI pipelines.
//!
//! # Core Concepts
//!
//! - **Classification**: a staged heuristic mapping noisy release titles
//!   and build numbers to version labels (`24H2`, `Insider-28xxx`, ...),
//!   evaluated in strict priority order
//! - **Ledger**: the persistent record of every build ever detected, used
//!   to deduplicate runs; loaded once, mutated in memory, persisted
//!   atomically
//! - **Matrix**: the ordered build-job expansion over build type and
//!   edition consumed by the CI trigger layer
//!
//! # Example Usage
//!
//! ```ignore
//! use isowatch::{DetectionService, LedgerStore, UupDumpFetcher, WatchConfig};
//! use chrono::Utc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WatchConfig::default();
//! let fetcher = UupDumpFetcher::new(
//!     config.index_endpoint.clone(),
//!     Duration::from_secs(config.request_timeout_secs),
//! )?;
//! let service = DetectionService::new(&config, fetcher)?;
//!
//! let store = LedgerStore::new(&config.tracking_file);
//! let mut state = store.load()?;
//! let report = service.run(&mut state, Utc::now()).await?;
//! store.persist(&state)?;
//!
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`classify`]: staged version classifier and its range table
//! - [`detection`]: domain types and the run orchestration service
//! - [`fetch`]: release index access
//! - [`ledger`]: persistent deduplicating ledger
//! - [`matrix`]: cartesian build-matrix expansion

// Public modules
pub mod classify;
pub mod cli;
pub mod config;
pub mod detection;
pub mod fetch;
pub mod issue;
pub mod ledger;
pub mod matrix;

// Re-export key types for convenient access
pub use config::{ConfigError, WatchConfig};
pub use detection::service::{DetectError, DetectionReport, DetectionService};
pub use detection::types::{
    Channel, ClassificationStage, ClassifiedRelease, Release, VersionLabel,
};
pub use fetch::{FetchError, ReleaseFetcher, UupDumpFetcher};
pub use issue::IssueContent;
pub use ledger::{LedgerEntry, LedgerError, LedgerState, LedgerStore};
pub use matrix::{BuildJobDescriptor, BuildType, MatrixGenerator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
