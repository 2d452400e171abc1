//! Release detection core: domain types and the run orchestration service.

pub mod service;
pub mod types;

pub use service::{DetectError, DetectionReport, DetectionService};
pub use types::{Channel, ClassificationStage, ClassifiedRelease, Release, VersionLabel};
