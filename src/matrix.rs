//! Cartesian build-matrix expansion.
//!
//! Newly detected releases fan out into one job descriptor per
//! build type x edition pair, in a fixed order so the emitted matrix is
//! deterministic for the downstream CI trigger layer.

use crate::config::ConfigError;
use crate::detection::types::ClassifiedRelease;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image trim level, each produced by a distinct downstream pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Standard,
    Core,
    Nano,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Standard => "standard",
            BuildType::Core => "core",
            BuildType::Nano => "nano",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(BuildType::Standard),
            "core" => Ok(BuildType::Core),
            "nano" => Ok(BuildType::Nano),
            _ => Err(ConfigError::UnknownBuildType(raw.to_string())),
        }
    }
}

/// SKU code to marketing name. Codes outside this table are a
/// configuration error surfaced at startup.
pub const EDITION_NAMES: &[(u8, &str)] = &[
    (1, "Home"),
    (4, "Education"),
    (6, "Pro"),
    (7, "Pro N"),
];

pub fn edition_name(code: u8) -> Option<&'static str> {
    EDITION_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// One CI build job. `title` doubles as the job display name and an
/// idempotency hint downstream; it is not globally unique across channels
/// sharing a version/build pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildJobDescriptor {
    pub version: String,
    pub build_number: String,
    pub iso_url: String,
    pub build_type: BuildType,
    pub edition: u8,
    pub edition_name: String,
    pub title: String,
}

/// Expands classified releases into the job matrix. Edition and build-type
/// codes are resolved once at construction so an unknown code fails the
/// run before any fetch happens.
#[derive(Debug)]
pub struct MatrixGenerator {
    build_types: Vec<BuildType>,
    editions: Vec<(u8, &'static str)>,
}

impl MatrixGenerator {
    pub fn new(build_types: &[String], editions: &[u8]) -> Result<Self, ConfigError> {
        let build_types = build_types
            .iter()
            .map(|raw| raw.parse())
            .collect::<Result<Vec<_>, _>>()?;

        let editions = editions
            .iter()
            .map(|&code| {
                edition_name(code)
                    .map(|name| (code, name))
                    .ok_or(ConfigError::UnknownEdition(code))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            build_types,
            editions,
        })
    }

    /// Emit descriptors for each release in input order, crossed with the
    /// configured build types and editions. Releases the classifier could
    /// not place are left out entirely.
    pub fn generate(&self, releases: &[ClassifiedRelease]) -> Vec<BuildJobDescriptor> {
        let mut jobs = Vec::new();
        for classified in releases {
            if !classified.version.is_known() {
                continue;
            }
            for &build_type in &self.build_types {
                for &(edition, edition_name) in &self.editions {
                    jobs.push(BuildJobDescriptor {
                        version: classified.version.to_string(),
                        build_number: classified.release.build_number.clone(),
                        iso_url: classified.release.iso_url.clone(),
                        build_type,
                        edition,
                        edition_name: edition_name.to_string(),
                        title: job_title(classified, build_type, edition_name),
                    });
                }
            }
        }
        jobs
    }
}

fn job_title(
    classified: &ClassifiedRelease,
    build_type: BuildType,
    edition_name: &str,
) -> String {
    format!(
        "{}-{}-{}-{}",
        classified.version, classified.release.build_number, build_type, edition_name
    )
    .replace(' ', "_")
}
