//! Domain types shared across the detection pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution channel of an upstream build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Retail,
    Insider,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Retail => write!(f, "retail"),
            Channel::Insider => write!(f, "insider"),
        }
    }
}

/// A single build artifact as reported by the upstream release index.
///
/// `build_id` is the identity key: two `Release` values with the same
/// `build_id` describe the same build even if the other fields differ
/// (the index occasionally rewrites titles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub build_id: String,
    /// Dotted numeric string, e.g. `26100.7462`. The component before the
    /// first dot drives version inference.
    pub build_number: String,
    pub title: String,
    pub architecture: String,
    pub channel: Channel,
    pub iso_url: String,
}

/// Canonical version label produced by the classifier.
///
/// Serialized as its display string (`24H2`, `Insider-28xxx`, `Unknown`) so
/// the ledger file round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum VersionLabel {
    /// Marketing-era code such as `24H2`.
    Retail(String),
    /// Insider bucket (`28xxx`) or major build (`27548`).
    Insider(String),
    Unknown,
}

impl VersionLabel {
    pub fn is_known(&self) -> bool {
        !matches!(self, VersionLabel::Unknown)
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionLabel::Retail(code) => write!(f, "{}", code),
            VersionLabel::Insider(bucket) => write!(f, "Insider-{}", bucket),
            VersionLabel::Unknown => write!(f, "Unknown"),
        }
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> Self {
        label.to_string()
    }
}

impl From<String> for VersionLabel {
    fn from(raw: String) -> Self {
        if raw == "Unknown" {
            VersionLabel::Unknown
        } else if let Some(bucket) = raw.strip_prefix("Insider-") {
            VersionLabel::Insider(bucket.to_string())
        } else {
            VersionLabel::Retail(raw)
        }
    }
}

/// Which classifier stage produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationStage {
    #[serde(rename = "explicit")]
    ExplicitVersion,
    #[serde(rename = "standalone")]
    StandaloneMarker,
    #[serde(rename = "numeric-range")]
    BuildRange,
    #[serde(rename = "insider-fallback")]
    InsiderFallback,
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl fmt::Display for ClassificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassificationStage::ExplicitVersion => "explicit",
            ClassificationStage::StandaloneMarker => "standalone",
            ClassificationStage::BuildRange => "numeric-range",
            ClassificationStage::InsiderFallback => "insider-fallback",
            ClassificationStage::Unclassified => "unclassified",
        };
        write!(f, "{}", name)
    }
}

/// A release together with its derived version label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRelease {
    #[serde(flatten)]
    pub release: Release,
    pub version: VersionLabel,
    pub stage: ClassificationStage,
}
