//! Heuristic version classification.
//!
//! Maps a noisy release title plus its dotted build number to a canonical
//! version label. Stages are an ordered list of pure matchers evaluated in
//! strict priority order; the first hit wins. The function is total: when
//! no stage matches it returns [`VersionLabel::Unknown`] rather than
//! failing, so an odd upstream title can never abort a run.

pub mod ranges;

use crate::detection::types::{ClassificationStage, VersionLabel};
use regex::Regex;
use tracing::trace;

type Matcher = fn(&str, &str) -> Option<VersionLabel>;

const STAGES: &[(ClassificationStage, Matcher)] = &[
    (ClassificationStage::ExplicitVersion, explicit_version),
    (ClassificationStage::StandaloneMarker, standalone_marker),
    (ClassificationStage::BuildRange, build_range),
    (ClassificationStage::InsiderFallback, insider_fallback),
];

/// Classify a release title and build number into a version label.
pub fn classify(title: &str, build_number: &str) -> (VersionLabel, ClassificationStage) {
    for (stage, matcher) in STAGES {
        if let Some(label) = matcher(title, build_number) {
            trace!(%stage, %label, "classifier stage matched");
            return (label, *stage);
        }
    }
    (VersionLabel::Unknown, ClassificationStage::Unclassified)
}

/// Stage 1: `version 24H2` spelled out in the title.
fn explicit_version(title: &str, _build_number: &str) -> Option<VersionLabel> {
    let re = Regex::new(r"(?i)version\s+(\d{2}h\d)").expect("valid regex");
    re.captures(title)
        .map(|caps| VersionLabel::Retail(caps[1].to_ascii_uppercase()))
}

/// Stage 2: a bare `\d\dH\d` token without the `version` prefix, which some
/// upstream titles use.
fn standalone_marker(title: &str, _build_number: &str) -> Option<VersionLabel> {
    let re = Regex::new(r"(?i)\b(\d{2}h\d)\b").expect("valid regex");
    re.captures(title)
        .map(|caps| VersionLabel::Retail(caps[1].to_ascii_uppercase()))
}

/// Stage 3: map the major build component through the range table.
fn build_range(_title: &str, build_number: &str) -> Option<VersionLabel> {
    ranges::lookup(parse_major(build_number)?)
}

/// Stage 4: no range matched (or the number does not parse) but the title
/// marks an insider/preview build.
fn insider_fallback(title: &str, build_number: &str) -> Option<VersionLabel> {
    let lower = title.to_ascii_lowercase();
    if !lower.contains("insider") && !lower.contains("preview") {
        return None;
    }
    let major = build_number.split('.').next().unwrap_or("").trim();
    if major.is_empty() {
        return None;
    }
    Some(VersionLabel::Insider(major.to_string()))
}

fn parse_major(build_number: &str) -> Option<u32> {
    build_number.split('.').next()?.trim().parse().ok()
}
