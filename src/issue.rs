//! Release announcement issue content.
//!
//! One issue per newly detected release, not per matrix job. Rendering
//! only; the issue-creation collaborator consumes these records through
//! the json/actions outputs.

use crate::detection::types::ClassifiedRelease;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueContent {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

impl IssueContent {
    pub fn for_release(classified: &ClassifiedRelease, detected: DateTime<Utc>) -> Self {
        let release = &classified.release;

        let body = format!(
            "## New Windows Release Detected\n\
             \n\
             **Build Information:**\n\
             - **Title:** {title}\n\
             - **Build Number:** {build}\n\
             - **Version:** {version}\n\
             - **Architecture:** {arch}\n\
             - **Channel:** {channel}\n\
             - **Detection Date:** {detected}\n\
             \n\
             **ISO Source:**\n\
             - {iso_url}\n\
             \n\
             **Automated Actions:**\n\
             - [ ] Trigger standard build\n\
             - [ ] Trigger core build\n\
             - [ ] Trigger nano build\n\
             - [ ] Test builds in VM\n\
             - [ ] Publish artifacts\n\
             - [ ] Update documentation\n",
            title = release.title,
            build = release.build_number,
            version = classified.version,
            arch = release.architecture,
            channel = release.channel,
            detected = detected.to_rfc3339(),
            iso_url = release.iso_url,
        );

        Self {
            title: format!(
                "New Windows {} Release - Build {}",
                classified.version, release.build_number
            ),
            body,
            labels: vec![
                "automated".to_string(),
                "new-release".to_string(),
                "build-pending".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{Channel, ClassificationStage, Release, VersionLabel};
    use chrono::TimeZone;

    #[test]
    fn test_issue_content_carries_release_metadata() {
        let classified = ClassifiedRelease {
            release: Release {
                build_id: "abc".to_string(),
                build_number: "26100.7462".to_string(),
                title: "Windows 11, version 24H2 (26100.7462)".to_string(),
                architecture: "amd64".to_string(),
                channel: Channel::Retail,
                iso_url: "https://example.invalid/download?id=abc".to_string(),
            },
            version: VersionLabel::Retail("24H2".to_string()),
            stage: ClassificationStage::ExplicitVersion,
        };
        let detected = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let issue = IssueContent::for_release(&classified, detected);

        assert_eq!(issue.title, "New Windows 24H2 Release - Build 26100.7462");
        assert!(issue.body.contains("26100.7462"));
        assert!(issue.body.contains("https://example.invalid/download?id=abc"));
        assert!(issue.body.contains("retail"));
        assert_eq!(issue.labels, vec!["automated", "new-release", "build-pending"]);
    }
}
