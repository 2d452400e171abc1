//! UUP Dump release index client.

use super::{FetchError, ReleaseFetcher};
use crate::detection::types::{Channel, Release};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const SEARCH_QUERY: &str = "Windows 11";
/// Newest index entries considered per run.
const CANDIDATE_LIMIT: usize = 30;
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ListIdResponse {
    response: Option<ListIdBody>,
}

#[derive(Debug, Deserialize)]
struct ListIdBody {
    #[serde(default)]
    builds: Vec<RawBuild>,
}

#[derive(Debug, Deserialize)]
struct RawBuild {
    uuid: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    build: String,
    #[serde(default)]
    arch: String,
}

/// Queries the UUP Dump `listid.php` endpoint and normalizes its entries
/// into [`Release`] values.
pub struct UupDumpFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl UupDumpFetcher {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    async fn query_index(&self) -> Result<Vec<Release>, FetchError> {
        debug!(endpoint = %self.endpoint, "querying release index");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("search", SEARCH_QUERY), ("sortByDate", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let payload: ListIdResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Malformed(err.to_string()))?;

        let body = payload
            .response
            .ok_or_else(|| FetchError::Malformed("missing 'response' object".to_string()))?;

        let releases: Vec<Release> = body
            .builds
            .into_iter()
            .take(CANDIDATE_LIMIT)
            .filter_map(normalize)
            .collect();

        debug!(count = releases.len(), "normalized candidate releases");
        Ok(releases)
    }
}

/// Map a raw index entry to a [`Release`], dropping entries without an id
/// and anything outside the x64 Windows 11 scope.
fn normalize(raw: RawBuild) -> Option<Release> {
    let build_id = raw.uuid?;

    if !matches!(raw.arch.as_str(), "amd64" | "x64") {
        return None;
    }
    if !raw.title.contains("Windows 11") {
        return None;
    }

    let channel = if raw.title.contains("Insider") {
        Channel::Insider
    } else {
        Channel::Retail
    };

    let iso_url = format!(
        "https://uupdump.net/download.php?id={}&pack=en-us&edition=professional",
        build_id
    );

    let build_number = if raw.build.is_empty() {
        "Unknown".to_string()
    } else {
        raw.build
    };

    Some(Release {
        build_id,
        build_number,
        title: raw.title,
        architecture: raw.arch,
        channel,
        iso_url,
    })
}

#[async_trait]
impl ReleaseFetcher for UupDumpFetcher {
    /// One retry with fixed backoff on transient failure, then propagate.
    async fn fetch_candidates(&self) -> Result<Vec<Release>, FetchError> {
        match self.query_index().await {
            Ok(releases) => Ok(releases),
            Err(err) if err.is_transient() => {
                warn!(error = %err, "release index query failed, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.query_index().await
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(uuid: Option<&str>, title: &str, build: &str, arch: &str) -> RawBuild {
        RawBuild {
            uuid: uuid.map(|s| s.to_string()),
            title: title.to_string(),
            build: build.to_string(),
            arch: arch.to_string(),
        }
    }

    #[test]
    fn test_normalize_retail_release() {
        let release = normalize(raw(
            Some("abc-123"),
            "Windows 11, version 24H2 (26100.7462)",
            "26100.7462",
            "amd64",
        ))
        .unwrap();

        assert_eq!(release.build_id, "abc-123");
        assert_eq!(release.build_number, "26100.7462");
        assert_eq!(release.channel, Channel::Retail);
        assert_eq!(
            release.iso_url,
            "https://uupdump.net/download.php?id=abc-123&pack=en-us&edition=professional"
        );
    }

    #[test]
    fn test_normalize_detects_insider_channel() {
        let release = normalize(raw(
            Some("abc"),
            "Windows 11 Insider Preview 28110.1000 (rs_prerelease)",
            "28110.1000",
            "amd64",
        ))
        .unwrap();
        assert_eq!(release.channel, Channel::Insider);
    }

    #[test]
    fn test_normalize_accepts_x64_alias() {
        assert!(normalize(raw(Some("abc"), "Windows 11", "26100.1", "x64")).is_some());
    }

    #[test]
    fn test_normalize_drops_out_of_scope_entries() {
        // Wrong architecture.
        assert!(normalize(raw(Some("a"), "Windows 11", "26100.1", "arm64")).is_none());
        // Not Windows 11.
        assert!(normalize(raw(Some("b"), "Windows 10 22H2", "19045.1", "amd64")).is_none());
        // No identity.
        assert!(normalize(raw(None, "Windows 11", "26100.1", "amd64")).is_none());
    }

    #[test]
    fn test_normalize_defaults_missing_build_number() {
        let release = normalize(raw(Some("abc"), "Windows 11", "", "amd64")).unwrap();
        assert_eq!(release.build_number, "Unknown");
    }

    #[test]
    fn test_response_shape_parses() {
        let payload: ListIdResponse = serde_json::from_str(
            r#"{
                "response": {
                    "builds": [
                        {
                            "uuid": "abc-123",
                            "title": "Windows 11, version 24H2 (26100.7462)",
                            "build": "26100.7462",
                            "arch": "amd64"
                        },
                        {
                            "title": "entry without uuid",
                            "arch": "amd64"
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        let builds = payload.response.unwrap().builds;
        assert_eq!(builds.len(), 2);
        assert_eq!(builds[0].uuid.as_deref(), Some("abc-123"));
        assert!(builds[1].uuid.is_none());
    }

    #[test]
    fn test_missing_response_object_is_detected() {
        let payload: ListIdResponse = serde_json::from_str("{}").unwrap();
        assert!(payload.response.is_none());
    }
}
