use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EngineError, Result};

/// A tab URL decomposed into the parts the matcher looks at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabUrl {
    pub raw: String,
    pub host: String,
    pub path_segments: Vec<String>,
    pub query_keys: BTreeSet<String>,
}

impl TabUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let parsed = Url::parse(trimmed)
            .map_err(|err| EngineError::invalid_input(format!("unparseable url '{trimmed}': {err}")))?;

        let host = parsed
            .host_str()
            .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .ok_or_else(|| EngineError::invalid_input(format!("url '{trimmed}' has no host")))?;

        let path_segments = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let query_keys = parsed
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .filter(|key| !key.is_empty())
            .collect();

        Ok(Self {
            raw: trimmed.to_string(),
            host,
            path_segments,
            query_keys,
        })
    }

    /// Path segments joined with `/`, without a leading slash.
    pub fn joined_path(&self) -> String {
        self.path_segments.join("/")
    }

    /// The first `depth` path segments joined with `/`.
    pub fn path_prefix(&self, depth: usize) -> String {
        self.path_segments
            .iter()
            .take(depth)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn registrable_domain(&self) -> String {
        registrable_domain(&self.host)
    }
}

/// Last two dot-separated labels of a host (`docs.github.com` -> `github.com`).
pub fn registrable_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|label| !label.is_empty()).collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }
    labels[labels.len() - 2..].join(".")
}

/// Normalizes a configured path prefix (`/org/repo/` -> `org/repo`).
pub fn normalize_prefix(prefix: &str) -> String {
    prefix
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Number of segments in a normalized prefix.
pub fn prefix_depth(prefix: &str) -> usize {
    prefix.split('/').filter(|segment| !segment.is_empty()).count()
}
