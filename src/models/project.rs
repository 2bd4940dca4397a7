//! Project, subproject and rule data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::{normalize_prefix, TokenCentroid};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Domain,
    Host,
    PathPrefix,
    KeywordInclude,
    KeywordExclude,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Domain => "domain",
            RuleKind::Host => "host",
            RuleKind::PathPrefix => "pathPrefix",
            RuleKind::KeywordInclude => "keywordInclude",
            RuleKind::KeywordExclude => "keywordExclude",
        }
    }
}

/// Deterministic matcher attached to a project or subproject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRule {
    pub kind: RuleKind,
    pub value: String,
    pub weight: f64,
}

impl ProjectRule {
    pub fn new(kind: RuleKind, value: impl Into<String>, weight: f64) -> Self {
        let value = value.into();
        let value = match kind {
            RuleKind::PathPrefix => normalize_prefix(&value),
            _ => value.trim().to_lowercase(),
        };
        Self { kind, value, weight }
    }

    pub fn host(value: impl Into<String>) -> Self {
        Self::new(RuleKind::Host, value, 1.0)
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.kind == RuleKind::Host && self.value == host
    }

    pub fn matches_domain(&self, domain: &str) -> bool {
        self.kind == RuleKind::Domain && self.value == domain
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubprojectSignature {
    pub host: String,
    pub path_prefix: String,
    pub centroid: TokenCentroid,
}

impl SubprojectSignature {
    /// `host:pathPrefix`, compared against a tab's depth-2 key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.path_prefix)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subproject {
    pub id: String,
    pub name: String,
    pub signature: SubprojectSignature,
    pub rules: Vec<ProjectRule>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    pub pinned: bool,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub activity_score: f64,
    pub centroid: TokenCentroid,
    pub rules: Vec<ProjectRule>,
    pub subprojects: Vec<Subproject>,
}

impl Project {
    pub fn subproject(&self, id: &str) -> Option<&Subproject> {
        self.subprojects.iter().find(|sub| sub.id == id)
    }

    pub fn subproject_mut(&mut self, id: &str) -> Option<&mut Subproject> {
        self.subprojects.iter_mut().find(|sub| sub.id == id)
    }

    pub fn rules_of(&self, kind: RuleKind) -> impl Iterator<Item = &ProjectRule> {
        self.rules.iter().filter(move |rule| rule.kind == kind)
    }

    pub fn has_subproject_host(&self, host: &str) -> bool {
        self.subprojects.iter().any(|sub| sub.signature.host == host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_values_are_normalized_by_kind() {
        let host = ProjectRule::new(RuleKind::Host, " GitHub.com ", 1.0);
        assert_eq!(host.value, "github.com");
        assert!(host.matches_host("github.com"));
        assert!(!host.matches_domain("github.com"));

        let prefix = ProjectRule::new(RuleKind::PathPrefix, "/org/repo/", 1.0);
        assert_eq!(prefix.value, "org/repo");
    }

    #[test]
    fn rules_serialize_with_camel_case_kind() {
        let rule = ProjectRule::new(RuleKind::KeywordExclude, "recipes", 0.5);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "keywordExclude");
        assert_eq!(rule.kind.as_str(), "keywordExclude");
    }
}
