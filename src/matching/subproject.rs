use crate::matching::config::MatcherConfig;
use crate::models::{Project, Subproject, Tab};

const HOST_SHARE: f64 = 0.5;
const PATH_SHARE: f64 = 0.3;
const CENTROID_SHARE: f64 = 0.2;

/// Exact-match key for a tab: `host:<first N path segments>`.
pub fn subproject_key(tab: &Tab, config: &MatcherConfig) -> String {
    format!(
        "{}:{}",
        tab.host(),
        tab.url.path_prefix(config.subproject_key_depth)
    )
}

fn affinity(tab: &Tab, path: &str, tab_tokens: &[String], sub: &Subproject) -> f64 {
    let host = if sub.signature.host == tab.host() { 1.0 } else { 0.0 };
    let prefix = if path.starts_with(sub.signature.path_prefix.as_str()) {
        1.0
    } else {
        0.0
    };
    HOST_SHARE * host
        + PATH_SHARE * prefix
        + CENTROID_SHARE * sub.signature.centroid.weighted_similarity(tab_tokens)
}

/// Picks the subproject a tab belongs to within `project`, if any.
pub fn resolve_subproject(
    tab: &Tab,
    tab_tokens: &[String],
    project: &Project,
    config: &MatcherConfig,
) -> Option<String> {
    let key = subproject_key(tab, config);
    if let Some(exact) = project
        .subprojects
        .iter()
        .find(|sub| sub.signature.key() == key)
    {
        return Some(exact.id.clone());
    }

    let path = tab.url.joined_path();
    let mut best: Option<(&Subproject, f64)> = None;
    for sub in &project.subprojects {
        let score = affinity(tab, &path, tab_tokens, sub);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((sub, score));
        }
    }

    best.filter(|(_, score)| *score > config.subproject_min_score)
        .map(|(sub, _)| sub.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::{project, subproject, tab_at};
    use chrono::Utc;

    #[test]
    fn exact_key_match_wins() {
        let now = Utc::now();
        let mut p = project("p", now);
        let mut other = subproject("github.com", "org");
        other.id = "broad".into();
        let mut exact = subproject("github.com", "org/repo");
        exact.id = "exact".into();
        p.subprojects = vec![other, exact];

        let tab = tab_at("https://github.com/org/repo/pulls", now);
        let config = MatcherConfig::default();
        assert_eq!(subproject_key(&tab, &config), "github.com:org/repo");
        assert_eq!(resolve_subproject(&tab, &tab.features(), &p, &config).as_deref(), Some("exact"));
    }

    #[test]
    fn falls_back_to_best_affinity_above_threshold() {
        let now = Utc::now();
        let mut p = project("p", now);
        let mut same_host = subproject("github.com", "other/thing");
        same_host.id = "host".into();
        let mut foreign = subproject("gitlab.com", "org");
        foreign.id = "foreign".into();
        p.subprojects = vec![foreign, same_host];

        let tab = tab_at("https://github.com/org/repo", now);
        let config = MatcherConfig::default();
        // host: 0.5 vs prefix only: 0.3 (not above threshold)
        assert_eq!(resolve_subproject(&tab, &tab.features(), &p, &config).as_deref(), Some("host"));
    }

    #[test]
    fn weak_affinity_selects_nothing() {
        let now = Utc::now();
        let mut p = project("p", now);
        p.subprojects = vec![subproject("gitlab.com", "org")];

        let tab = tab_at("https://github.com/org/repo", now);
        assert_eq!(
            resolve_subproject(&tab, &tab.features(), &p, &MatcherConfig::default()),
            None
        );
    }
}
