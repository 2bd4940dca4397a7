use chrono::{DateTime, Duration, Utc};

use crate::matching::config::MatcherConfig;
use crate::models::{Project, Tab};

/// Staged narrowing of the project universe before scoring.
///
/// Stops at the first stage that yields anything:
/// 1. host locality (subproject signature host or host rule)
/// 2. domain rule on the registrable domain
/// 3. recently active projects, newest first, capped
/// 4. the first N projects as supplied
pub fn narrow_candidates<'a>(
    tab: &Tab,
    projects: &'a [Project],
    config: &MatcherConfig,
    now: DateTime<Utc>,
) -> Vec<&'a Project> {
    let host = tab.host();

    let by_host: Vec<&Project> = projects
        .iter()
        .filter(|project| {
            project.has_subproject_host(host)
                || project.rules.iter().any(|rule| rule.matches_host(host))
        })
        .collect();
    if !by_host.is_empty() {
        return by_host;
    }

    let domain = tab.url.registrable_domain();
    let by_domain: Vec<&Project> = projects
        .iter()
        .filter(|project| project.rules.iter().any(|rule| rule.matches_domain(&domain)))
        .collect();
    if !by_domain.is_empty() {
        return by_domain;
    }

    let cutoff = now - Duration::minutes(config.recent_project_window_mins);
    let mut recent: Vec<&Project> = projects
        .iter()
        .filter(|project| project.last_active_at >= cutoff)
        .collect();
    if !recent.is_empty() {
        recent.sort_by(|a, b| b.last_active_at.cmp(&a.last_active_at));
        recent.truncate(config.recent_project_cap);
        return recent;
    }

    projects.iter().take(config.fallback_project_cap).collect()
}
