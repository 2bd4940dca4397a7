pub mod candidates;
pub mod config;
pub mod scoring;
pub mod subproject;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

pub use candidates::narrow_candidates;
pub use config::MatcherConfig;
pub use subproject::resolve_subproject;

use crate::models::{ActiveContext, Project, ScoringResult, Tab};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Scores tabs against projects. Holds only configuration; every call
/// sees the project snapshot and context it is handed.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn narrow<'a>(&self, tab: &Tab, projects: &'a [Project], now: DateTime<Utc>) -> Vec<&'a Project> {
        narrow_candidates(tab, projects, &self.config, now)
    }

    pub fn score_tab_for_project(
        &self,
        tab: &Tab,
        project: &Project,
        context: Option<&ActiveContext>,
        now: DateTime<Utc>,
    ) -> ScoringResult {
        self.score_with_tokens(tab, &tab.features(), project, context, now)
    }

    fn score_with_tokens(
        &self,
        tab: &Tab,
        tab_tokens: &[String],
        project: &Project,
        context: Option<&ActiveContext>,
        now: DateTime<Utc>,
    ) -> ScoringResult {
        let breakdown =
            scoring::compute_breakdown(tab, tab_tokens, project, context, &self.config, now);
        ScoringResult {
            project_id: project.id.clone(),
            subproject_id: resolve_subproject(tab, tab_tokens, project, &self.config),
            score: scoring::weighted_total(&breakdown, &self.config),
            breakdown,
        }
    }

    /// Scores every candidate, keeps totals at or above the minimum, best first.
    pub fn score_all_projects(
        &self,
        tab: &Tab,
        candidates: &[&Project],
        context: Option<&ActiveContext>,
        now: DateTime<Utc>,
    ) -> Vec<ScoringResult> {
        let tokens = tab.features();
        let mut results: Vec<ScoringResult> = candidates
            .iter()
            .filter(|project| !scoring::is_excluded(&tokens, project))
            .map(|project| self.score_with_tokens(tab, &tokens, project, context, now))
            .filter(|result| result.score >= self.config.min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results
    }

    pub fn best_match(
        &self,
        tab: &Tab,
        projects: &[Project],
        context: Option<&ActiveContext>,
        now: DateTime<Utc>,
    ) -> Option<ScoringResult> {
        let candidates = self.narrow(tab, projects, now);
        let best = self
            .score_all_projects(tab, &candidates, context, now)
            .into_iter()
            .next();

        log_debug!(
            "tab {} on {}: {} candidates of {}, best {:?}",
            tab.id,
            tab.host(),
            candidates.len(),
            projects.len(),
            best.as_ref().map(|result| (&result.project_id, result.score))
        );

        best
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{context_with, project, tab_at};
    use super::*;
    use crate::features::TokenCentroid;
    use crate::models::{ProjectRule, RuleKind};
    use chrono::Duration;

    #[test]
    fn host_rule_alone_clears_every_threshold() {
        let now = Utc::now();
        let mut p = project("gh", now - Duration::days(1));
        p.rules.push(ProjectRule::host("github.com"));

        let tab = tab_at("https://github.com/org/repo", now);
        let best = Matcher::default().best_match(&tab, &[p], None, now).unwrap();
        assert_eq!(best.breakdown.host_match, 1.0);
        assert_eq!(best.score, 3.0);
    }

    #[test]
    fn results_are_sorted_and_filtered_at_inclusive_minimum() {
        let now = Utc::now();
        let stale = now - Duration::days(1);

        let mut strong = project("strong", stale);
        strong.rules.push(ProjectRule::host("example.com"));
        // path-only match: 0.25 * 2.0 = 0.5
        let mut weak = project("weak", stale);
        weak.rules.push(ProjectRule::new(RuleKind::PathPrefix, "docs", 1.0));
        // recency bucket 0.3 * weight 1.0 = exactly the minimum
        let edge = project("edge", now - Duration::minutes(20));
        let none = project("none", stale);

        let tab = tab_at("https://example.com/docs/intro", now);
        let context = context_with(Some("elsewhere"), &[], now);
        let candidates = vec![&none, &edge, &weak, &strong];
        let results = Matcher::default().score_all_projects(&tab, &candidates, Some(&context), now);

        let ids: Vec<&str> = results.iter().map(|r| r.project_id.as_str()).collect();
        assert_eq!(ids, vec!["strong", "weak", "edge"]);
        assert!((results[2].score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn excluded_projects_never_score() {
        let now = Utc::now();
        let mut p = project("p", now);
        p.rules.push(ProjectRule::host("example.com"));
        p.rules.push(ProjectRule::new(RuleKind::KeywordExclude, "recipes", 1.0));

        let tab = Tab::new(1, 1, "https://example.com/recipes", "", now).unwrap();
        assert!(Matcher::default().best_match(&tab, &[p], None, now).is_none());
    }

    #[test]
    fn scoring_is_idempotent() {
        let now = Utc::now();
        let mut p = project("p", now - Duration::minutes(3));
        p.centroid = TokenCentroid::create(
            &[vec!["example".into(), "docs".into(), "intro".into()]],
            None,
        );
        let tab = tab_at("https://example.com/docs/intro", now);
        let context = context_with(None, &[("p", 0.4)], now);
        let matcher = Matcher::default();

        let first = matcher.score_tab_for_project(&tab, &p, Some(&context), now);
        let second = matcher.score_tab_for_project(&tab, &p, Some(&context), now);
        assert_eq!(first, second);
    }

    #[test]
    fn unrelated_recent_project_scores_on_recency_alone() {
        let now = Utc::now();
        let q = project("q", now - Duration::minutes(10));
        let tab = tab_at("https://news.example.org/today", now);
        let context = context_with(Some("p"), &[], now);

        let result = Matcher::default().score_tab_for_project(&tab, &q, Some(&context), now);
        assert_eq!(result.breakdown.chain_proximity, 0.0);
        assert_eq!(result.breakdown.recency_boost, 0.6);
        assert!((result.score - 0.6).abs() < 1e-12);
    }
}
