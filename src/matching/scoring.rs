use chrono::{DateTime, Utc};

use crate::features::prefix_depth;
use crate::matching::config::MatcherConfig;
use crate::models::{ActiveContext, Project, RuleKind, ScoreBreakdown, Tab};

const EXACT_HOST_SCORE: f64 = 1.0;
const SUBPROJECT_HOST_SCORE: f64 = 0.9;
const DOMAIN_RULE_SCORE: f64 = 0.8;

/// Compute all five sub-scores for one tab/project pair.
pub fn compute_breakdown(
    tab: &Tab,
    tab_tokens: &[String],
    project: &Project,
    context: Option<&ActiveContext>,
    config: &MatcherConfig,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    ScoreBreakdown {
        host_match: score_host(tab, project),
        path_match: score_path(tab, project, config),
        token_similarity: score_tokens(tab_tokens, project),
        chain_proximity: score_chain(project, context, config),
        recency_boost: score_recency(project, context, now),
    }
}

/// Weighted sum of the sub-scores. Unnormalized unless configured otherwise.
pub fn weighted_total(breakdown: &ScoreBreakdown, config: &MatcherConfig) -> f64 {
    let total = config.weight_host * breakdown.host_match
        + config.weight_path * breakdown.path_match
        + config.weight_token * breakdown.token_similarity
        + config.weight_chain * breakdown.chain_proximity
        + config.weight_recency * breakdown.recency_boost;

    if config.normalize_scores && config.weight_sum() > 0.0 {
        total / config.weight_sum()
    } else {
        total
    }
}

/// Best of: exact host rule, subproject signature host, domain rule.
fn score_host(tab: &Tab, project: &Project) -> f64 {
    let host = tab.host();
    let domain = tab.url.registrable_domain();

    let mut score: f64 = 0.0;
    for rule in &project.rules {
        if rule.matches_host(host) {
            return EXACT_HOST_SCORE;
        }
        if rule.matches_domain(&domain) {
            score = score.max(DOMAIN_RULE_SCORE);
        }
    }
    if project.has_subproject_host(host) {
        score = score.max(SUBPROJECT_HOST_SCORE);
    }
    score
}

/// Deepest matching prefix among path rules and subproject signatures.
fn score_path(tab: &Tab, project: &Project, config: &MatcherConfig) -> f64 {
    let path = tab.url.joined_path();
    project
        .rules_of(RuleKind::PathPrefix)
        .map(|rule| rule.value.as_str())
        .chain(
            project
                .subprojects
                .iter()
                .map(|sub| sub.signature.path_prefix.as_str()),
        )
        .filter(|prefix| path.starts_with(*prefix))
        .map(|prefix| (prefix_depth(prefix) as f64 * config.path_depth_credit).min(1.0))
        .fold(0.0, f64::max)
}

/// Centroid similarity, floored by any matching include keyword.
fn score_tokens(tab_tokens: &[String], project: &Project) -> f64 {
    let similarity = project.centroid.weighted_similarity(tab_tokens);
    project
        .rules_of(RuleKind::KeywordInclude)
        .filter(|rule| tab_tokens.iter().any(|token| *token == rule.value))
        .map(|rule| rule.weight.clamp(0.0, 1.0))
        .fold(similarity, f64::max)
}

fn score_chain(project: &Project, context: Option<&ActiveContext>, config: &MatcherConfig) -> f64 {
    let Some(context) = context else {
        return 0.0;
    };
    if context.is_active_project(&project.id) {
        return 1.0;
    }
    context
        .recent_weight_for(&project.id)
        .map(|weight| weight * config.recent_chain_factor)
        .unwrap_or(0.0)
}

fn score_recency(project: &Project, context: Option<&ActiveContext>, now: DateTime<Utc>) -> f64 {
    let Some(context) = context else {
        return 0.0;
    };
    if context.is_active_project(&project.id) {
        return 1.0;
    }

    let minutes = (now - project.last_active_at).num_milliseconds() as f64 / 60_000.0;
    if minutes < 5.0 {
        0.9
    } else if minutes < 15.0 {
        0.6
    } else if minutes < 30.0 {
        0.3
    } else {
        0.0
    }
}

/// True when an exclude keyword rules the project out for these tokens.
pub fn is_excluded(tab_tokens: &[String], project: &Project) -> bool {
    project
        .rules_of(RuleKind::KeywordExclude)
        .any(|rule| tab_tokens.iter().any(|token| *token == rule.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::{context_with, project, subproject, tab_at};
    use crate::models::ProjectRule;
    use chrono::Duration;

    #[test]
    fn host_score_prefers_exact_rule() {
        let now = Utc::now();
        let tab = tab_at("https://github.com/org/repo", now);

        let mut exact = project("p", now);
        exact.rules.push(ProjectRule::new(RuleKind::Domain, "github.com", 1.0));
        exact.rules.push(ProjectRule::host("github.com"));
        assert_eq!(score_host(&tab, &exact), 1.0);

        let mut sub = project("p", now);
        sub.rules.push(ProjectRule::new(RuleKind::Domain, "github.com", 1.0));
        sub.subprojects.push(subproject("github.com", "org/repo"));
        assert_eq!(score_host(&tab, &sub), 0.9);

        let mut domain = project("p", now);
        domain.rules.push(ProjectRule::new(RuleKind::Domain, "github.com", 1.0));
        assert_eq!(score_host(&tab, &domain), 0.8);

        assert_eq!(score_host(&tab, &project("p", now)), 0.0);
    }

    #[test]
    fn path_score_scales_with_prefix_depth() {
        let now = Utc::now();
        let tab = tab_at("https://github.com/org/repo/issues/7", now);
        let config = MatcherConfig::default();

        let mut p = project("p", now);
        p.rules.push(ProjectRule::new(RuleKind::PathPrefix, "/org", 1.0));
        assert_eq!(score_path(&tab, &p, &config), 0.25);

        p.subprojects.push(subproject("gitlab.com", "org/repo/issues"));
        assert_eq!(score_path(&tab, &p, &config), 0.75);

        p.rules.push(ProjectRule::new(RuleKind::PathPrefix, "org/repo/issues/7", 1.0));
        assert_eq!(score_path(&tab, &p, &config), 1.0);

        let mut miss = project("q", now);
        miss.rules.push(ProjectRule::new(RuleKind::PathPrefix, "elsewhere", 1.0));
        assert_eq!(score_path(&tab, &miss, &config), 0.0);
    }

    #[test]
    fn include_keyword_floors_token_similarity() {
        let now = Utc::now();
        let mut p = project("p", now);
        p.rules.push(ProjectRule::new(RuleKind::KeywordInclude, "tokio", 0.7));

        let tokens = vec!["tokio".to_string()];
        assert_eq!(score_tokens(&tokens, &p), 0.7);
        assert_eq!(score_tokens(&["serde".to_string()], &p), 0.0);
    }

    #[test]
    fn exclude_keyword_marks_project() {
        let now = Utc::now();
        let mut p = project("p", now);
        p.rules.push(ProjectRule::new(RuleKind::KeywordExclude, "recipes", 1.0));
        assert!(is_excluded(&["recipes".to_string()], &p));
        assert!(!is_excluded(&["rust".to_string()], &p));
    }

    #[test]
    fn chain_and_recency_are_zero_without_context() {
        let now = Utc::now();
        let p = project("p", now);
        let config = MatcherConfig::default();
        assert_eq!(score_chain(&p, None, &config), 0.0);
        assert_eq!(score_recency(&p, None, now), 0.0);
    }

    #[test]
    fn active_project_gets_full_chain_and_recency() {
        let now = Utc::now();
        let p = project("p", now - Duration::hours(5));
        let context = context_with(Some("p"), &[], now);
        let config = MatcherConfig::default();
        assert_eq!(score_chain(&p, Some(&context), &config), 1.0);
        assert_eq!(score_recency(&p, Some(&context), now), 1.0);
    }

    #[test]
    fn recent_tab_weight_feeds_chain_proximity() {
        let now = Utc::now();
        let p = project("q", now);
        let context = context_with(Some("p"), &[("q", 0.5), ("q", 0.2)], now);
        let config = MatcherConfig::default();
        assert!((score_chain(&p, Some(&context), &config) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn recency_buckets_step_down() {
        let now = Utc::now();
        let context = context_with(Some("active"), &[], now);
        let cases = [(2, 0.9), (10, 0.6), (20, 0.3), (45, 0.0)];
        for (minutes, expected) in cases {
            let p = project("q", now - Duration::minutes(minutes));
            assert_eq!(score_recency(&p, Some(&context), now), expected, "{minutes} min");
        }
    }

    #[test]
    fn total_is_monotonic_in_each_sub_score() {
        let config = MatcherConfig::default();
        let base = ScoreBreakdown {
            host_match: 0.2,
            path_match: 0.2,
            token_similarity: 0.2,
            chain_proximity: 0.2,
            recency_boost: 0.2,
        };
        let base_total = weighted_total(&base, &config);

        let bumps: [fn(&mut ScoreBreakdown); 5] = [
            |b| b.host_match = 0.9,
            |b| b.path_match = 0.9,
            |b| b.token_similarity = 0.9,
            |b| b.chain_proximity = 0.9,
            |b| b.recency_boost = 0.9,
        ];
        for bump in bumps {
            let mut raised = base;
            bump(&mut raised);
            assert!(weighted_total(&raised, &config) >= base_total);
        }
    }

    #[test]
    fn normalization_divides_by_weight_sum() {
        let config = MatcherConfig {
            normalize_scores: true,
            ..MatcherConfig::default()
        };
        let breakdown = ScoreBreakdown {
            host_match: 1.0,
            ..ScoreBreakdown::default()
        };
        assert!((weighted_total(&breakdown, &config) - 3.0 / 9.5).abs() < 1e-9);
    }
}
