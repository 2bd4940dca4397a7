use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::features::TokenCentroid;
use crate::models::{Project, ProjectRule, Subproject, SubprojectSignature, Tab};
use crate::settings::AssignmentConfig;

pub const PROJECT_PALETTE: [&str; 10] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
    "#f97316", "#6366f1",
];

pub fn palette_color(project_count: usize) -> &'static str {
    PROJECT_PALETTE[project_count % PROJECT_PALETTE.len()]
}

/// Host with a leading `www.` removed.
pub fn display_name(host: &str) -> String {
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Builds a fresh project (and its first subproject) seeded from one tab.
pub fn synthesize_project(
    tab: &Tab,
    tab_tokens: &[String],
    project_count: usize,
    config: &AssignmentConfig,
    now: DateTime<Utc>,
) -> Project {
    let name = display_name(tab.host());
    let seed = TokenCentroid::create(&[tab_tokens.to_vec()], None);

    let path_prefix = tab.url.path_prefix(config.seed_prefix_depth);
    let subproject_name = if path_prefix.is_empty() {
        name.clone()
    } else {
        path_prefix.clone()
    };

    let subproject = Subproject {
        id: Uuid::new_v4().to_string(),
        name: subproject_name,
        signature: SubprojectSignature {
            host: tab.host().to_string(),
            path_prefix,
            centroid: seed.clone(),
        },
        rules: Vec::new(),
        created_at: now,
        last_active_at: now,
    };

    Project {
        id: Uuid::new_v4().to_string(),
        name,
        color: palette_color(project_count).to_string(),
        pinned: false,
        locked: false,
        created_at: now,
        last_active_at: now,
        activity_score: 0.0,
        centroid: seed,
        rules: vec![ProjectRule::host(tab.host())],
        subprojects: vec![subproject],
    }
}

/// Returns the project after absorbing a committed tab.
///
/// Locked projects keep their centroids; timestamps and activity still move.
pub fn apply_feedback(
    project: &Project,
    subproject_id: Option<&str>,
    tab_tokens: &[String],
    config: &AssignmentConfig,
    now: DateTime<Utc>,
) -> Project {
    let mut updated = project.clone();
    updated.last_active_at = now;
    updated.activity_score += 1.0;

    if !updated.locked {
        updated.centroid = project.centroid.update(tab_tokens, config.project_update_weight);
    }

    if let Some(sub) = subproject_id.and_then(|id| updated.subproject_mut(id)) {
        sub.last_active_at = now;
        if !project.locked {
            sub.signature.centroid = sub
                .signature
                .centroid
                .update(tab_tokens, config.subproject_update_weight);
        }
    }

    updated
}
