use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{from_json, parse_datetime, to_json},
};
use crate::models::Project;

const PROJECT_COLUMNS: &str = "id, name, color, pinned, locked, created_at, last_active_at, \
     activity_score, centroid_json, rules_json, subprojects_json";

fn row_to_project(row: &Row) -> Result<Project> {
    let created_at: String = row.get("created_at")?;
    let last_active_at: String = row.get("last_active_at")?;
    let centroid: String = row.get("centroid_json")?;
    let rules: String = row.get("rules_json")?;
    let subprojects: String = row.get("subprojects_json")?;

    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        pinned: row.get("pinned")?,
        locked: row.get("locked")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        last_active_at: parse_datetime(&last_active_at, "last_active_at")?,
        activity_score: row.get("activity_score")?,
        centroid: from_json(&centroid, "centroid_json")?,
        rules: from_json(&rules, "rules_json")?,
        subprojects: from_json(&subprojects, "subprojects_json")?,
    })
}

impl Database {
    /// Inserts or replaces a project. Replacing keeps the original rowid,
    /// so listing order stays the creation order.
    pub async fn upsert_project(&self, project: &Project) -> Result<()> {
        let record = project.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO projects (id, name, color, pinned, locked, created_at, last_active_at,
                                       activity_score, centroid_json, rules_json, subprojects_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     color = excluded.color,
                     pinned = excluded.pinned,
                     locked = excluded.locked,
                     created_at = excluded.created_at,
                     last_active_at = excluded.last_active_at,
                     activity_score = excluded.activity_score,
                     centroid_json = excluded.centroid_json,
                     rules_json = excluded.rules_json,
                     subprojects_json = excluded.subprojects_json",
                params![
                    record.id,
                    record.name,
                    record.color,
                    record.pinned,
                    record.locked,
                    record.created_at.to_rfc3339(),
                    record.last_active_at.to_rfc3339(),
                    record.activity_score,
                    to_json(&record.centroid, "centroid_json")?,
                    to_json(&record.rules, "rules_json")?,
                    to_json(&record.subprojects, "subprojects_json")?,
                ],
            )
            .with_context(|| format!("failed to upsert project {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn get_project_by_id(&self, project_id: &str) -> Result<Option<Project>> {
        let project_id = project_id.to_string();
        self.execute(move |conn| {
            let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![project_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_project(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn remove_project(&self, project_id: &str) -> Result<()> {
        let project_id = project_id.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM projects WHERE id = ?1", params![project_id])
                .with_context(|| format!("failed to delete project {project_id}"))?;
            Ok(())
        })
        .await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.execute(|conn| {
            let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY rowid ASC");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;

            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(row_to_project(row)?);
            }
            Ok(projects)
        })
        .await
    }
}
