use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row, ToSql};

use crate::db::{
    connection::Database,
    helpers::{from_optional_json, parse_datetime, to_i64, to_json, to_u64},
};
use crate::features::TabUrl;
use crate::models::{Tab, TabId, WindowId};

const TAB_COLUMNS: &str = "id, window_id, url, title, page_json, created_at, last_active_at, \
     active_time_ms, project_id, subproject_id, fingerprint, opener_tab_id, manually_assigned";

fn row_to_tab(row: &Row) -> Result<Tab> {
    let url: String = row.get("url")?;
    let created_at: String = row.get("created_at")?;
    let last_active_at: String = row.get("last_active_at")?;

    Ok(Tab {
        id: row.get("id")?,
        window_id: row.get("window_id")?,
        url: TabUrl::parse(&url).with_context(|| format!("stored url '{url}' is invalid"))?,
        title: row.get("title")?,
        page: from_optional_json(row.get("page_json")?, "page_json")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        last_active_at: parse_datetime(&last_active_at, "last_active_at")?,
        active_time_ms: to_u64(row.get("active_time_ms")?, "active_time_ms")?,
        project_id: row.get("project_id")?,
        subproject_id: row.get("subproject_id")?,
        fingerprint: row.get("fingerprint")?,
        opener_tab_id: row.get("opener_tab_id")?,
        manually_assigned: row.get("manually_assigned")?,
    })
}

fn query_tabs(conn: &Connection, filter: &str, args: &[&dyn ToSql]) -> Result<Vec<Tab>> {
    let sql = format!("SELECT {TAB_COLUMNS} FROM tabs {filter} ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(args)?;

    let mut tabs = Vec::new();
    while let Some(row) = rows.next()? {
        tabs.push(row_to_tab(row)?);
    }
    Ok(tabs)
}

impl Database {
    pub async fn upsert_tab(&self, tab: &Tab) -> Result<()> {
        let record = tab.clone();
        self.execute(move |conn| {
            let page_json = record
                .page
                .as_ref()
                .map(|page| to_json(page, "page_json"))
                .transpose()?;

            conn.execute(
                "INSERT INTO tabs (id, window_id, url, host, title, page_json, created_at, last_active_at,
                                   active_time_ms, project_id, subproject_id, fingerprint, opener_tab_id,
                                   manually_assigned)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(id) DO UPDATE SET
                     window_id = excluded.window_id,
                     url = excluded.url,
                     host = excluded.host,
                     title = excluded.title,
                     page_json = excluded.page_json,
                     created_at = excluded.created_at,
                     last_active_at = excluded.last_active_at,
                     active_time_ms = excluded.active_time_ms,
                     project_id = excluded.project_id,
                     subproject_id = excluded.subproject_id,
                     fingerprint = excluded.fingerprint,
                     opener_tab_id = excluded.opener_tab_id,
                     manually_assigned = excluded.manually_assigned",
                params![
                    record.id,
                    record.window_id,
                    record.url.raw,
                    record.url.host,
                    record.title,
                    page_json,
                    record.created_at.to_rfc3339(),
                    record.last_active_at.to_rfc3339(),
                    to_i64(record.active_time_ms)?,
                    record.project_id,
                    record.subproject_id,
                    record.fingerprint,
                    record.opener_tab_id,
                    record.manually_assigned,
                ],
            )
            .with_context(|| format!("failed to upsert tab {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn get_tab_by_id(&self, tab_id: TabId) -> Result<Option<Tab>> {
        self.execute(move |conn| {
            let mut tabs = query_tabs(conn, "WHERE id = ?1", &[&tab_id])?;
            Ok(tabs.pop())
        })
        .await
    }

    pub async fn remove_tab(&self, tab_id: TabId) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM tabs WHERE id = ?1", params![tab_id])
                .with_context(|| format!("failed to delete tab {tab_id}"))?;
            Ok(())
        })
        .await
    }

    pub async fn list_tabs(&self) -> Result<Vec<Tab>> {
        self.execute(|conn| query_tabs(conn, "", &[])).await
    }

    pub async fn list_tabs_for_project(&self, project_id: &str) -> Result<Vec<Tab>> {
        let project_id = project_id.to_string();
        self.execute(move |conn| query_tabs(conn, "WHERE project_id = ?1", &[&project_id]))
            .await
    }

    pub async fn list_tabs_for_host(&self, host: &str) -> Result<Vec<Tab>> {
        let host = host.to_string();
        self.execute(move |conn| query_tabs(conn, "WHERE host = ?1", &[&host]))
            .await
    }

    pub async fn list_tabs_for_window(&self, window_id: WindowId) -> Result<Vec<Tab>> {
        self.execute(move |conn| query_tabs(conn, "WHERE window_id = ?1", &[&window_id]))
            .await
    }
}
