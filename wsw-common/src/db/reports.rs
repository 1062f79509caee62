//! Report record store
//!
//! Append-only: reports are inserted once and listed newest first. There is no update or
//! delete path.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::report::{Coordinates, Report, ReportDraft, StrikeStatus, WindowType};
use crate::{Error, Result};

/// Persistence boundary for reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a draft as a single write, assigning id and creation time
    async fn insert(&self, draft: ReportDraft) -> Result<Report>;

    /// All reports ordered by creation time, newest first
    async fn list_all(&self) -> Result<Vec<Report>>;
}

/// SQLite-backed [`ReportStore`]
#[derive(Debug, Clone)]
pub struct SqliteReportStore {
    pool: SqlitePool,
}

impl SqliteReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a single report by id
    pub async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        let row = sqlx::query(
            r#"
            SELECT id, reporter_name, bird_species, status, window_type,
                   photo_url, latitude, longitude, description, created_at
            FROM reports
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_report).transpose()
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn insert(&self, draft: ReportDraft) -> Result<Report> {
        let id = Uuid::new_v4();
        // Stored with microsecond precision; truncate now so the returned value matches
        let now = Utc::now();
        let created_at = now
            .with_nanosecond(now.nanosecond() / 1_000 * 1_000)
            .unwrap_or(now);

        sqlx::query(
            r#"
            INSERT INTO reports (
                id, reporter_name, bird_species, status, window_type,
                photo_url, latitude, longitude, description, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&draft.reporter_name)
        .bind(&draft.bird_species)
        .bind(draft.status.as_str())
        .bind(draft.window_type.as_str())
        .bind(&draft.photo_url)
        .bind(draft.location.map(|c| c.latitude))
        .bind(draft.location.map(|c| c.longitude))
        .bind(&draft.description)
        .bind(format_timestamp(&created_at))
        .execute(&self.pool)
        .await?;

        tracing::debug!(report_id = %id, "Report inserted");

        Ok(Report::from_draft(draft, id, created_at))
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        let rows = sqlx::query(
            r#"
            SELECT id, reporter_name, bird_species, status, window_type,
                   photo_url, latitude, longitude, description, created_at
            FROM reports
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }
}

/// Fixed-width RFC 3339 so that text ordering equals time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_report(row: &SqliteRow) -> Result<Report> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Invalid report id {}: {}", id, e)))?;

    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&Utc);

    let status: String = row.get("status");
    let window_type: String = row.get("window_type");

    let latitude: Option<f64> = row.get("latitude");
    let longitude: Option<f64> = row.get("longitude");
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
        _ => None,
    };

    Ok(Report {
        id,
        reporter_name: row.get("reporter_name"),
        bird_species: row.get("bird_species"),
        status: status.parse().unwrap_or(StrikeStatus::Unknown),
        window_type: window_type.parse().unwrap_or(WindowType::Unknown),
        photo_url: row.get("photo_url"),
        location,
        description: row.get("description"),
        created_at,
    })
}
