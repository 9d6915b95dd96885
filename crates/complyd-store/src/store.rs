use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::{NewReport, NewScheduledReport, Report, ReportStatus, ScheduledReport};

/// Persistence for reports and scheduled report definitions.
///
/// Thread-safe: wraps the SQLite connection in a Mutex. Each report row has
/// exactly one owning writer per request (the inline dispatch path or one
/// worker invocation), so the guarded UPDATEs below are the only
/// serialization needed.
pub struct ReportStore {
    db: Mutex<Connection>,
}

impl ReportStore {
    /// Create a store, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    // --- reports -----------------------------------------------------------

    /// Insert a new report in `queued`. Returns the fully populated record.
    pub fn create_report(&self, new: NewReport) -> Result<Report> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let params_json = new
            .parameters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        db.execute(
            "INSERT INTO reports
             (id, owner, report_type, format, parameters, status,
              download_url, error_message, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,'queued',NULL,NULL,?6,?6)",
            rusqlite::params![id, new.owner, new.report_type, new.format.to_string(), params_json, now],
        )?;
        info!(report_id = %id, report_type = %new.report_type, "report created");

        Ok(Report {
            id,
            owner: new.owner,
            report_type: new.report_type,
            format: new.format,
            parameters: new.parameters,
            status: ReportStatus::Queued,
            download_url: None,
            error_message: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Load a report by ID.
    pub fn get_report(&self, id: &str) -> Result<Report> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT id, owner, report_type, format, parameters, status,
                    download_url, error_message, created_at, updated_at
             FROM reports WHERE id = ?1",
            [id],
            row_to_report,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::ReportNotFound { id: id.to_string() },
            other => other.into(),
        })
    }

    /// All reports for one owner, newest first (what the platform's
    /// status poller reads).
    pub fn list_reports_for_owner(&self, owner: &str) -> Result<Vec<Report>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, owner, report_type, format, parameters, status,
                    download_url, error_message, created_at, updated_at
             FROM reports WHERE owner = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([owner], row_to_report)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// `queued` → `processing`. Must be persisted before generation starts
    /// so concurrent readers see accurate in-flight state.
    pub fn mark_processing(&self, id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = db.execute(
            "UPDATE reports SET status = 'processing', updated_at = ?1
             WHERE id = ?2 AND status = 'queued'",
            rusqlite::params![now, id],
        )?;
        if n == 0 {
            return Err(transition_error(&db, id, ReportStatus::Processing));
        }
        Ok(())
    }

    /// `processing` → `completed`, writing the artifact location. Terminal.
    pub fn mark_completed(&self, id: &str, download_url: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = db.execute(
            "UPDATE reports SET status = 'completed', download_url = ?1, updated_at = ?2
             WHERE id = ?3 AND status = 'processing'",
            rusqlite::params![download_url, now, id],
        )?;
        if n == 0 {
            return Err(transition_error(&db, id, ReportStatus::Completed));
        }
        info!(report_id = %id, "report completed");
        Ok(())
    }

    /// `processing` → `failed`, writing the failure text. Terminal.
    pub fn mark_failed(&self, id: &str, error_message: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = db.execute(
            "UPDATE reports SET status = 'failed', error_message = ?1, updated_at = ?2
             WHERE id = ?3 AND status = 'processing'",
            rusqlite::params![error_message, now, id],
        )?;
        if n == 0 {
            return Err(transition_error(&db, id, ReportStatus::Failed));
        }
        info!(report_id = %id, "report failed");
        Ok(())
    }

    // --- scheduled report definitions --------------------------------------

    /// Insert a definition. `next_run_at` is computed by the caller (the
    /// engine owns the evaluator); this layer only persists it.
    pub fn insert_scheduled(
        &self,
        new: NewScheduledReport,
        next_run_at: Option<&str>,
    ) -> Result<ScheduledReport> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let params_json = new
            .parameters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        db.execute(
            "INSERT INTO scheduled_reports
             (id, owner, report_type, template_id, parameters, format, cron,
              is_active, last_run_at, next_run_at, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,1,NULL,?8,?9,?9)",
            rusqlite::params![
                id,
                new.owner,
                new.report_type,
                new.template_id,
                params_json,
                new.format.to_string(),
                new.cron,
                next_run_at,
                now
            ],
        )?;
        info!(schedule_id = %id, cron = %new.cron, "scheduled report created");

        Ok(ScheduledReport {
            id,
            owner: new.owner,
            report_type: new.report_type,
            template_id: new.template_id,
            parameters: new.parameters,
            format: new.format,
            cron: new.cron,
            is_active: true,
            last_run_at: None,
            next_run_at: next_run_at.map(String::from),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Load a definition by ID.
    pub fn get_scheduled(&self, id: &str) -> Result<ScheduledReport> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT id, owner, report_type, template_id, parameters, format,
                    cron, is_active, last_run_at, next_run_at, created_at, updated_at
             FROM scheduled_reports WHERE id = ?1",
            [id],
            row_to_scheduled,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::ScheduleNotFound { id: id.to_string() }
            }
            other => other.into(),
        })
    }

    /// Active definitions whose next_run_at has arrived (what an external
    /// trigger reads before creating Report instances).
    pub fn list_scheduled_due(&self, now: &str) -> Result<Vec<ScheduledReport>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, owner, report_type, template_id, parameters, format,
                    cron, is_active, last_run_at, next_run_at, created_at, updated_at
             FROM scheduled_reports
             WHERE is_active = 1 AND next_run_at IS NOT NULL AND next_run_at <= ?1
             ORDER BY next_run_at",
        )?;
        let rows = stmt.query_map([now], row_to_scheduled)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Replace the cron string and its recomputed next_run_at together, so
    /// the two can never disagree in storage.
    pub fn set_schedule(&self, id: &str, cron: &str, next_run_at: Option<&str>) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = db.execute(
            "UPDATE scheduled_reports
             SET cron = ?1, next_run_at = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![cron, next_run_at, now, id],
        )?;
        if n == 0 {
            return Err(StoreError::ScheduleNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Enable or disable a definition.
    pub fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = db.execute(
            "UPDATE scheduled_reports SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![active, now, id],
        )?;
        if n == 0 {
            return Err(StoreError::ScheduleNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Record a trigger: set last_run_at and roll next_run_at forward.
    pub fn record_run(
        &self,
        id: &str,
        last_run_at: &str,
        next_run_at: Option<&str>,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = db.execute(
            "UPDATE scheduled_reports
             SET last_run_at = ?1, next_run_at = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![last_run_at, next_run_at, now, id],
        )?;
        if n == 0 {
            return Err(StoreError::ScheduleNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Delete a definition. Returns `ScheduleNotFound` if no row is deleted.
    pub fn remove_scheduled(&self, id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute("DELETE FROM scheduled_reports WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::ScheduleNotFound { id: id.to_string() });
        }
        info!(schedule_id = %id, "scheduled report removed");
        Ok(())
    }
}

/// Build the precise error for a guarded status UPDATE that matched no row:
/// either the report doesn't exist, or it is not in the required state.
fn transition_error(db: &Connection, id: &str, to: ReportStatus) -> StoreError {
    let current: std::result::Result<String, _> = db.query_row(
        "SELECT status FROM reports WHERE id = ?1",
        [id],
        |row| row.get(0),
    );
    match current.ok().and_then(|s| s.parse::<ReportStatus>().ok()) {
        Some(from) => StoreError::InvalidTransition {
            id: id.to_string(),
            from,
            to,
        },
        None => StoreError::ReportNotFound { id: id.to_string() },
    }
}

fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<Report> {
    let format_str: String = row.get(3)?;
    let params_json: Option<String> = row.get(4)?;
    let status_str: String = row.get(5)?;
    Ok(Report {
        id: row.get(0)?,
        owner: row.get(1)?,
        report_type: row.get(2)?,
        format: parse_col(3, &format_str)?,
        parameters: parse_params(4, params_json)?,
        status: parse_col(5, &status_str)?,
        download_url: row.get(6)?,
        error_message: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn row_to_scheduled(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduledReport> {
    let params_json: Option<String> = row.get(4)?;
    let format_str: String = row.get(5)?;
    Ok(ScheduledReport {
        id: row.get(0)?,
        owner: row.get(1)?,
        report_type: row.get(2)?,
        template_id: row.get(3)?,
        parameters: parse_params(4, params_json)?,
        format: parse_col(5, &format_str)?,
        cron: row.get(6)?,
        is_active: row.get(7)?,
        last_run_at: row.get(8)?,
        next_run_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Parse a TEXT column through FromStr, surfacing a conversion failure
/// instead of silently defaulting.
fn parse_col<T: std::str::FromStr<Err = String>>(idx: usize, s: &str) -> rusqlite::Result<T> {
    s.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn parse_params(
    idx: usize,
    json: Option<String>,
) -> rusqlite::Result<Option<serde_json::Value>> {
    json.map(|s| {
        serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    })
    .transpose()
}
