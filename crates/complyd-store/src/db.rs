use rusqlite::Connection;

use crate::error::Result;

/// Initialise the report schema in `conn`.
///
/// Creates the `reports` and `scheduled_reports` tables (idempotent) plus
/// the indexes the dispatcher, worker, and trigger queries rely on.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reports (
            id            TEXT    NOT NULL PRIMARY KEY,
            owner         TEXT    NOT NULL,
            report_type   TEXT    NOT NULL,
            format        TEXT    NOT NULL,   -- 'pdf' | 'csv'
            parameters    TEXT,               -- opaque JSON payload or NULL
            status        TEXT    NOT NULL DEFAULT 'queued',
            download_url  TEXT,               -- set only on 'completed'
            error_message TEXT,               -- set only on 'failed'
            created_at    TEXT    NOT NULL,
            updated_at    TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_reports_owner ON reports (owner, created_at);
        CREATE INDEX IF NOT EXISTS idx_reports_status ON reports (status);

        CREATE TABLE IF NOT EXISTS scheduled_reports (
            id            TEXT    NOT NULL PRIMARY KEY,
            owner         TEXT    NOT NULL,
            report_type   TEXT    NOT NULL,
            template_id   TEXT,
            parameters    TEXT,               -- opaque JSON payload or NULL
            format        TEXT    NOT NULL,
            cron          TEXT    NOT NULL,   -- validated 5-field expression
            is_active     INTEGER NOT NULL DEFAULT 1,
            last_run_at   TEXT,               -- ISO-8601 or NULL
            next_run_at   TEXT,               -- ISO-8601 or NULL
            created_at    TEXT    NOT NULL,
            updated_at    TEXT    NOT NULL
        ) STRICT;

        -- Efficient due-trigger polling: WHERE is_active AND next_run_at <= ?
        CREATE INDEX IF NOT EXISTS idx_scheduled_reports_next_run
            ON scheduled_reports (next_run_at);
        ",
    )?;
    Ok(())
}
