use std::sync::Arc;

use chrono::{DateTime, Utc};
use complyd_cron::CronExpression;
use complyd_store::{NewScheduledReport, ReportStore, ScheduledReport};
use tracing::info;

use crate::error::{EngineError, Result};

/// Maintenance of recurring report definitions.
///
/// The evaluator is consulted on every write that touches the cron string,
/// so a stored `next_run_at` always agrees with evaluating the stored
/// expression at the time it was written, and is strictly in the future of
/// that instant (or NULL when the expression has no occurrence within the
/// scan bound). Malformed expressions are rejected before anything is
/// persisted.
pub struct ScheduledReports {
    store: Arc<ReportStore>,
}

impl ScheduledReports {
    pub fn new(store: Arc<ReportStore>) -> Self {
        Self { store }
    }

    /// Validate the cron string, compute the first run, and persist the
    /// definition.
    pub fn create(&self, new: NewScheduledReport) -> Result<ScheduledReport> {
        let expr = parse_cron(&new.cron)?;
        let next = expr.next().map(|dt| dt.to_rfc3339());
        Ok(self.store.insert_scheduled(new, next.as_deref())?)
    }

    /// Replace the cron string, recomputing `next_run_at` in the same
    /// write. An invalid expression fails here and leaves the stored
    /// definition untouched.
    pub fn update_schedule(&self, id: &str, cron: &str) -> Result<ScheduledReport> {
        let expr = parse_cron(cron)?;
        let next = expr.next().map(|dt| dt.to_rfc3339());
        // Persist the expression the evaluator actually parsed, so the
        // stored string and the computed next_run_at can never diverge.
        self.store.set_schedule(id, expr.source(), next.as_deref())?;
        info!(schedule_id = %id, %cron, "schedule updated");
        Ok(self.store.get_scheduled(id)?)
    }

    /// Enable or disable a definition.
    pub fn set_active(&self, id: &str, active: bool) -> Result<()> {
        Ok(self.store.set_active(id, active)?)
    }

    /// Record a trigger at `now`: set `last_run_at` and roll `next_run_at`
    /// forward to the following occurrence.
    pub fn mark_ran(&self, id: &str, now: DateTime<Utc>) -> Result<ScheduledReport> {
        let def = self.store.get_scheduled(id)?;
        let expr = parse_cron(&def.cron)?;
        let next = expr.next_after(now).map(|dt| dt.to_rfc3339());
        self.store
            .record_run(id, &now.to_rfc3339(), next.as_deref())?;
        Ok(self.store.get_scheduled(id)?)
    }

    /// Active definitions due at or before `now` — read by the external
    /// trigger that turns definitions into Report instances.
    pub fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledReport>> {
        Ok(self.store.list_scheduled_due(&now.to_rfc3339())?)
    }

    /// Delete a definition.
    pub fn remove(&self, id: &str) -> Result<()> {
        Ok(self.store.remove_scheduled(id)?)
    }
}

fn parse_cron(cron: &str) -> Result<CronExpression> {
    CronExpression::parse(cron).map_err(|e| EngineError::InvalidSchedule(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_store;
    use complyd_core::ReportFormat;
    use chrono::Timelike;

    fn new_definition(cron: &str) -> NewScheduledReport {
        NewScheduledReport {
            owner: "u-1".to_string(),
            report_type: "gap-analysis".to_string(),
            template_id: Some("tmpl-exec-summary".to_string()),
            parameters: None,
            format: ReportFormat::Pdf,
            cron: cron.to_string(),
        }
    }

    fn parse(ts: &str) -> DateTime<Utc> {
        ts.parse().unwrap()
    }

    #[test]
    fn invalid_cron_is_rejected_before_persisting() {
        let store = memory_store();
        let schedules = ScheduledReports::new(store.clone());

        let err = schedules.create(new_definition("61 * * * *")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule(_)));
        assert!(store.list_scheduled_due("2999-01-01T00:00:00+00:00").unwrap().is_empty());
    }

    #[test]
    fn create_computes_a_future_next_run() {
        let schedules = ScheduledReports::new(memory_store());
        let def = schedules.create(new_definition("0 9 * * *")).unwrap();

        let next: DateTime<Utc> = def.next_run_at.unwrap().parse().unwrap();
        assert!(next > Utc::now());
        assert_eq!(next.hour(), 9);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn update_recomputes_next_run_consistently() {
        let schedules = ScheduledReports::new(memory_store());
        let def = schedules.create(new_definition("0 9 * * *")).unwrap();

        let updated = schedules.update_schedule(&def.id, "30 14 * * *").unwrap();
        assert_eq!(updated.cron, "30 14 * * *");
        let next: DateTime<Utc> = updated.next_run_at.unwrap().parse().unwrap();
        assert_eq!(next.hour(), 14);
        assert_eq!(next.minute(), 30);
    }

    #[test]
    fn failed_update_leaves_definition_untouched() {
        let store = memory_store();
        let schedules = ScheduledReports::new(store.clone());
        let def = schedules.create(new_definition("0 9 * * *")).unwrap();

        let err = schedules.update_schedule(&def.id, "not a cron").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule(_)));

        let reloaded = store.get_scheduled(&def.id).unwrap();
        assert_eq!(reloaded.cron, "0 9 * * *");
        assert_eq!(reloaded.next_run_at, def.next_run_at);
    }

    #[test]
    fn mark_ran_rolls_forward_from_the_trigger_time() {
        let schedules = ScheduledReports::new(memory_store());
        let def = schedules.create(new_definition("0 9 * * *")).unwrap();

        let fired_at = parse("2026-03-02T09:00:00Z");
        let rolled = schedules.mark_ran(&def.id, fired_at).unwrap();

        assert_eq!(
            rolled.last_run_at.as_deref(),
            Some("2026-03-02T09:00:00+00:00")
        );
        // Strictly after the trigger: the same 09:00 is not reused.
        assert_eq!(
            rolled.next_run_at.as_deref(),
            Some("2026-03-03T09:00:00+00:00")
        );
    }

    #[test]
    fn unrunnable_schedule_stores_null_next_run() {
        let schedules = ScheduledReports::new(memory_store());
        // February 31st never exists; the bounded scan yields no run.
        let def = schedules.create(new_definition("0 0 31 2 *")).unwrap();
        assert!(def.next_run_at.is_none());
        // ...and a definition without a next run is never due.
        assert!(schedules
            .list_due(parse("2999-01-01T00:00:00Z"))
            .unwrap()
            .is_empty());
    }
}
