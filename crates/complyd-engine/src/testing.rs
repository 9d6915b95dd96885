//! Shared test doubles for the dispatcher and worker tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use complyd_core::ReportFormat;
use complyd_queue::{GenerationJob, QueueError, ReportQueue};
use complyd_store::{NewReport, ReportStore};
use serde_json::{json, Value};

use crate::generator::ReportGenerator;

pub(crate) fn memory_store() -> Arc<ReportStore> {
    Arc::new(ReportStore::new(rusqlite_memory()).unwrap())
}

fn rusqlite_memory() -> rusqlite::Connection {
    rusqlite::Connection::open_in_memory().unwrap()
}

pub(crate) fn new_request() -> NewReport {
    NewReport {
        owner: "u-1".to_string(),
        report_type: "gap-analysis".to_string(),
        format: ReportFormat::Pdf,
        parameters: Some(json!({"region": "eu"})),
    }
}

/// Queue double: liveness and publish behaviour set per test, published
/// jobs captured for inspection.
pub(crate) struct MockQueue {
    live: bool,
    fail_publish: bool,
    pub(crate) published: Mutex<Vec<GenerationJob>>,
}

impl MockQueue {
    pub(crate) fn live() -> Self {
        Self {
            live: true,
            fail_publish: false,
            published: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn offline() -> Self {
        Self {
            live: false,
            fail_publish: false,
            published: Mutex::new(Vec::new()),
        }
    }

    /// Reports live but every publish fails — the broker dropped between
    /// the probe and the publish.
    pub(crate) fn failing() -> Self {
        Self {
            live: true,
            fail_publish: true,
            published: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReportQueue for MockQueue {
    fn is_live(&self) -> bool {
        self.live
    }

    async fn publish(&self, job: &GenerationJob) -> complyd_queue::Result<()> {
        if self.fail_publish {
            return Err(QueueError::Publish("connection reset".to_string()));
        }
        self.published.lock().unwrap().push(job.clone());
        Ok(())
    }
}

/// Generator double that always succeeds with a fixed location.
pub(crate) struct OkGenerator {
    location: String,
    calls: AtomicUsize,
}

impl OkGenerator {
    pub(crate) fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportGenerator for OkGenerator {
    async fn generate(
        &self,
        _report_id: &str,
        _report_type: &str,
        _parameters: Option<&Value>,
        _format: ReportFormat,
    ) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.location.clone())
    }
}

/// Generator double that always fails with a fixed message.
pub(crate) struct FailingGenerator {
    message: String,
}

impl FailingGenerator {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ReportGenerator for FailingGenerator {
    async fn generate(
        &self,
        _report_id: &str,
        _report_type: &str,
        _parameters: Option<&Value>,
        _format: ReportFormat,
    ) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("{}", self.message))
    }
}
