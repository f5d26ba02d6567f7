//! [`VigilEngine`]: construction, the request-path entry points, the
//! dashboard read path and shutdown.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use vigil_core::config::VigilConfig;
use vigil_core::errors::VigilResult;
use vigil_core::models::{
    EventRecord, GenerationOutput, HallucinationAssessment, MetricSnapshot, RetrievalOutput,
    RetrievedChunk, RiskLevel, StoredEntry,
};
use vigil_core::traits::{IEventObserver, IRecordSink, IReviewIntake};
use vigil_detector::{HallucinationDetector, ResponseContext};
use vigil_logger::{EventLogger, SessionRecorder, SessionSweeper};
use vigil_observability::tracing_setup::{self, events};
use vigil_observability::{
    evaluate_alerts, evaluate_metric_alerts, history_span, DegradationAlert,
    DegradationTracker, HealthInputs, HealthReport, MetricAlert, MetricsAggregator,
};
use vigil_review::ReviewQueue;
use vigil_storage::{
    BatchWriter, EnvKey, KeyProvider, MaintenanceIntervals, MaintenanceScheduler,
    PaginatedResult, RecordFilter, SecureLogStore, ShutdownReport, StoreReader, TimeRange,
};

const STORAGE_COMPONENT: &str = "storage";

pub struct VigilEngine {
    config: VigilConfig,
    writer: Arc<BatchWriter>,
    scheduler: Mutex<Option<MaintenanceScheduler>>,
    reader: StoreReader,
    aggregator: Arc<MetricsAggregator>,
    logger: Arc<EventLogger>,
    sweeper: Mutex<Option<SessionSweeper>>,
    detector: HallucinationDetector,
    review: Arc<ReviewQueue>,
    degradation: Mutex<DegradationTracker>,
}

impl VigilEngine {
    /// Open with the store key read from `storage.key_env_var`, installing
    /// the log subscriber from `observability` if none is set yet.
    pub fn open(config: VigilConfig) -> VigilResult<Self> {
        tracing_setup::init_from_config(&config.observability);
        let keys = Arc::new(EnvKey::new(config.storage.key_env_var.clone()));
        Self::open_with_keys(config, keys)
    }

    pub fn open_with_keys(config: VigilConfig, keys: Arc<dyn KeyProvider>) -> VigilResult<Self> {
        config.validate()?;

        let store = SecureLogStore::open(&config.storage, keys)?;
        let reader = store.reader()?;
        let writer = Arc::new(BatchWriter::spawn(store, &config.storage)?);
        let scheduler = MaintenanceScheduler::for_writer(
            Arc::clone(&writer),
            MaintenanceIntervals::from_config(&config.storage),
        )?;

        let sink: Arc<dyn IRecordSink> = writer.clone();
        let aggregator = Arc::new(MetricsAggregator::new(&config.metrics));
        let observer: Arc<dyn IEventObserver> = aggregator.clone();
        let review = Arc::new(ReviewQueue::new(&config.review).with_sink(Arc::clone(&sink)));
        let intake: Arc<dyn IReviewIntake> = review.clone();

        let logger = Arc::new(EventLogger::new(
            &config.logger,
            Arc::clone(&sink),
            Arc::clone(&observer),
        ));
        let sweeper = SessionSweeper::from_config(Arc::clone(&logger), &config.logger)?;
        let detector = HallucinationDetector::new(&config.detector)?
            .with_sink(sink)
            .with_intake(intake)
            .with_observer(observer);

        tracing::info!(
            event = "engine_started",
            store_dir = %config.storage.dir,
            version = vigil_core::constants::VERSION,
            "vigil engine started"
        );
        Ok(Self {
            config,
            writer,
            scheduler: Mutex::new(Some(scheduler)),
            reader,
            aggregator,
            logger,
            sweeper: Mutex::new(sweeper),
            detector,
            review,
            degradation: Mutex::new(DegradationTracker::new()),
        })
    }

    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    pub fn logger(&self) -> &EventLogger {
        &self.logger
    }

    pub fn session<'a>(&'a self, session_id: &'a str) -> SessionRecorder<'a> {
        self.logger.session(session_id)
    }

    pub fn detector(&self) -> &HallucinationDetector {
        &self.detector
    }

    pub fn review(&self) -> &ReviewQueue {
        &self.review
    }

    /// Assess an already recorded response.
    pub fn assess_response(
        &self,
        response: &EventRecord,
        answer: &str,
        chunks: &[RetrievedChunk],
        confidence: f64,
    ) -> VigilResult<HallucinationAssessment> {
        self.detector
            .assess(&ResponseContext::new(response, answer), chunks, confidence)
    }

    /// Record the `response` event for `generation` and assess it against
    /// the retrieved chunks.
    pub fn respond(
        &self,
        session_id: &str,
        retrieval: &RetrievalOutput,
        generation: &GenerationOutput,
        http_status: u16,
    ) -> VigilResult<HallucinationAssessment> {
        let response = self.session(session_id).response_record(
            &generation.answer,
            http_status,
            generation.latency_ms,
        )?;
        self.assess_response(&response, &generation.answer, &retrieval.chunks, generation.confidence)
    }

    /// Current metrics, with storage losses mirrored in.
    pub fn snapshot(&self) -> MetricSnapshot {
        self.sync_lost_events();
        self.aggregator.snapshot()
    }

    /// Threshold alerts over a fresh snapshot.
    pub fn alerts(&self) -> Vec<MetricAlert> {
        let alerts = evaluate_metric_alerts(&self.snapshot(), &self.config.alerts);
        for alert in &alerts {
            events::alert_raised(alert);
        }
        alerts
    }

    /// Alerts derived from degradation history.
    pub fn degradation_alerts(&self) -> Vec<DegradationAlert> {
        self.track_degradation();
        evaluate_alerts(&self.tracker())
    }

    /// Dashboard read path, paged by opaque cursor.
    pub fn history(
        &self,
        filter: &RecordFilter,
        range: &TimeRange,
        cursor: Option<&str>,
        limit: usize,
    ) -> VigilResult<PaginatedResult<StoredEntry>> {
        let _span = history_span!(limit).entered();
        self.reader.query_page(filter, range, cursor, limit)
    }

    /// Block until every entry submitted so far is on disk, or `timeout`.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.writer.flush(timeout)
    }

    pub fn health(&self) -> HealthReport {
        self.track_degradation();
        let gauges = self.writer.gauges();
        let pending = self.review.list_pending(usize::MAX);
        let inputs = HealthInputs {
            store_degraded: gauges.is_degraded(),
            degraded_buffered: gauges.degraded_buffered(),
            lost_events: gauges.lost_events(),
            queue_depth: self.writer.queue_len(),
            queue_capacity: self.writer.capacity(),
            writer_running: self.writer.is_running(),
            fallback_count: self.logger.fallback().count(),
            pending_reviews: pending.len(),
            critical_pending_reviews: pending
                .iter()
                .filter(|i| i.priority.tier == RiskLevel::Critical)
                .count(),
        };
        HealthReport::build(&inputs)
    }

    pub fn purge_idle_sessions(&self) -> usize {
        self.logger.purge_idle_sessions()
    }

    /// Stop maintenance and the session sweeper, then drain the write queue
    /// for at most `grace`. Entries still queued at the deadline count as
    /// lost. Later calls return an empty report.
    pub fn shutdown(&self, grace: Duration) -> ShutdownReport {
        if let Some(mut scheduler) = self.scheduler_slot().take() {
            scheduler.stop();
        }
        if let Some(mut sweeper) = self.sweeper_slot().take() {
            sweeper.stop();
        }
        let report = self.writer.shutdown(grace);
        self.sync_lost_events();
        tracing::info!(
            event = "engine_stopped",
            drained = report.drained,
            lost = report.lost,
            "vigil engine stopped"
        );
        report
    }

    /// Shut down with `storage.shutdown_grace_ms`.
    pub fn shutdown_default(&self) -> ShutdownReport {
        self.shutdown(Duration::from_millis(self.config.storage.shutdown_grace_ms))
    }

    fn sync_lost_events(&self) {
        let total = self.writer.gauges().lost_events();
        let known = self.aggregator.lost_events();
        if total > known {
            events::events_lost(total - known, total);
            self.aggregator.set_lost_events(total);
        }
    }

    fn track_degradation(&self) {
        let degraded = self.writer.gauges().is_degraded();
        let mut tracker = self.tracker();
        match (degraded, tracker.is_degraded(STORAGE_COMPONENT)) {
            (true, false) => {
                tracker.enter(
                    STORAGE_COMPONENT,
                    "encryption key unavailable",
                    "in-memory buffer",
                );
            }
            (false, true) => {
                tracker.recover(STORAGE_COMPONENT);
            }
            _ => {}
        }
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradation.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn sweeper_slot(&self) -> MutexGuard<'_, Option<SessionSweeper>> {
        self.sweeper.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn scheduler_slot(&self) -> MutexGuard<'_, Option<MaintenanceScheduler>> {
        self.scheduler.lock().unwrap_or_else(|p| p.into_inner())
    }
}
