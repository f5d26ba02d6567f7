//! [`HallucinationDetector`]: run the four signals, combine, persist, route.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use vigil_core::config::DetectorConfig;
use vigil_core::errors::{VigilError, VigilResult};
use vigil_core::models::{
    EventRecord, Finding, HallucinationAssessment, RetrievedChunk, Signal, SignalScores,
    StoredEntry,
};
use vigil_core::traits::{IEventObserver, IRecordSink, IReviewIntake};
use vigil_observability::assess_span;

use crate::combine::combine;
use crate::signals::contradiction::RuleSet;
use crate::signals::terminology::Vocabulary;
use crate::signals::{confidence, consistency, terminology};

/// The recorded `response` event together with the answer it hashes.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub event: &'a EventRecord,
    pub answer: &'a str,
}

impl<'a> ResponseContext<'a> {
    pub fn new(event: &'a EventRecord, answer: &'a str) -> Self {
        Self { event, answer }
    }
}

/// Raw signal output before combination.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalReport {
    pub scores: SignalScores,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectorStats {
    pub assessed: u64,
    pub flagged: u64,
    pub sink_failures: u64,
    pub intake_failures: u64,
}

pub struct HallucinationDetector {
    config: DetectorConfig,
    rules: RuleSet,
    vocabulary: Vocabulary,
    sink: Option<Arc<dyn IRecordSink>>,
    intake: Option<Arc<dyn IReviewIntake>>,
    observer: Option<Arc<dyn IEventObserver>>,
    assessed: AtomicU64,
    flagged: AtomicU64,
    sink_failures: AtomicU64,
    intake_failures: AtomicU64,
}

impl HallucinationDetector {
    /// Built-in rules, built-in vocabulary plus `extra_vocabulary` and the
    /// optional vocabulary file.
    pub fn new(config: &DetectorConfig) -> VigilResult<Self> {
        config.validate()?;
        let mut vocabulary = Vocabulary::builtin();
        vocabulary.extend(config.extra_vocabulary.iter().map(String::as_str));
        if let Some(path) = &config.vocabulary_path {
            let added = vocabulary.load_file(Path::new(path))?;
            tracing::info!(
                event = "vocabulary_loaded",
                added = added,
                total = vocabulary.len(),
                "controlled vocabulary loaded"
            );
        }

        Ok(Self {
            config: config.clone(),
            rules: RuleSet::builtin(),
            vocabulary,
            sink: None,
            intake: None,
            observer: None,
            assessed: AtomicU64::new(0),
            flagged: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            intake_failures: AtomicU64::new(0),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn IRecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_intake(mut self, intake: Arc<dyn IReviewIntake>) -> Self {
        self.intake = Some(intake);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn IEventObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Run the four signals. No validation, no side effects.
    pub fn score(&self, answer: &str, chunks: &[RetrievedChunk], confidence: f64) -> SignalReport {
        let results = [
            (Signal::Confidence, confidence::evaluate(confidence, self.config.confidence_floor)),
            (
                Signal::SourceConsistency,
                consistency::evaluate(
                    answer,
                    chunks,
                    self.config.min_chunk_relevance,
                    self.config.claim_support_ratio,
                ),
            ),
            (Signal::Contradiction, self.rules.evaluate(answer)),
            (Signal::Terminology, terminology::evaluate(answer, &self.vocabulary)),
        ];

        let mut scores = SignalScores::default();
        let mut findings = Vec::new();
        for (signal, result) in results {
            scores.set(signal, result.score);
            findings.extend(result.findings);
        }
        SignalReport { scores, findings }
    }

    /// Assess one recorded response.
    ///
    /// Rejects a context whose event is not a `response`, whose content hash
    /// does not match the answer, or a confidence outside [0, 1]. Persistence
    /// and review routing failures are logged and counted, never returned.
    pub fn assess(
        &self,
        ctx: &ResponseContext<'_>,
        chunks: &[RetrievedChunk],
        confidence: f64,
    ) -> VigilResult<HallucinationAssessment> {
        let _span = assess_span!(ctx.event.event_id).entered();
        validate(ctx, confidence)?;

        let report = self.score(ctx.answer, chunks, confidence);
        let combination = combine(&report.scores, &self.config);
        let flagged = combination.risk_level >= self.config.flag_threshold;

        let assessment = HallucinationAssessment {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            response_event_id: ctx.event.event_id.clone(),
            session_id: ctx.event.session_id.clone(),
            risk_level: combination.risk_level,
            signal_scores: report.scores,
            weighted_mean: combination.weighted_mean,
            triggered_by: combination.triggered_by,
            findings: report.findings,
            flagged,
            created_at: Utc::now(),
        };

        self.assessed.fetch_add(1, Ordering::Relaxed);
        if flagged {
            self.flagged.fetch_add(1, Ordering::Relaxed);
        }
        tracing::info!(
            event = "response_assessed",
            assessment_id = %assessment.assessment_id,
            risk_level = %assessment.risk_level,
            weighted_mean = assessment.weighted_mean,
            flagged = flagged,
            findings = assessment.findings.len(),
            "response assessed"
        );

        self.route(&assessment);
        Ok(assessment)
    }

    fn route(&self, assessment: &HallucinationAssessment) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.submit(StoredEntry::Assessment(assessment.clone())) {
                self.sink_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    event = "assessment_persist_failed",
                    assessment_id = %assessment.assessment_id,
                    error = %e,
                    "assessment not persisted"
                );
            }
        }

        if let Some(observer) = &self.observer {
            if let Err(e) = observer.observe_assessment(assessment) {
                tracing::warn!(event = "assessment_observe_failed", error = %e, "observer rejected assessment");
            }
        }

        if !assessment.flagged {
            return;
        }
        if let Some(intake) = &self.intake {
            match intake.enqueue(assessment) {
                Ok(item_id) => tracing::info!(
                    event = "review_enqueued",
                    assessment_id = %assessment.assessment_id,
                    item_id = %item_id,
                    "flagged response queued for review"
                ),
                Err(e) => {
                    self.intake_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        event = "review_enqueue_failed",
                        assessment_id = %assessment.assessment_id,
                        error = %e,
                        "flagged response not queued"
                    );
                }
            }
        }
    }

    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            assessed: self.assessed.load(Ordering::Relaxed),
            flagged: self.flagged.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            intake_failures: self.intake_failures.load(Ordering::Relaxed),
        }
    }
}

fn validate(ctx: &ResponseContext<'_>, confidence: f64) -> VigilResult<()> {
    if !ctx.event.is_response() {
        return Err(VigilError::validation(format!(
            "cannot assess a {} event",
            ctx.event.stage
        )));
    }
    match &ctx.event.content_hash {
        Some(hash) if hash.matches(ctx.answer) => {}
        Some(_) => return Err(VigilError::validation("answer does not match the recorded content hash")),
        None => return Err(VigilError::validation("response event carries no content hash")),
    }
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(VigilError::validation(format!("confidence {confidence} outside [0, 1]")));
    }
    Ok(())
}
