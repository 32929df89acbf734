//! Batch Orchestrator: fans one screening task per document out over a
//! bounded worker pool and folds the outcomes into a `ScreeningReport`.
//!
//! Per document: extract (spawn_blocking) → model call → parse → record.
//! A failure at any stage, including a panic, is logged and reported for that
//! document only. Siblings keep running and the run always returns a report.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::llm_client::prompts::{assessment_parts, prompt_for, summary_parts};
use crate::llm_client::{LlmError, ModelClient};
use crate::models::resume::ResumeDocument;
use crate::models::screening::{Action, FileFailure, ResultRecord, ScreeningReport, Stage};
use crate::screening::extract::{extract_pdf_text, panic_message, ExtractError};
use crate::screening::parser::{FitAssessment, ParseError, PercentageMatch, StructuredReply, Verdict};

type Extractor = fn(&[u8]) -> Result<String, ExtractError>;

/// Explicit per-run configuration. Nothing is read from ambient state.
#[derive(Debug, Clone)]
pub struct ScreeningRequest {
    pub action: Action,
    pub job_description: Option<String>,
}

/// Problems with the request itself. Reported to the user, nothing is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please provide the Job Description")]
    MissingJobDescription,

    #[error("Please upload at least one resume")]
    NoDocuments,
}

impl ScreeningRequest {
    /// Checked before any input is fetched, so a missing JD never triggers a download.
    pub fn check_job_description(&self) -> Result<(), InputError> {
        let has_jd = self
            .job_description
            .as_deref()
            .is_some_and(|jd| !jd.trim().is_empty());
        if self.action.requires_job_description() && !has_jd {
            return Err(InputError::MissingJobDescription);
        }
        Ok(())
    }

    pub fn validate(&self, documents: &[ResumeDocument]) -> Result<(), InputError> {
        self.check_job_description()?;
        if documents.is_empty() {
            return Err(InputError::NoDocuments);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Extraction(#[from] ExtractError),

    #[error("{0}")]
    Model(#[from] LlmError),

    #[error("{0}")]
    Parsing(#[from] ParseError),

    #[error("worker pool closed")]
    PoolClosed,
}

impl TaskError {
    pub fn stage(&self) -> Stage {
        match self {
            TaskError::Extraction(_) => Stage::Extraction,
            TaskError::Model(_) => Stage::Model,
            TaskError::Parsing(_) => Stage::Parsing,
            TaskError::PoolClosed => Stage::Task,
        }
    }
}

/// Runs screening actions against a model with at most `concurrency`
/// documents in flight.
#[derive(Clone)]
pub struct BatchRunner {
    model: Arc<dyn ModelClient>,
    concurrency: usize,
    extractor: Extractor,
}

impl BatchRunner {
    pub fn new(model: Arc<dyn ModelClient>, concurrency: usize) -> Self {
        Self {
            model,
            concurrency: concurrency.max(1),
            extractor: extract_pdf_text,
        }
    }

    #[cfg(test)]
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Validates the request, then screens every document.
    ///
    /// Only request-level problems are errors. Per-document failures land in
    /// `ScreeningReport::failures`.
    pub async fn run(
        &self,
        request: &ScreeningRequest,
        documents: Vec<ResumeDocument>,
    ) -> Result<ScreeningReport, InputError> {
        request.validate(&documents)?;

        let run_id = Uuid::new_v4();
        let action = request.action;
        let total = documents.len();
        let job_description: Option<Arc<str>> = request.job_description.as_deref().map(Arc::from);

        info!(
            "Screening run {run_id}: action={action}, files={total}, concurrency={}",
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut pending = FuturesUnordered::new();

        for document in documents {
            let semaphore = semaphore.clone();
            let model = self.model.clone();
            let job_description = job_description.clone();
            let extractor = self.extractor;
            let file_name = document.file_name.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Err(TaskError::PoolClosed);
                };
                screen_document(
                    model.as_ref(),
                    extractor,
                    action,
                    job_description.as_deref(),
                    document,
                )
                .await
            });
            pending.push(AbortOnDrop(handle).map(move |joined| (file_name, joined)));
        }

        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut excluded = 0;

        while let Some((file_name, joined)) = pending.next().await {
            match joined {
                Ok(Ok(Some(record))) => {
                    debug!("Screened {file_name}");
                    records.push(record);
                }
                Ok(Ok(None)) => {
                    debug!("Excluded {file_name}: not relatable");
                    excluded += 1;
                }
                Ok(Err(e)) => {
                    warn!("Skipping {file_name}: {} failed: {e}", e.stage());
                    failures.push(FileFailure {
                        file_name,
                        stage: e.stage(),
                        message: e.to_string(),
                    });
                }
                Err(join_error) => {
                    let message = if join_error.is_panic() {
                        panic_message(join_error.into_panic())
                    } else {
                        join_error.to_string()
                    };
                    error!("Task for {file_name} aborted: {message}");
                    failures.push(FileFailure {
                        file_name,
                        stage: Stage::Task,
                        message,
                    });
                }
            }
        }

        let report = ScreeningReport {
            run_id,
            action,
            generated_at: Utc::now(),
            total,
            records,
            failures,
            excluded,
        };

        info!(
            "Screening run {run_id} complete: records={}, failures={}, excluded={}",
            report.records.len(),
            report.failures.len(),
            report.excluded
        );

        Ok(report)
    }
}

/// Spawned task handle that aborts the task when dropped. If the caller stops
/// polling `run` (client disconnect), outstanding model calls are cancelled.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Screens one document. `Ok(None)` means the filter action excluded it.
async fn screen_document(
    model: &dyn ModelClient,
    extractor: Extractor,
    action: Action,
    job_description: Option<&str>,
    document: ResumeDocument,
) -> Result<Option<ResultRecord>, TaskError> {
    let ResumeDocument { file_name, bytes } = document;

    let extracted = tokio::task::spawn_blocking(move || extractor(&bytes))
        .await
        .map_err(|e| {
            let message = if e.is_panic() {
                panic_message(e.into_panic())
            } else {
                e.to_string()
            };
            ExtractError::Panicked(message)
        })?;
    let resume_text = extracted?;

    let job_description = job_description.unwrap_or_default();

    let record = match action {
        Action::Summary => {
            let reply = model.generate(&summary_parts(&resume_text)).await?;
            ResultRecord::Summary {
                file_name,
                response: reply.trim().to_string(),
            }
        }
        Action::PercentageMatch => {
            let parts = assessment_parts(prompt_for(action), job_description, &resume_text);
            let reply = model.generate(&parts).await?;
            let parsed = PercentageMatch::parse(&reply)?;
            ResultRecord::PercentageMatch {
                file_name,
                percentage_match: parsed.percentage,
                keywords_missing: parsed.keywords_missing,
                final_thoughts: parsed.final_thoughts,
            }
        }
        Action::FitForRole => {
            let parts = assessment_parts(prompt_for(action), job_description, &resume_text);
            let reply = model.generate(&parts).await?;
            let parsed = FitAssessment::parse(&reply)?;
            ResultRecord::FitForRole {
                file_name,
                status: parsed.is_relatable,
                reason: parsed.reason,
            }
        }
        Action::Filter => {
            let parts = assessment_parts(prompt_for(action), job_description, &resume_text);
            let reply = model.generate(&parts).await?;
            let parsed = FitAssessment::parse(&reply)?;
            if parsed.is_relatable != Verdict::Yes {
                return Ok(None);
            }
            ResultRecord::Filter {
                file_name,
                reason: parsed.reason,
            }
        }
    };

    Ok(Some(record))
}
