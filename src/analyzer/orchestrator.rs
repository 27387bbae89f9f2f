//! Audit orchestration - fetch, fan out to checkers, fold into a report
//!
//! This module contains the run loop that coordinates one audit:
//! - Fetching and parsing the main page
//! - Running every checker concurrently under one deadline
//! - Converting checker errors, panics and timeouts into failed categories
//! - Aggregating the weighted report

use crate::analyzer::state::{RunState, RunTracker};
use crate::checks::{default_checkers, Checker, PageContext};
use crate::config::{validate, AuditConfig};
use crate::document::Document;
use crate::fetcher::{FetchFailure, Fetcher};
use crate::report::{assemble_report, failure_report, Category, CheckResult, Report};
use crate::url::AnalysisTarget;
use crate::{AuditError, UrlResult};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};

/// Runs audits and always produces a [`Report`]
///
/// One analyzer can serve many runs; they share its request limiter, so
/// the configured concurrency cap holds across all of them.
pub struct Analyzer {
    config: AuditConfig,
    limiter: Arc<Semaphore>,
    checkers: Vec<Box<dyn Checker>>,
}

impl Analyzer {
    /// Creates an analyzer with the standard checker set
    ///
    /// # Arguments
    ///
    /// * `config` - The audit configuration (validated here)
    ///
    /// # Returns
    ///
    /// * `Ok(Analyzer)` - Ready to run audits
    /// * `Err(AuditError)` - Invalid configuration
    pub fn new(config: AuditConfig) -> crate::Result<Self> {
        let checkers = default_checkers(&config)?;
        Self::with_checkers(config, checkers)
    }

    /// Creates an analyzer with a custom checker set
    ///
    /// A category no checker covers is reported as failed. If two checkers
    /// claim the same category, the first one listed wins.
    pub fn with_checkers(config: AuditConfig, checkers: Vec<Box<dyn Checker>>) -> crate::Result<Self> {
        validate(&config)?;

        let limiter = Arc::new(Semaphore::new(config.fetcher.concurrency_limit));

        Ok(Self {
            config,
            limiter,
            checkers,
        })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// The request limiter shared by every run
    pub fn limiter(&self) -> &Arc<Semaphore> {
        &self.limiter
    }

    /// Normalizes `url` and audits it
    ///
    /// Only URL validation can fail; everything after that is reported
    /// inside the returned [`Report`].
    pub async fn analyze_url(&self, url: &str) -> UrlResult<Report> {
        let target = AnalysisTarget::parse(url)?;
        Ok(self.analyze(target).await)
    }

    /// Audits one page
    ///
    /// # Lifecycle
    ///
    /// The run budget (`run-timeout-ms`) starts here and covers every phase.
    ///
    /// 1. `Fetching`: fetch and parse the main page. Failure here, or
    ///    running out of budget, ends the run with a full-failure report
    ///    (every category 0).
    /// 2. `Checking`: run all checkers concurrently. Each is isolated: an
    ///    error, panic or the run deadline degrades only its own category.
    /// 3. `Aggregating`: weighted score and deduplicated recommendations.
    pub async fn analyze(&self, target: AnalysisTarget) -> Report {
        let mut run = RunTracker::new();
        let run_timeout = self.config.run.run_timeout();
        let deadline = Instant::now() + run_timeout;
        tracing::info!("Starting analysis of {}", target);

        step(&mut run, RunState::Fetching);
        let fetcher = match Fetcher::new(&self.config.fetcher, self.limiter.clone()) {
            Ok(fetcher) => fetcher,
            Err(e) => return self.abort(&mut run, &target, &AuditError::from(e)),
        };
        tracing::debug!("Session user agent: {}", fetcher.user_agent());

        let document = match timeout_at(deadline, fetch_document(&fetcher, &target)).await {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => return self.abort(&mut run, &target, &e),
            Err(_) => {
                let exhausted = FetchFailure::Timeout {
                    detail: format!("run budget of {}ms exhausted", run_timeout.as_millis()),
                };
                return self.abort(&mut run, &target, &AuditError::from(exhausted));
            }
        };

        step(&mut run, RunState::Checking);
        let ctx = PageContext {
            target: &target,
            document: &document,
            fetcher: &fetcher,
            deadline,
        };
        let results = self.run_checkers(&ctx).await;

        step(&mut run, RunState::Aggregating);
        let report = assemble_report(&target, &self.config.weights, results);
        for (category, result) in report.categories() {
            tracing::info!(
                "{} score: {:.2} ({} issues)",
                category,
                result.score,
                result.issues.len()
            );
        }

        step(&mut run, RunState::Done);
        tracing::info!(
            "Analysis of {} complete: overall score {:.2}",
            target,
            report.overall_score
        );
        report
    }

    /// Runs every checker concurrently against the run deadline
    async fn run_checkers(&self, ctx: &PageContext<'_>) -> HashMap<Category, CheckResult> {
        let run_timeout = self.config.run.run_timeout();
        let deadline = ctx.deadline;

        let runs = self.checkers.iter().map(|checker| async move {
            let category = checker.category();
            let guarded = AssertUnwindSafe(checker.analyze(ctx)).catch_unwind();

            let result = match timeout_at(deadline, guarded).await {
                Ok(Ok(Ok(result))) => result,
                Ok(Ok(Err(e))) => degrade(category, e.to_string()),
                Ok(Err(panic)) => degrade(category, panic_message(panic.as_ref())),
                Err(_) => degrade(
                    category,
                    format!("timed out after {}ms", run_timeout.as_millis()),
                ),
            };
            (category, result)
        });

        let mut results = HashMap::new();
        for (category, result) in join_all(runs).await {
            if results.contains_key(&category) {
                tracing::warn!("Ignoring duplicate {} checker result", category);
                continue;
            }
            results.insert(category, result);
        }
        results
    }

    /// Ends the run with a full-failure report
    fn abort(&self, run: &mut RunTracker, target: &AnalysisTarget, error: &AuditError) -> Report {
        let detail = match error {
            AuditError::Fetch(failure) => failure.to_string(),
            AuditError::Document(e) => e.to_string(),
            other => other.to_string(),
        };

        tracing::error!("Failed to access {}: {}", target, detail);
        step(run, RunState::Failed);
        failure_report(target, &detail)
    }
}

/// Fetches the main page and parses it
async fn fetch_document(fetcher: &Fetcher, target: &AnalysisTarget) -> crate::Result<Document> {
    let body = fetcher.fetch(target.as_str()).await.into_body()?;
    Ok(Document::parse(&body)?)
}

/// Advances the run state; an illegal transition is a bug and only logged
fn step(run: &mut RunTracker, next: RunState) {
    if let Err(e) = run.advance(next) {
        tracing::error!("{}", e);
    }
}

/// Converts a checker failure into that category's zero-score result
fn degrade(category: Category, reason: String) -> CheckResult {
    let text = format!("Analysis failed: {}", reason);
    tracing::warn!("{}", AuditError::CheckerFailure { category, reason });
    CheckResult::failed(text, None)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("checker panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("checker panicked: {}", message)
    } else {
        "checker panicked".to_string()
    }
}
