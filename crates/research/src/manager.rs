//! The research pipeline: plan → search → write → deliver.
//!
//! [`ResearchManager::run`] spawns the pipeline and hands back a channel of
//! progress events. Stages run one after another; only the search stage
//! fans out, capped by a semaphore that belongs to the run.

use std::sync::Arc;
use std::time::Duration;
use parley_config::AppConfig;
use parley_core::delivery::MailSink;
use parley_core::provider::Provider;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, debug_span, info, info_span, warn};
use crate::error::ResearchError;
use crate::event::ResearchEvent;
use crate::model::{ReportData, SearchItem, SearchPlan};
use crate::roles::{LlmMailer, LlmPlanner, LlmSearcher, LlmWriter, Mailer, Planner, Searcher, Writer};

/// Default cap on searches in flight at once.
pub const DEFAULT_MAX_PARALLEL_SEARCHES: usize = 5;

type EventSender = mpsc::Sender<Result<ResearchEvent, ResearchError>>;

/// Tunables for one manager.
#[derive(Debug, Clone)]
pub struct ResearchSettings {
    pub max_parallel_searches: usize,
    pub search_timeout: Option<Duration>,
    pub trace_url_prefix: Option<String>,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_parallel_searches: DEFAULT_MAX_PARALLEL_SEARCHES,
            search_timeout: None,
            trace_url_prefix: None,
        }
    }
}

/// Orchestrates the four research roles.
///
/// Cheap to clone; each [`run`](Self::run) gets its own semaphore and
/// task set, so concurrent runs share nothing mutable.
#[derive(Clone)]
pub struct ResearchManager {
    planner: Arc<dyn Planner>,
    searcher: Arc<dyn Searcher>,
    writer: Arc<dyn Writer>,
    mailer: Arc<dyn Mailer>,
    settings: ResearchSettings,
}

impl ResearchManager {
    pub fn new(
        planner: Arc<dyn Planner>,
        searcher: Arc<dyn Searcher>,
        writer: Arc<dyn Writer>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            planner,
            searcher,
            writer,
            mailer,
            settings: ResearchSettings::default(),
        }
    }

    /// Wire the LLM-backed roles from config.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        mail_sink: Arc<dyn MailSink>,
    ) -> Self {
        let research = &config.research;
        let planner = LlmPlanner::new(
            provider.clone(),
            &config.default_model,
            research.how_many_searches,
        )
        .with_temperature(config.default_temperature);
        let searcher = LlmSearcher::new(
            provider.clone(),
            &research.search_model,
            research.search_context_size,
        );
        let writer = LlmWriter::new(provider.clone(), &config.default_model)
            .with_temperature(config.default_temperature);
        let mailer = LlmMailer::new(provider, &config.default_model, mail_sink, config.mail.on_failure)
            .with_addresses(config.mail.from.clone(), config.mail.to.clone())
            .with_temperature(config.default_temperature);

        Self::new(
            Arc::new(planner),
            Arc::new(searcher),
            Arc::new(writer),
            Arc::new(mailer),
        )
        .with_settings(ResearchSettings {
            max_parallel_searches: research.max_parallel_searches,
            search_timeout: research.search_timeout_secs.map(Duration::from_secs),
            trace_url_prefix: research.trace_url_prefix.clone(),
        })
    }

    pub fn with_settings(mut self, settings: ResearchSettings) -> Self {
        self.settings = ResearchSettings {
            max_parallel_searches: settings.max_parallel_searches.max(1),
            ..settings
        };
        self
    }

    pub fn with_max_parallel_searches(mut self, max: usize) -> Self {
        self.settings.max_parallel_searches = max.max(1);
        self
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.settings.search_timeout = Some(timeout);
        self
    }

    pub fn settings(&self) -> &ResearchSettings {
        &self.settings
    }

    /// Start a run and return its progress stream.
    ///
    /// The stream yields the trace event first and, on success, the report
    /// last. A stage failure arrives as a final `Err`. Dropping the receiver
    /// cancels the run, including searches still in flight.
    pub fn run(&self, query: impl Into<String>) -> mpsc::Receiver<Result<ResearchEvent, ResearchError>> {
        let (tx, rx) = mpsc::channel(32);
        let manager = self.clone();
        let query = query.into();
        let trace_id = uuid::Uuid::new_v4().simple().to_string();
        let span = info_span!("research", trace_id = %trace_id);

        tokio::spawn(
            async move {
                tokio::select! {
                    _ = tx.closed() => {
                        info!("Progress stream dropped, cancelling research run");
                    }
                    outcome = manager.drive(&query, &trace_id, &tx) => {
                        if let Err(e) = outcome {
                            warn!(stage = e.stage(), error = %e, "Research run failed");
                            let _ = tx.send(Err(e)).await;
                        }
                    }
                }
            }
            .instrument(span),
        );

        rx
    }

    async fn drive(&self, query: &str, trace_id: &str, tx: &EventSender) -> Result<(), ResearchError> {
        emit(
            tx,
            ResearchEvent::trace(trace_id, self.settings.trace_url_prefix.as_deref()),
        )
        .await;
        info!("Starting research");

        let plan = self.plan_searches(query).await?;
        emit(tx, ResearchEvent::progress("Searches planned, starting to search...")).await;

        let results = self.search_all(&plan, Some(tx)).await;
        emit(tx, ResearchEvent::progress("Searches complete, writing report...")).await;

        let report = self.write_report(query, &results).await?;
        emit(tx, ResearchEvent::progress("Report written, sending email...")).await;

        self.send_email(&report).await?;
        emit(tx, ResearchEvent::progress("Email sent, research complete")).await;

        emit(tx, ResearchEvent::Report { report }).await;
        Ok(())
    }

    /// Ask the planner for searches.
    pub async fn plan_searches(&self, query: &str) -> Result<SearchPlan, ResearchError> {
        info!("Planning searches");
        let plan = self.planner.plan(query).await.map_err(ResearchError::plan)?;
        info!(count = plan.searches.len(), "Will perform searches");
        Ok(plan)
    }

    /// Run every planned search and return the summaries that came back,
    /// in completion order. Failed searches are left out.
    pub async fn perform_searches(&self, plan: &SearchPlan) -> Vec<String> {
        self.search_all(plan, None).await
    }

    async fn search_all(&self, plan: &SearchPlan, progress: Option<&EventSender>) -> Vec<String> {
        let total = plan.searches.len();
        let permits = Arc::new(Semaphore::new(self.settings.max_parallel_searches));
        let mut tasks = JoinSet::new();

        info!(total, cap = self.settings.max_parallel_searches, "Searching");
        for (index, item) in plan.searches.iter().cloned().enumerate() {
            let permits = permits.clone();
            let searcher = self.searcher.clone();
            let timeout = self.settings.search_timeout;
            tasks.spawn(
                async move {
                    let _permit = permits.acquire_owned().await.ok()?;
                    bounded_search(searcher.as_ref(), &item, timeout).await
                }
                .instrument(debug_span!("search", index)),
            );
        }

        let mut results = Vec::with_capacity(total);
        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            match joined {
                Ok(Some(text)) => results.push(text),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Search task did not finish"),
            }
            debug!(completed, total, "Search finished");
            if let Some(tx) = progress {
                emit(
                    tx,
                    ResearchEvent::progress(format!("Searching... {completed}/{total} completed")),
                )
                .await;
            }
        }

        info!(succeeded = results.len(), total, "Finished searching");
        results
    }

    /// Ask the writer for the report.
    pub async fn write_report(&self, query: &str, search_results: &[String]) -> Result<ReportData, ResearchError> {
        info!(summaries = search_results.len(), "Writing report");
        self.writer
            .write(query, search_results)
            .await
            .map_err(ResearchError::write)
    }

    /// Hand the report to the mailer.
    pub async fn send_email(&self, report: &ReportData) -> Result<(), ResearchError> {
        info!("Sending email");
        self.mailer.deliver(report).await.map_err(ResearchError::deliver)
    }
}

/// One search under the run's limits. Any failure, timeout or empty answer
/// is `None`.
async fn bounded_search(
    searcher: &dyn Searcher,
    item: &SearchItem,
    timeout: Option<Duration>,
) -> Option<String> {
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, searcher.search(item))
            .await
            .unwrap_or(Err(ResearchError::SearchTimeout(limit))),
        None => searcher.search(item).await,
    };

    match result {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!(query = %item.query, "Search returned no text");
            None
        }
        Err(e) => {
            warn!(query = %item.query, error = %e, "Search failed");
            None
        }
    }
}

async fn emit(tx: &EventSender, event: ResearchEvent) {
    if tx.send(Ok(event)).await.is_err() {
        debug!("Progress receiver gone");
    }
}
