//! Run orchestration and weekly aggregation.
//!
//! Weeks are processed strictly sequentially to bound rate-limit pressure;
//! within a week, the eight counting figures fan out concurrently and the
//! first failure abandons the week. No partial weekly record is ever cached:
//! a run either extends the archive with complete weeks or fails before
//! writing anything.

use chrono::{NaiveDate, Utc};

use crate::archive::{ArchiveSource, ArchiveStore, SummaryArchive, write_atomic};
use crate::config::StatsConfig;
use crate::error::Result;
use crate::query::{DatePredicate, SearchQuery};
use crate::render::render_report;
use crate::search::SearchClient;
use crate::summary::WeekSummary;
use crate::window::{WeekWindow, windows_from};

const PRIORITY_P0: &str = "p0";
const PRIORITY_P1: &str = "p1";
const PRIORITY_P2: &str = "p2";

/// What a completed run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Weeks aggregated in this run.
    pub new_weeks: usize,
    /// Weeks in the archive after the run.
    pub total_weeks: usize,
    /// Where the rendered report was written.
    pub report_file: std::path::PathBuf,
}

/// Wires cache, search client, and renderer into one run.
pub struct StatsRunner {
    config: StatsConfig,
    client: SearchClient,
    store: ArchiveStore,
}

impl StatsRunner {
    pub fn new(config: StatsConfig, client: SearchClient) -> Self {
        let store = ArchiveStore::new(config.cache_file.clone());
        Self {
            config,
            client,
            store,
        }
    }

    /// Run against the current date.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_as_of(Utc::now().date_naive()).await
    }

    /// Run as of an explicit date. Split out so tests can pin "today".
    pub async fn run_as_of(&self, today: NaiveDate) -> Result<RunOutcome> {
        let mut archive = self.load_archive();
        let resume = archive.next_unprocessed(self.config.epoch);
        let windows = windows_from(resume, today, self.config.max_windows);
        tracing::info!(
            cached_weeks = archive.len(),
            new_weeks = windows.len(),
            resume = %resume,
            "starting aggregation"
        );

        let new_weeks = windows.len();
        for window in windows {
            tracing::info!(week = %window, "aggregating week");
            let summary = self.week_summary(window).await?;
            archive.push(summary);
        }

        // Report before cache: if the second write fails, the next run merely
        // re-aggregates the same weeks instead of leaving a stale report
        // behind an advanced cache.
        let report = render_report(&self.config.report_title, &archive);
        write_atomic(&self.config.report_file, report.as_bytes())?;
        self.store.save(&archive)?;

        Ok(RunOutcome {
            new_weeks,
            total_weeks: archive.len(),
            report_file: self.config.report_file.clone(),
        })
    }

    fn load_archive(&self) -> SummaryArchive {
        match self.store.load() {
            ArchiveSource::Loaded(archive) => archive,
            ArchiveSource::Missing => {
                tracing::info!(
                    path = %self.store.path().display(),
                    epoch = %self.config.epoch,
                    "no archive yet, starting from epoch"
                );
                SummaryArchive::default()
            }
            ArchiveSource::Corrupt { reason } => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    reason = %reason,
                    "archive unusable, reprocessing from epoch"
                );
                SummaryArchive::default()
            }
        }
    }

    /// Aggregate one window: all eight figures issued concurrently, first
    /// failure abandons the week.
    pub async fn week_summary(&self, window: WeekWindow) -> Result<WeekSummary> {
        let core = &self.config.core_labels;
        let p0 = self.with_priority(PRIORITY_P0);
        let p1 = self.with_priority(PRIORITY_P1);
        let p2 = self.with_priority(PRIORITY_P2);

        // P0 intentionally has only an incoming figure; the report's column
        // set is the consumer contract.
        let (
            open_issues,
            incoming_p0,
            open_p1,
            incoming_p1,
            resolved_p1,
            open_p2,
            incoming_p2,
            resolved_p2,
        ) = tokio::try_join!(
            self.open_issues_at(window.end, core),
            self.incoming_between(window, &p0),
            self.open_issues_at(window.end, &p1),
            self.incoming_between(window, &p1),
            self.resolved_between(window, &p1),
            self.open_issues_at(window.end, &p2),
            self.incoming_between(window, &p2),
            self.resolved_between(window, &p2),
        )?;

        Ok(WeekSummary {
            start: window.start,
            end: window.end,
            open_issues,
            incoming_p0,
            open_p1,
            incoming_p1,
            resolved_p1,
            open_p2,
            incoming_p2,
            resolved_p2,
        })
    }

    /// Issues open as of `date`: everything ever created with the label set,
    /// minus everything closed by then. Reported as-is; a negative result
    /// indicates a tracker data anomaly, not a bug here.
    async fn open_issues_at(&self, date: NaiveDate, labels: &[String]) -> Result<i64> {
        let created = self.query(DatePredicate::CreatedOnOrBefore(date), labels);
        let closed = self.query(DatePredicate::ClosedOnOrBefore(date), labels);
        let (created, closed) =
            tokio::try_join!(self.client.count(&created), self.client.count(&closed))?;
        Ok(created as i64 - closed as i64)
    }

    async fn incoming_between(&self, window: WeekWindow, labels: &[String]) -> Result<i64> {
        let query = self.query(DatePredicate::created_in(window), labels);
        Ok(self.client.count(&query).await? as i64)
    }

    async fn resolved_between(&self, window: WeekWindow, labels: &[String]) -> Result<i64> {
        let query = self.query(DatePredicate::closed_in(window), labels);
        Ok(self.client.count(&query).await? as i64)
    }

    fn query(&self, date: DatePredicate, labels: &[String]) -> SearchQuery {
        SearchQuery::new(self.config.repo.as_str(), date).include_labels(labels.iter().cloned())
    }

    fn with_priority(&self, priority: &str) -> Vec<String> {
        let mut labels = self.config.core_labels.clone();
        labels.push(priority.to_string());
        labels
    }
}
