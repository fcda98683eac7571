//! Weekly issue statistics for a fixed repository.
//!
//! Queries the issue tracker's search API per label set and date window,
//! aggregates weekly open/incoming/resolved counts by priority, caches
//! completed weeks to a JSON archive so re-runs only process new weeks, and
//! renders a markdown table report.
//!
//! Pipeline: load archive → generate remaining windows → aggregate each week
//! (sequentially across weeks, concurrently within one) → write report →
//! persist archive.

pub mod archive;
pub mod config;
pub mod error;
pub mod query;
pub mod render;
pub mod runner;
pub mod search;
pub mod summary;
pub mod window;

pub use archive::{ArchiveSource, ArchiveStore, SummaryArchive};
pub use config::StatsConfig;
pub use error::{Result, StatsError};
pub use query::{DatePredicate, SearchQuery};
pub use render::render_report;
pub use runner::{RunOutcome, StatsRunner};
pub use search::SearchClient;
pub use summary::WeekSummary;
pub use window::{WeekWindow, windows_from};
