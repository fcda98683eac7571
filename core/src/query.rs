//! Issue search query construction.
//!
//! Builds query strings in the GitHub issue-search grammar. The exact shape
//! is a compatibility contract with the tracker: segments joined by literal
//! `+`, comma-joined label lists (comma = AND), ISO dates with no time
//! component.

use chrono::NaiveDate;

use crate::window::WeekWindow;

/// Date constraint of a counting query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePredicate {
    /// `created:<=D`
    CreatedOnOrBefore(NaiveDate),
    /// `closed:<=D`
    ClosedOnOrBefore(NaiveDate),
    /// `created:S..E`, inclusive both ends
    CreatedBetween(NaiveDate, NaiveDate),
    /// `closed:S..E`, inclusive both ends
    ClosedBetween(NaiveDate, NaiveDate),
}

impl DatePredicate {
    /// Issues created within `window`.
    pub fn created_in(window: WeekWindow) -> Self {
        Self::CreatedBetween(window.start, window.end)
    }

    /// Issues closed within `window`.
    pub fn closed_in(window: WeekWindow) -> Self {
        Self::ClosedBetween(window.start, window.end)
    }

    fn clause(&self) -> String {
        match self {
            Self::CreatedOnOrBefore(d) => format!("created:<={d}"),
            Self::ClosedOnOrBefore(d) => format!("closed:<={d}"),
            Self::CreatedBetween(s, e) => format!("created:{s}..{e}"),
            Self::ClosedBetween(s, e) => format!("closed:{s}..{e}"),
        }
    }
}

/// A fully-specified counting query against a fixed repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    repo: String,
    date: DatePredicate,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl SearchQuery {
    pub fn new(repo: impl Into<String>, date: DatePredicate) -> Self {
        Self {
            repo: repo.into(),
            date,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Require every listed label on matching issues.
    pub fn include_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Exclude issues carrying any of the listed labels.
    pub fn exclude_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Render the query in the tracker's search grammar.
    pub fn to_query_string(&self) -> String {
        format!(
            "type:issue+repo:{}+{}{}{}",
            self.repo,
            self.date.clause(),
            include_clause(&self.include),
            exclude_clause(&self.exclude),
        )
    }
}

fn include_clause(labels: &[String]) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("+label:{}", labels.join(","))
    }
}

fn exclude_clause(labels: &[String]) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("+-label:{}", labels.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn created_range_query() {
        let q = SearchQuery::new(
            "aws/aws-cdk",
            DatePredicate::CreatedBetween(date("2023-04-15"), date("2023-04-21")),
        );
        assert_eq!(
            q.to_query_string(),
            "type:issue+repo:aws/aws-cdk+created:2023-04-15..2023-04-21"
        );
    }

    #[test]
    fn closed_on_or_before_with_labels() {
        let q = SearchQuery::new(
            "aws/aws-cdk",
            DatePredicate::ClosedOnOrBefore(date("2023-04-21")),
        )
        .include_labels(["cli", "p1"]);
        assert_eq!(
            q.to_query_string(),
            "type:issue+repo:aws/aws-cdk+closed:<=2023-04-21+label:cli,p1"
        );
    }

    #[test]
    fn include_labels_are_comma_joined() {
        let q = SearchQuery::new("o/r", DatePredicate::CreatedOnOrBefore(date("2023-01-01")))
            .include_labels(["a", "b"]);
        assert!(q.to_query_string().ends_with("+label:a,b"));
    }

    #[test]
    fn empty_label_sets_add_no_clause() {
        let q = SearchQuery::new("o/r", DatePredicate::CreatedOnOrBefore(date("2023-01-01")))
            .include_labels(Vec::<String>::new())
            .exclude_labels(Vec::<String>::new());
        assert_eq!(q.to_query_string(), "type:issue+repo:o/r+created:<=2023-01-01");
    }

    #[test]
    fn exclude_labels_are_negated() {
        let q = SearchQuery::new("o/r", DatePredicate::CreatedOnOrBefore(date("2023-01-01")))
            .exclude_labels(["wontfix", "duplicate"]);
        assert!(q.to_query_string().ends_with("+-label:wontfix,duplicate"));
    }

    #[test]
    fn window_predicates_cover_both_ends() {
        let window = WeekWindow::starting(date("2023-04-15"));
        assert_eq!(
            DatePredicate::created_in(window),
            DatePredicate::CreatedBetween(date("2023-04-15"), date("2023-04-21"))
        );
        assert_eq!(
            DatePredicate::closed_in(window),
            DatePredicate::ClosedBetween(date("2023-04-15"), date("2023-04-21"))
        );
    }
}
