//! Weekly summary records.
//!
//! The serialized field names and date encoding mirror the cache schema of
//! the original automation (camelCase `*Issues` names, ISO-8601 UTC midnight
//! date-times), so an archive written by it loads unchanged.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::window::WeekWindow;

/// Issue counts for one seven-day window.
///
/// Counts are `i64`: the open-issue figures are a created-minus-closed
/// difference and tracker anomalies can legitimately drive them negative, in
/// which case they are reported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSummary {
    #[serde(with = "date_compat")]
    pub start: NaiveDate,
    #[serde(with = "date_compat")]
    pub end: NaiveDate,
    #[serde(rename = "openIssues")]
    pub open_issues: i64,
    #[serde(rename = "incomingP0Issues")]
    pub incoming_p0: i64,
    #[serde(rename = "openP1Issues")]
    pub open_p1: i64,
    #[serde(rename = "incomingP1Issues")]
    pub incoming_p1: i64,
    #[serde(rename = "resolvedP1Issues")]
    pub resolved_p1: i64,
    #[serde(rename = "openP2Issues")]
    pub open_p2: i64,
    #[serde(rename = "incomingP2Issues")]
    pub incoming_p2: i64,
    #[serde(rename = "resolvedP2Issues")]
    pub resolved_p2: i64,
}

impl WeekSummary {
    /// The window this summary covers.
    pub fn window(&self) -> WeekWindow {
        WeekWindow {
            start: self.start,
            end: self.end,
        }
    }

    /// Whether `end` is exactly six days after `start`.
    pub fn spans_full_week(&self) -> bool {
        self.end == self.start + Days::new(6)
    }
}

/// Serde adapter for the `start`/`end` fields.
///
/// Serializes a `NaiveDate` as `YYYY-MM-DDT00:00:00Z`; deserializes from
/// either a full ISO-8601 date-time (any offset, e.g. the original cache's
/// `.000Z` form) or a bare `YYYY-MM-DD` date.
pub(crate) mod date_compat {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{date}T00:00:00Z"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.date_naive());
        }
        raw.parse::<NaiveDate>()
            .map_err(|_| de::Error::custom(format!("invalid date value: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn summary() -> WeekSummary {
        WeekSummary {
            start: date("2023-04-15"),
            end: date("2023-04-21"),
            open_issues: 120,
            incoming_p0: 1,
            open_p1: 30,
            incoming_p1: 4,
            resolved_p1: 6,
            open_p2: 80,
            incoming_p2: 9,
            resolved_p2: 7,
        }
    }

    #[test]
    fn serializes_with_original_field_names() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["start"], "2023-04-15T00:00:00Z");
        assert_eq!(json["end"], "2023-04-21T00:00:00Z");
        assert_eq!(json["openIssues"], 120);
        assert_eq!(json["incomingP0Issues"], 1);
        assert_eq!(json["resolvedP2Issues"], 7);
    }

    #[test]
    fn round_trip_preserves_dates_and_counts() {
        let original = summary();
        let json = serde_json::to_string(&original).unwrap();
        let back: WeekSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn accepts_legacy_millisecond_datetimes() {
        let json = r#"{
            "start": "2023-04-15T00:00:00.000Z",
            "end": "2023-04-21T00:00:00.000Z",
            "openIssues": 1,
            "incomingP0Issues": 0,
            "openP1Issues": 0,
            "incomingP1Issues": 0,
            "resolvedP1Issues": 0,
            "openP2Issues": 0,
            "incomingP2Issues": 0,
            "resolvedP2Issues": 0
        }"#;
        let parsed: WeekSummary = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.start, date("2023-04-15"));
        assert_eq!(parsed.end, date("2023-04-21"));
        assert!(parsed.spans_full_week());
    }

    #[test]
    fn accepts_bare_dates() {
        let json = r#"{
            "start": "2023-04-15",
            "end": "2023-04-21",
            "openIssues": 0,
            "incomingP0Issues": 0,
            "openP1Issues": 0,
            "incomingP1Issues": 0,
            "resolvedP1Issues": 0,
            "openP2Issues": 0,
            "incomingP2Issues": 0,
            "resolvedP2Issues": 0
        }"#;
        let parsed: WeekSummary = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.window(), WeekWindow::starting(date("2023-04-15")));
    }

    #[test]
    fn negative_counts_survive_round_trip() {
        let mut s = summary();
        s.open_p2 = -3;
        let json = serde_json::to_string(&s).unwrap();
        let back: WeekSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.open_p2, -3);
    }
}
