//! Seven-day reporting windows.
//!
//! A window covers `[start, start + 6]`, both ends inclusive. Window
//! generation is a pure function of the resume date and "today", so runs are
//! reproducible and windows never straddle the current, incomplete week.

use chrono::{Days, NaiveDate};

/// Upper bound on windows generated per run.
pub const DEFAULT_MAX_WINDOWS: usize = 52;

/// An inclusive seven-day date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// The window beginning at `start`, ending six days later.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    /// The first date after this window.
    pub fn next_start(&self) -> NaiveDate {
        self.end + Days::new(1)
    }
}

impl std::fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Generate up to `max` consecutive windows from `start`, stopping at the
/// first window that has not fully elapsed (its end on or after `today`).
/// The window containing `today` is therefore never produced, so no summary
/// ever covers a partial week.
///
/// Dates are day-granular (`NaiveDate`), so no midnight normalization is
/// required when comparing against `today`.
pub fn windows_from(start: NaiveDate, today: NaiveDate, max: usize) -> Vec<WeekWindow> {
    let mut windows = Vec::new();
    let mut cursor = start;
    while windows.len() < max {
        let window = WeekWindow::starting(cursor);
        if window.end >= today {
            break;
        }
        cursor = window.next_start();
        windows.push(window);
    }
    windows
}
