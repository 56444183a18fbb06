use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` pair of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar week (Sunday through Saturday) that contains `today`.
    pub fn current_week(today: NaiveDate) -> Self {
        let end = saturday_on_or_after(today);
        Self {
            start: end - Duration::days(6),
            end,
        }
    }

    /// Two full weeks ending on the Saturday on or after `latest`.
    pub fn two_weeks_ending(latest: NaiveDate) -> Self {
        let end = saturday_on_or_after(latest);
        Self {
            start: end - Duration::days(13),
            end,
        }
    }
}

/// How a page seeds its date range when the user has not chosen one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultWindow {
    CurrentWeek,
    TwoWeeksToLatest,
}

impl DefaultWindow {
    /// `latest` is the newest record date; when the dataset is empty the
    /// two-week window is anchored on `today` instead.
    pub fn resolve(&self, today: NaiveDate, latest: Option<NaiveDate>) -> DateRange {
        match self {
            DefaultWindow::CurrentWeek => DateRange::current_week(today),
            DefaultWindow::TwoWeeksToLatest => DateRange::two_weeks_ending(latest.unwrap_or(today)),
        }
    }
}

/// The raw bounds a user submitted; either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No bound supplied, the caller should fall back to a remembered or default range.
    Unset,
    /// Only one bound supplied.
    Incomplete,
    Complete(DateRange),
    /// Both bounds supplied with `start > end`.
    Inverted,
}

impl DateSelection {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn state(&self) -> SelectionState {
        match (self.start, self.end) {
            (None, None) => SelectionState::Unset,
            (Some(start), Some(end)) => match DateRange::new(start, end) {
                Some(range) => SelectionState::Complete(range),
                None => SelectionState::Inverted,
            },
            _ => SelectionState::Incomplete,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn ordered_days(&self) -> [Weekday; 7] {
        use Weekday::*;
        match self {
            WeekStart::Sunday => [Sun, Mon, Tue, Wed, Thu, Fri, Sat],
            WeekStart::Monday => [Mon, Tue, Wed, Thu, Fri, Sat, Sun],
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn saturday_on_or_after(date: NaiveDate) -> NaiveDate {
    let from_sunday = date.weekday().num_days_from_sunday() as i64;
    date + Duration::days(6 - from_sunday)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn current_week_runs_sunday_to_saturday() {
        // 2024-03-13 is a Wednesday.
        let range = DateRange::current_week(d(2024, 3, 13));
        assert_eq!(range.start, d(2024, 3, 10));
        assert_eq!(range.end, d(2024, 3, 16));
        assert_eq!(range.start.weekday(), Weekday::Sun);
        assert_eq!((range.end - range.start).num_days(), 6);
    }

    #[test]
    fn current_week_on_boundaries() {
        let sunday = d(2024, 3, 10);
        assert_eq!(DateRange::current_week(sunday).start, sunday);
        let saturday = d(2024, 3, 16);
        assert_eq!(DateRange::current_week(saturday).end, saturday);
    }

    #[test]
    fn two_weeks_end_on_saturday_after_latest() {
        let range = DateRange::two_weeks_ending(d(2024, 3, 13));
        assert_eq!(range.end, d(2024, 3, 16));
        assert_eq!(range.start, d(2024, 3, 3));
        assert_eq!((range.end - range.start).num_days(), 13);

        let on_saturday = DateRange::two_weeks_ending(d(2024, 3, 16));
        assert_eq!(on_saturday.end, d(2024, 3, 16));
    }

    #[test]
    fn default_window_without_records_uses_today() {
        let today = d(2024, 3, 13);
        let range = DefaultWindow::TwoWeeksToLatest.resolve(today, None);
        assert_eq!(range, DateRange::two_weeks_ending(today));
    }

    #[test]
    fn range_contains_both_bounds() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 7)).unwrap();
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 1, 7)));
        assert!(!range.contains(d(2023, 12, 31)));
        assert!(!range.contains(d(2024, 1, 8)));
    }

    #[test]
    fn selection_states() {
        let a = d(2024, 1, 1);
        let b = d(2024, 1, 7);
        assert_eq!(DateSelection::new(None, None).state(), SelectionState::Unset);
        assert_eq!(DateSelection::new(Some(a), None).state(), SelectionState::Incomplete);
        assert_eq!(DateSelection::new(None, Some(b)).state(), SelectionState::Incomplete);
        assert_eq!(DateSelection::new(Some(b), Some(a)).state(), SelectionState::Inverted);
        assert_eq!(
            DateSelection::new(Some(a), Some(b)).state(),
            SelectionState::Complete(DateRange { start: a, end: b })
        );
    }

    #[test]
    fn week_orders() {
        assert_eq!(WeekStart::Sunday.ordered_days()[0], Weekday::Sun);
        assert_eq!(WeekStart::Monday.ordered_days()[6], Weekday::Sun);
    }
}
