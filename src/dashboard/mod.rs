//! Page payload builders. Each works on an already-filtered slice of records
//! and tolerates it being empty.

pub mod assignee_activity;
pub mod sla_policies;
pub mod ticket_metrics;

use crate::dates::{DateRange, DateSelection, DefaultWindow, SelectionState};
use crate::errors::AppError;
use crate::filters::{
    FilterColumn, ASSIGNEE_FILTERS, SLA_ATTRIBUTES, SLA_FILTERS, TICKET_ATTRIBUTES, TICKET_FILTERS,
};
use crate::models::{DashboardRequest, Page};
use crate::session::SessionState;
use chrono::NaiveDate;
use tracing::debug;

impl Page {
    pub fn filter_columns(&self) -> &'static [FilterColumn] {
        match self {
            Page::TicketMetrics => TICKET_FILTERS,
            Page::AssigneeActivity => ASSIGNEE_FILTERS,
            Page::SlaPolicies => SLA_FILTERS,
        }
    }

    pub fn attributes(&self) -> &'static [FilterColumn] {
        match self {
            Page::TicketMetrics => TICKET_ATTRIBUTES,
            Page::SlaPolicies => SLA_ATTRIBUTES,
            Page::AssigneeActivity => &[],
        }
    }

    pub fn default_window(&self) -> DefaultWindow {
        match self {
            Page::SlaPolicies => DefaultWindow::TwoWeeksToLatest,
            Page::TicketMetrics | Page::AssigneeActivity => DefaultWindow::CurrentWeek,
        }
    }
}

/// Rejects filter columns and drill-down attributes the page does not offer.
pub fn validate(page: Page, request: &DashboardRequest) -> Result<(), AppError> {
    if let Some(column) = request.filters.unsupported(page.filter_columns()) {
        return Err(AppError::bad_request(format!(
            "{} cannot be filtered on this page",
            column.as_str()
        )));
    }
    if let Some(attribute) = request.attribute {
        if !page.attributes().contains(&attribute) {
            return Err(AppError::bad_request(format!(
                "{} is not a drill-down attribute on this page",
                attribute.as_str()
            )));
        }
    }
    Ok(())
}

/// Works out the range to render. `Ok(None)` is the incomplete-range state.
/// A complete explicit range is remembered in `session` for this page.
pub fn resolve_range(
    page: Page,
    request: &DashboardRequest,
    session: &mut SessionState,
    today: NaiveDate,
    latest: Option<NaiveDate>,
) -> Result<Option<DateRange>, AppError> {
    match DateSelection::new(request.start_date, request.end_date).state() {
        SelectionState::Complete(range) => {
            debug!(?page, start = %range.start, end = %range.end, "remembering date override");
            session.set_date_override(page, range);
            Ok(Some(range))
        }
        SelectionState::Unset => Ok(Some(
            session
                .date_override(page)
                .unwrap_or_else(|| page.default_window().resolve(today, latest)),
        )),
        SelectionState::Incomplete => Ok(None),
        SelectionState::Inverted => Err(AppError::bad_request(
            "start date must not be after end date",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ColumnFilters;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn explicit_range_becomes_the_session_default() {
        let mut session = SessionState::default();
        let request = DashboardRequest {
            start_date: Some(d(1)),
            end_date: Some(d(5)),
            ..Default::default()
        };
        let range = resolve_range(Page::TicketMetrics, &request, &mut session, d(20), None)
            .unwrap()
            .unwrap();
        assert_eq!(range, DateRange::new(d(1), d(5)).unwrap());

        let again = resolve_range(
            Page::TicketMetrics,
            &DashboardRequest::default(),
            &mut session,
            d(20),
            None,
        )
        .unwrap();
        assert_eq!(again, Some(range));
        // Other pages keep their own default.
        let sla = resolve_range(
            Page::SlaPolicies,
            &DashboardRequest::default(),
            &mut session,
            d(20),
            Some(d(13)),
        )
        .unwrap();
        assert_eq!(sla, Some(DateRange::two_weeks_ending(d(13))));
    }

    #[test]
    fn single_date_is_incomplete_and_not_remembered() {
        let mut session = SessionState::default();
        let request = DashboardRequest {
            start_date: Some(d(1)),
            ..Default::default()
        };
        let out = resolve_range(Page::AssigneeActivity, &request, &mut session, d(13), None).unwrap();
        assert_eq!(out, None);
        assert_eq!(session.date_override(Page::AssigneeActivity), None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut session = SessionState::default();
        let request = DashboardRequest {
            start_date: Some(d(9)),
            end_date: Some(d(1)),
            ..Default::default()
        };
        assert!(resolve_range(Page::TicketMetrics, &request, &mut session, d(13), None).is_err());
    }

    #[test]
    fn page_defaults() {
        let mut session = SessionState::default();
        let out = resolve_range(
            Page::TicketMetrics,
            &DashboardRequest::default(),
            &mut session,
            d(13),
            None,
        )
        .unwrap();
        assert_eq!(out, Some(DateRange::current_week(d(13))));
    }

    #[test]
    fn validation_rejects_foreign_columns() {
        let request = DashboardRequest {
            filters: ColumnFilters::new().with(FilterColumn::AssigneeName, [Some("Pam")]),
            ..Default::default()
        };
        assert!(validate(Page::TicketMetrics, &request).is_err());
        assert!(validate(Page::AssigneeActivity, &request).is_ok());

        let attribute = DashboardRequest {
            attribute: Some(FilterColumn::SlaPolicyName),
            ..Default::default()
        };
        assert!(validate(Page::TicketMetrics, &attribute).is_err());
        assert!(validate(Page::SlaPolicies, &attribute).is_ok());
    }
}
