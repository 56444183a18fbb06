use crate::dates::{DateRange, WeekStart};
use crate::filters::{ColumnFilters, FilterColumn};
use crate::pagination::PageAction;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the ticket-metrics export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketRecord {
    pub ticket_id: i64,
    pub created_at: NaiveDate,
    pub created_timestamp: NaiveDateTime,
    pub status: String,
    pub first_solved_at: Option<NaiveDate>,
    pub ticket_brand: Option<String>,
    pub ticket_channel: Option<String>,
    pub ticket_form: Option<String>,
    pub ticket_group: Option<String>,
    pub ticket_priority: Option<String>,
    pub ticket_type: Option<String>,
    pub submitter_role: Option<String>,
    pub requester_organization: Option<String>,
    pub is_one_touch_resolution: bool,
    pub is_two_touch_resolution: bool,
    pub is_multi_touch_resolution: bool,
    pub first_assignment_to_resolution_calendar_minutes: Option<f64>,
    pub requester_wait_time_in_calendar_minutes: Option<f64>,
    pub ticket_satisfaction_score: Option<String>,
    pub first_reply_time_calendar_minutes: Option<f64>,
    pub last_assignment_to_resolution_calendar_minutes: Option<f64>,
    pub final_resolution_calendar_minutes: Option<f64>,
    pub assignee_name: Option<String>,
}

impl TicketRecord {
    pub fn is_solved(&self) -> bool {
        self.status == "solved"
    }
}

/// One SLA policy event joined to its parent ticket's attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaRecord {
    pub sla_event_id: String,
    pub ticket_id: i64,
    pub sla_policy_name: Option<String>,
    pub metric: Option<String>,
    pub sla_applied_at: NaiveDateTime,
    pub target: Option<i64>,
    pub in_business_hours: bool,
    pub sla_breach_at: Option<NaiveDateTime>,
    pub sla_elapsed_time: Option<f64>,
    pub is_active_sla: bool,
    pub is_sla_breach: bool,
    pub ticket_group: Option<String>,
    pub ticket_brand: Option<String>,
    pub ticket_form: Option<String>,
    pub requester_organization: Option<String>,
    pub ticket_channel: Option<String>,
}

impl SlaRecord {
    /// Completed SLAs are the ones no longer being measured.
    pub fn is_completed(&self) -> bool {
        !self.is_active_sla
    }

    pub fn is_at_risk(&self) -> bool {
        self.is_active_sla && self.is_sla_breach
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Tickets,
    SlaEvents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    BigQuery,
    Snowflake,
    Csv,
}

impl Destination {
    /// Anything that is not a known warehouse falls back to the bundled files.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "bigquery" => Destination::BigQuery,
            "snowflake" => Destination::Snowflake,
            _ => Destination::Csv,
        }
    }

    pub fn is_warehouse(&self) -> bool {
        !matches!(self, Destination::Csv)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    TicketMetrics,
    SlaPolicies,
    AssigneeActivity,
}

/// Body shared by every page endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardRequest {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub filters: ColumnFilters,
    #[serde(default)]
    pub attribute: Option<FilterColumn>,
    #[serde(default)]
    pub years: Option<Vec<i32>>,
    #[serde(default)]
    pub page_action: Option<PageAction>,
    #[serde(default)]
    pub week_start: WeekStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Ready,
    IncompleteRange,
    Misconfigured,
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub status: PageStatus,
    pub message: Option<String>,
    pub date_range: Option<DateRange>,
    pub filter_options: BTreeMap<FilterColumn, Vec<String>>,
    pub body: Option<T>,
}

impl<T: Serialize> PageResponse<T> {
    pub fn ready(
        date_range: DateRange,
        filter_options: BTreeMap<FilterColumn, Vec<String>>,
        body: T,
    ) -> Self {
        Self {
            status: PageStatus::Ready,
            message: None,
            date_range: Some(date_range),
            filter_options,
            body: Some(body),
        }
    }

    pub fn incomplete_range(filter_options: BTreeMap<FilterColumn, Vec<String>>) -> Self {
        Self {
            status: PageStatus::IncompleteRange,
            message: Some("Please ensure both start date and end date are selected.".to_string()),
            date_range: None,
            filter_options,
            body: None,
        }
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self {
            status: PageStatus::Misconfigured,
            message: Some(message.into()),
            date_range: None,
            filter_options: BTreeMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub destination: Destination,
    pub source: Option<&'static str>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub ready: bool,
    pub message: Option<String>,
}
