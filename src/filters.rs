use crate::dates::DateRange;
use crate::models::{SlaRecord, TicketRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Categorical columns a page can filter or drill down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterColumn {
    TicketGroup,
    TicketBrand,
    TicketChannel,
    TicketForm,
    SubmitterRole,
    RequesterOrganization,
    AssigneeName,
    TicketPriority,
    TicketType,
    SlaPolicyName,
    Metric,
}

impl FilterColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterColumn::TicketGroup => "ticket_group",
            FilterColumn::TicketBrand => "ticket_brand",
            FilterColumn::TicketChannel => "ticket_channel",
            FilterColumn::TicketForm => "ticket_form",
            FilterColumn::SubmitterRole => "submitter_role",
            FilterColumn::RequesterOrganization => "requester_organization",
            FilterColumn::AssigneeName => "assignee_name",
            FilterColumn::TicketPriority => "ticket_priority",
            FilterColumn::TicketType => "ticket_type",
            FilterColumn::SlaPolicyName => "sla_policy_name",
            FilterColumn::Metric => "metric",
        }
    }
}

pub const TICKET_FILTERS: &[FilterColumn] = &[
    FilterColumn::TicketGroup,
    FilterColumn::TicketBrand,
    FilterColumn::TicketChannel,
    FilterColumn::TicketForm,
    FilterColumn::SubmitterRole,
    FilterColumn::RequesterOrganization,
];

pub const ASSIGNEE_FILTERS: &[FilterColumn] = &[
    FilterColumn::TicketGroup,
    FilterColumn::TicketBrand,
    FilterColumn::TicketChannel,
    FilterColumn::TicketForm,
    FilterColumn::SubmitterRole,
    FilterColumn::RequesterOrganization,
    FilterColumn::AssigneeName,
];

pub const SLA_FILTERS: &[FilterColumn] = &[
    FilterColumn::SlaPolicyName,
    FilterColumn::Metric,
    FilterColumn::TicketGroup,
    FilterColumn::TicketBrand,
    FilterColumn::TicketChannel,
    FilterColumn::TicketForm,
    FilterColumn::RequesterOrganization,
];

pub const TICKET_ATTRIBUTES: &[FilterColumn] = &[
    FilterColumn::TicketBrand,
    FilterColumn::TicketChannel,
    FilterColumn::TicketForm,
    FilterColumn::TicketGroup,
    FilterColumn::TicketPriority,
    FilterColumn::TicketType,
];

pub const SLA_ATTRIBUTES: &[FilterColumn] = &[
    FilterColumn::SlaPolicyName,
    FilterColumn::TicketBrand,
    FilterColumn::TicketChannel,
    FilterColumn::TicketForm,
    FilterColumn::TicketGroup,
];

/// A record that can be selected by date and categorical column.
pub trait Filterable {
    /// Date the range filter applies to.
    fn record_date(&self) -> NaiveDate;

    /// Value of a categorical column, `None` when null or not carried by this record kind.
    fn column(&self, column: FilterColumn) -> Option<&str>;
}

impl Filterable for TicketRecord {
    fn record_date(&self) -> NaiveDate {
        self.created_at
    }

    fn column(&self, column: FilterColumn) -> Option<&str> {
        let value = match column {
            FilterColumn::TicketGroup => &self.ticket_group,
            FilterColumn::TicketBrand => &self.ticket_brand,
            FilterColumn::TicketChannel => &self.ticket_channel,
            FilterColumn::TicketForm => &self.ticket_form,
            FilterColumn::SubmitterRole => &self.submitter_role,
            FilterColumn::RequesterOrganization => &self.requester_organization,
            FilterColumn::AssigneeName => &self.assignee_name,
            FilterColumn::TicketPriority => &self.ticket_priority,
            FilterColumn::TicketType => &self.ticket_type,
            FilterColumn::SlaPolicyName | FilterColumn::Metric => return None,
        };
        value.as_deref()
    }
}

impl Filterable for SlaRecord {
    fn record_date(&self) -> NaiveDate {
        self.sla_applied_at.date()
    }

    fn column(&self, column: FilterColumn) -> Option<&str> {
        let value = match column {
            FilterColumn::SlaPolicyName => &self.sla_policy_name,
            FilterColumn::Metric => &self.metric,
            FilterColumn::TicketGroup => &self.ticket_group,
            FilterColumn::TicketBrand => &self.ticket_brand,
            FilterColumn::TicketChannel => &self.ticket_channel,
            FilterColumn::TicketForm => &self.ticket_form,
            FilterColumn::RequesterOrganization => &self.requester_organization,
            FilterColumn::SubmitterRole
            | FilterColumn::AssigneeName
            | FilterColumn::TicketPriority
            | FilterColumn::TicketType => return None,
        };
        value.as_deref()
    }
}

/// Accepted values per column. A `None` entry is the null sentinel: a list
/// that is empty or holds it places no constraint on its column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ColumnFilters(BTreeMap<FilterColumn, Vec<Option<String>>>);

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, column: FilterColumn, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.0
            .insert(column, values.into_iter().map(|v| v.map(Into::into)).collect());
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = FilterColumn> + '_ {
        self.0.keys().copied()
    }

    /// Entries that actually constrain their column.
    pub fn active(&self) -> impl Iterator<Item = (FilterColumn, &[Option<String>])> + '_ {
        self.0
            .iter()
            .filter(|(_, values)| is_constraining(values))
            .map(|(column, values)| (*column, values.as_slice()))
    }

    /// First column not in `allowed`, if any.
    pub fn unsupported(&self, allowed: &[FilterColumn]) -> Option<FilterColumn> {
        self.columns().find(|column| !allowed.contains(column))
    }
}

fn is_constraining(values: &[Option<String>]) -> bool {
    !values.is_empty() && values.iter().all(Option::is_some)
}

fn accepts(field: Option<&str>, values: &[Option<String>]) -> bool {
    match field {
        Some(field) => values.iter().flatten().any(|value| value == field),
        None => false,
    }
}

/// Records dated within `range` (inclusive) that match every active column
/// filter. Source order is preserved.
pub fn filter_records<'a, R: Filterable>(
    records: &'a [R],
    range: &DateRange,
    filters: &ColumnFilters,
) -> Vec<&'a R> {
    let active: Vec<_> = filters.active().collect();
    records
        .iter()
        .filter(|record| range.contains(record.record_date()))
        .filter(|record| {
            active
                .iter()
                .all(|(column, values)| accepts(record.column(*column), values))
        })
        .collect()
}

/// Distinct non-null values per column, in first-seen order.
pub fn filter_options<R: Filterable>(
    records: &[R],
    columns: &[FilterColumn],
) -> BTreeMap<FilterColumn, Vec<String>> {
    columns
        .iter()
        .map(|column| {
            let mut seen = HashSet::new();
            let values = records
                .iter()
                .filter_map(|record| record.column(*column))
                .filter(|value| seen.insert(*value))
                .map(str::to_string)
                .collect();
            (*column, values)
        })
        .collect()
}

/// Latest record date, used to seed data-anchored default ranges.
pub fn latest_date<R: Filterable>(records: &[R]) -> Option<NaiveDate> {
    records.iter().map(Filterable::record_date).max()
}
