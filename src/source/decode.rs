//! Turns an untyped [`Table`] into typed records, whichever backend produced it.

use super::{SourceError, Table};
use crate::models::{SlaRecord, TicketRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

pub const TICKET_COLUMNS: &[&str] = &[
    "ticket_id",
    "created_at",
    "created_timestamp",
    "status",
    "first_solved_at",
    "ticket_brand",
    "ticket_channel",
    "ticket_form",
    "ticket_group",
    "ticket_priority",
    "ticket_type",
    "submitter_role",
    "requester_organization",
    "is_one_touch_resolution",
    "is_two_touch_resolution",
    "is_multi_touch_resolution",
    "first_assignment_to_resolution_calendar_minutes",
    "requester_wait_time_in_calendar_minutes",
    "ticket_satisfaction_score",
    "first_reply_time_calendar_minutes",
    "last_assignment_to_resolution_calendar_minutes",
    "final_resolution_calendar_minutes",
    "assignee_name",
];

pub const SLA_COLUMNS: &[&str] = &[
    "sla_event_id",
    "ticket_id",
    "sla_policy_name",
    "metric",
    "sla_applied_at",
    "target",
    "in_business_hours",
    "sla_breach_at",
    "sla_elapsed_time",
    "is_active_sla",
    "is_sla_breach",
    "ticket_group",
    "ticket_brand",
    "ticket_form",
    "requester_organization",
    "ticket_channel",
];

/// Parses ISO dates and date-times (naive or with an offset, which is kept as
/// wall-clock time) and the epoch-second encodings warehouse REST APIs use.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(epoch) = parse_epoch(value) {
        return Some(epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.naive_local());
        }
    }
    let without_utc = value.strip_suffix(" UTC").unwrap_or(value);
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(without_utc, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(without_utc, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

// "1709942400.0", "1.7099424E9", or Snowflake's "1709942400.000000000 1440".
// Bare integers shorter than ten digits are compact dates like "20240309", not seconds.
fn parse_epoch(value: &str) -> Option<NaiveDateTime> {
    let seconds = value.split_whitespace().next()?;
    if seconds.contains(['-', ':']) {
        return None;
    }
    if !seconds.contains(['.', 'e', 'E']) && seconds.len() < 10 {
        return None;
    }
    let seconds: f64 = seconds.parse().ok().filter(|s: &f64| s.is_finite())?;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" | "" => Some(false),
        _ => None,
    }
}

struct Reader<'a> {
    table: &'a Table,
    indexes: Vec<usize>,
    columns: &'static [&'static str],
}

impl<'a> Reader<'a> {
    fn new(table: &'a Table, columns: &'static [&'static str]) -> Result<Self, SourceError> {
        let indexes = columns
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| SourceError::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            table,
            indexes,
            columns,
        })
    }

    fn row(&self, row: usize) -> Row<'_> {
        Row { reader: self, row }
    }
}

struct Row<'a> {
    reader: &'a Reader<'a>,
    row: usize,
}

impl Row<'_> {
    fn raw(&self, column: &str) -> Option<&str> {
        let slot = self.reader.columns.iter().position(|c| *c == column)?;
        let index = self.reader.indexes[slot];
        self.reader.table.rows[self.row]
            .get(index)
            .and_then(|cell| cell.as_deref())
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
    }

    fn invalid(&self, column: &str, value: &str) -> SourceError {
        SourceError::InvalidCell {
            row: self.row + 1,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        self.raw(column).map(str::to_string)
    }

    fn required_text(&self, column: &str) -> Result<String, SourceError> {
        self.text(column).ok_or_else(|| self.invalid(column, ""))
    }

    fn id(&self, column: &str) -> Result<i64, SourceError> {
        let raw = self.raw(column).unwrap_or_default();
        raw.parse::<i64>()
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.fract() == 0.0)
                    .map(|v| v as i64)
            })
            .ok_or_else(|| self.invalid(column, raw))
    }

    fn datetime(&self, column: &str) -> Result<Option<NaiveDateTime>, SourceError> {
        match self.raw(column) {
            None => Ok(None),
            Some(raw) => parse_datetime(raw)
                .map(Some)
                .ok_or_else(|| self.invalid(column, raw)),
        }
    }

    fn required_datetime(&self, column: &str) -> Result<NaiveDateTime, SourceError> {
        self.datetime(column)?
            .ok_or_else(|| self.invalid(column, ""))
    }

    fn flag(&self, column: &str) -> Result<bool, SourceError> {
        let raw = self.raw(column).unwrap_or_default();
        parse_bool(raw).ok_or_else(|| self.invalid(column, raw))
    }

    /// Non-numeric text is coerced to null.
    fn number(&self, column: &str) -> Option<f64> {
        self.raw(column)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|v| !v.is_nan())
    }
}

pub fn decode_tickets(table: &Table) -> Result<Vec<TicketRecord>, SourceError> {
    let reader = Reader::new(table, TICKET_COLUMNS)?;
    (0..table.rows.len())
        .map(|index| -> Result<TicketRecord, SourceError> {
            let row = reader.row(index);
            let created = row.required_datetime("created_at")?;
            Ok(TicketRecord {
                ticket_id: row.id("ticket_id")?,
                created_at: created.date(),
                created_timestamp: row.datetime("created_timestamp")?.unwrap_or(created),
                status: row.required_text("status")?,
                first_solved_at: row.datetime("first_solved_at")?.map(|dt| dt.date()),
                ticket_brand: row.text("ticket_brand"),
                ticket_channel: row.text("ticket_channel"),
                ticket_form: row.text("ticket_form"),
                ticket_group: row.text("ticket_group"),
                ticket_priority: row.text("ticket_priority"),
                ticket_type: row.text("ticket_type"),
                submitter_role: row.text("submitter_role"),
                requester_organization: row.text("requester_organization"),
                is_one_touch_resolution: row.flag("is_one_touch_resolution")?,
                is_two_touch_resolution: row.flag("is_two_touch_resolution")?,
                is_multi_touch_resolution: row.flag("is_multi_touch_resolution")?,
                first_assignment_to_resolution_calendar_minutes: row
                    .number("first_assignment_to_resolution_calendar_minutes"),
                requester_wait_time_in_calendar_minutes: row
                    .number("requester_wait_time_in_calendar_minutes"),
                ticket_satisfaction_score: row.text("ticket_satisfaction_score"),
                first_reply_time_calendar_minutes: row.number("first_reply_time_calendar_minutes"),
                last_assignment_to_resolution_calendar_minutes: row
                    .number("last_assignment_to_resolution_calendar_minutes"),
                final_resolution_calendar_minutes: row.number("final_resolution_calendar_minutes"),
                assignee_name: row.text("assignee_name"),
            })
        })
        .collect()
}

pub fn decode_sla_events(table: &Table) -> Result<Vec<SlaRecord>, SourceError> {
    let reader = Reader::new(table, SLA_COLUMNS)?;
    (0..table.rows.len())
        .map(|index| -> Result<SlaRecord, SourceError> {
            let row = reader.row(index);
            let is_sla_breach = row.flag("is_sla_breach")?;
            Ok(SlaRecord {
                sla_event_id: row.required_text("sla_event_id")?,
                ticket_id: row.id("ticket_id")?,
                sla_policy_name: row.text("sla_policy_name"),
                metric: row.text("metric"),
                sla_applied_at: row.required_datetime("sla_applied_at")?,
                target: row.number("target").map(|v| v.round() as i64),
                in_business_hours: row.flag("in_business_hours")?,
                // A breach time only means something on a breached event.
                sla_breach_at: if is_sla_breach {
                    row.datetime("sla_breach_at")?
                } else {
                    None
                },
                sla_elapsed_time: row.number("sla_elapsed_time"),
                is_active_sla: row.flag("is_active_sla")?,
                is_sla_breach,
                ticket_group: row.text("ticket_group"),
                ticket_brand: row.text("ticket_brand"),
                ticket_form: row.text("ticket_form"),
                requester_organization: row.text("requester_organization"),
                ticket_channel: row.text("ticket_channel"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    fn ticket_row<'a>(overrides: &[(&str, &'a str)]) -> Vec<&'a str> {
        TICKET_COLUMNS
            .iter()
            .map(|column| {
                overrides
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| *value)
                    .unwrap_or(match *column {
                        "ticket_id" => "1",
                        "created_at" => "2024-03-04 10:30:00",
                        "status" => "open",
                        _ => "",
                    })
            })
            .collect()
    }

    #[test]
    fn datetime_encodings() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-09"), Some(expected));
        assert_eq!(parse_datetime("2024-03-09 00:00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-09T00:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-03-09 00:00:00 UTC"), Some(expected));
        assert_eq!(parse_datetime("2024-03-09 00:00:00+00:00"), Some(expected));
        assert_eq!(parse_datetime("1709942400.000000000"), Some(expected));
        assert_eq!(parse_datetime("1.7099424E9"), Some(expected));
        assert_eq!(parse_datetime("1709942400.000000000 1440"), Some(expected));
        assert_eq!(parse_datetime("1709942400"), Some(expected));
        assert_eq!(parse_datetime("20240309"), None);
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("not a date"), None);
    }

    #[test]
    fn offsets_keep_wall_clock_time() {
        let dt = parse_datetime("2024-03-09T23:15:00-05:00").unwrap();
        assert_eq!(dt.day(), 9);
        assert_eq!(dt.hour(), 23);
    }

    #[test]
    fn booleans() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn ticket_dates_reduce_to_days() {
        let row = ticket_row(&[("first_solved_at", "2024-03-05T08:00:00Z"), ("ticket_brand", "Acme")]);
        let records = decode_tickets(&table(TICKET_COLUMNS, &[row.as_slice()])).unwrap();
        let record = &records[0];
        assert_eq!(record.created_at, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(record.created_timestamp.hour(), 10);
        assert_eq!(record.first_solved_at, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(record.ticket_brand.as_deref(), Some("Acme"));
        assert_eq!(record.assignee_name, None);
    }

    #[test]
    fn non_numeric_minutes_become_null() {
        let row = ticket_row(&[("requester_wait_time_in_calendar_minutes", "n/a")]);
        let records = decode_tickets(&table(TICKET_COLUMNS, &[row.as_slice()])).unwrap();
        assert_eq!(records[0].requester_wait_time_in_calendar_minutes, None);
    }

    #[test]
    fn float_ids_are_accepted() {
        let row = ticket_row(&[("ticket_id", "42.0")]);
        let records = decode_tickets(&table(TICKET_COLUMNS, &[row.as_slice()])).unwrap();
        assert_eq!(records[0].ticket_id, 42);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = decode_tickets(&table(&["ticket_id", "created_at"], &[])).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn(name) if name == "created_timestamp"));
    }

    #[test]
    fn bad_created_at_is_reported_with_row() {
        let row = ticket_row(&[("created_at", "yesterday")]);
        let err = decode_tickets(&table(TICKET_COLUMNS, &[row.as_slice()])).unwrap_err();
        assert!(matches!(err, SourceError::InvalidCell { row: 1, ref column, .. } if column == "created_at"));
    }

    #[test]
    fn compact_date_is_not_read_as_epoch_seconds() {
        let row = ticket_row(&[("created_at", "20240309")]);
        let err = decode_tickets(&table(TICKET_COLUMNS, &[row.as_slice()])).unwrap_err();
        assert!(matches!(err, SourceError::InvalidCell { ref value, .. } if value == "20240309"));
    }

    #[test]
    fn breach_time_dropped_unless_breached() {
        let columns = SLA_COLUMNS;
        let make = |breach: &'static str| -> Vec<&'static str> {
            columns
                .iter()
                .map(|c| match *c {
                    "sla_event_id" => "e1",
                    "ticket_id" => "7",
                    "sla_applied_at" => "2024-03-04 08:00:00",
                    "sla_breach_at" => "2024-03-04 12:00:00",
                    "is_sla_breach" => breach,
                    "is_active_sla" => "false",
                    "in_business_hours" => "true",
                    "target" => "480",
                    _ => "",
                })
                .collect()
        };
        let breached = make("true");
        let achieved = make("false");
        let records = decode_sla_events(&table(columns, &[breached.as_slice(), achieved.as_slice()])).unwrap();
        assert!(records[0].sla_breach_at.is_some());
        assert_eq!(records[1].sla_breach_at, None);
        assert_eq!(records[0].target, Some(480));
        assert!(records[0].in_business_hours);
    }
}
