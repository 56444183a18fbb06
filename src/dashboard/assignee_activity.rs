use crate::models::TicketRecord;
use crate::pagination::{navigate, PageAction, Paged, PAGE_SIZE};
use crate::stats::{mean, median, percent, percentage_by_value, round2, Share};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct AssigneeKpis {
    pub solved: usize,
    pub one_touch_percent: Option<f64>,
    pub two_touch_percent: Option<f64>,
    pub median_wait_minutes: Option<f64>,
    pub mean_wait_minutes: Option<f64>,
    pub median_first_assignment_to_resolution_minutes: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DailyWait {
    pub date: NaiveDate,
    pub tickets: u64,
    pub median_wait_minutes: Option<f64>,
}

/// Per-assignee medians, in hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeRow {
    pub assignee_name: String,
    pub solved: u64,
    pub first_reply_hours: Option<f64>,
    pub requester_wait_hours: Option<f64>,
    pub last_assignment_to_resolution_hours: Option<f64>,
    pub final_resolution_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AssigneeActivity {
    pub kpis: AssigneeKpis,
    pub satisfaction: Vec<Share<String>>,
    pub wait_brackets: Vec<Share<String>>,
    pub daily: Vec<DailyWait>,
    pub table: Paged<AssigneeRow>,
}

/// `current_page` is the table page the session was on; `action` moves it.
pub fn build(
    filtered: &[&TicketRecord],
    current_page: usize,
    action: Option<PageAction>,
) -> AssigneeActivity {
    let total = filtered.len();
    let rows = assignee_rows(filtered);
    let page = navigate(current_page, action, rows.len(), PAGE_SIZE);

    AssigneeActivity {
        kpis: AssigneeKpis {
            solved: filtered.iter().filter(|t| t.is_solved()).count(),
            one_touch_percent: percent(
                filtered.iter().filter(|t| t.is_one_touch_resolution).count(),
                total,
            )
            .map(round2),
            two_touch_percent: percent(
                filtered.iter().filter(|t| t.is_two_touch_resolution).count(),
                total,
            )
            .map(round2),
            median_wait_minutes: median(
                filtered.iter().map(|t| t.requester_wait_time_in_calendar_minutes),
            ),
            mean_wait_minutes: mean(
                filtered.iter().map(|t| t.requester_wait_time_in_calendar_minutes),
            )
            .map(round2),
            median_first_assignment_to_resolution_minutes: median(
                filtered
                    .iter()
                    .map(|t| t.first_assignment_to_resolution_calendar_minutes),
            ),
        },
        satisfaction: percentage_by_value(
            filtered
                .iter()
                .filter_map(|t| t.ticket_satisfaction_score.as_deref()),
        ),
        wait_brackets: wait_brackets(filtered),
        daily: daily_waits(filtered),
        table: Paged::slice(rows, page, PAGE_SIZE),
    }
}

/// Share of all filtered tickets whose requester wait falls in each bracket.
/// Tickets with no wait, or a wait of zero, fall in neither.
fn wait_brackets(filtered: &[&TicketRecord]) -> Vec<Share<String>> {
    let waits = || {
        filtered
            .iter()
            .filter_map(|t| t.requester_wait_time_in_calendar_minutes)
    };
    let within_hour = waits().filter(|m| *m > 0.0 && *m <= 60.0).count();
    let over_hour = waits().filter(|m| *m > 60.0).count();

    [("0-1 hours", within_hour), (">1 hours", over_hour)]
        .into_iter()
        .filter_map(|(label, count)| {
            percent(count, filtered.len()).map(|p| Share {
                key: label.to_string(),
                count: count as u64,
                percent: round2(p),
            })
        })
        .collect()
}

fn daily_waits(filtered: &[&TicketRecord]) -> Vec<DailyWait> {
    let mut days: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for ticket in filtered {
        days.entry(ticket.created_at)
            .or_default()
            .push(ticket.requester_wait_time_in_calendar_minutes);
    }
    days.into_iter()
        .map(|(date, waits)| DailyWait {
            date,
            tickets: waits.len() as u64,
            median_wait_minutes: median(waits),
        })
        .collect()
}

fn to_hours(minutes: Option<f64>) -> Option<f64> {
    minutes.map(|m| round2(m / 60.0))
}

fn assignee_rows(filtered: &[&TicketRecord]) -> Vec<AssigneeRow> {
    let mut groups: BTreeMap<&str, Vec<&TicketRecord>> = BTreeMap::new();
    for ticket in filtered {
        if let Some(name) = ticket.assignee_name.as_deref() {
            groups.entry(name).or_default().push(ticket);
        }
    }

    groups
        .into_iter()
        .map(|(name, tickets)| AssigneeRow {
            assignee_name: name.to_string(),
            solved: tickets.iter().filter(|t| t.is_solved()).count() as u64,
            first_reply_hours: to_hours(median(
                tickets.iter().map(|t| t.first_reply_time_calendar_minutes),
            )),
            requester_wait_hours: to_hours(median(
                tickets.iter().map(|t| t.requester_wait_time_in_calendar_minutes),
            )),
            last_assignment_to_resolution_hours: to_hours(median(
                tickets
                    .iter()
                    .map(|t| t.last_assignment_to_resolution_calendar_minutes),
            )),
            final_resolution_hours: to_hours(median(
                tickets.iter().map(|t| t.final_resolution_calendar_minutes),
            )),
        })
        .collect()
}
