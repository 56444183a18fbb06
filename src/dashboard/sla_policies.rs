use crate::dates::WeekStart;
use crate::filters::{FilterColumn, Filterable};
use crate::models::SlaRecord;
use crate::stats::{
    average_by_weekday, distinct_count, percent, percentage_by_hour, round2, top_n, Share,
    WeekdayAverage,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_ATTRIBUTE: FilterColumn = FilterColumn::SlaPolicyName;
const TOP_ATTRIBUTES: usize = 10;

#[derive(Debug, Serialize)]
pub struct SlaKpis {
    pub events: usize,
    /// Percentage of events not breached; `None` when no events are selected.
    pub achievement_rate: Option<f64>,
    pub breached_tickets: usize,
    pub achieved_tickets: usize,
    pub active_tickets: usize,
    pub at_risk_tickets: usize,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DailyOutcome {
    pub date: NaiveDate,
    pub achieved: u64,
    pub breached: u64,
}

#[derive(Debug, Serialize)]
pub struct SlaPolicies {
    pub kpis: SlaKpis,
    pub completed_by_date: Vec<DailyOutcome>,
    pub attribute: FilterColumn,
    pub top_achieved: Vec<Share<String>>,
    pub top_breached: Vec<Share<String>>,
    pub breaches_by_hour: Vec<Share<u32>>,
    pub breaches_by_weekday: Vec<WeekdayAverage>,
}

pub fn build(
    filtered: &[&SlaRecord],
    attribute: Option<FilterColumn>,
    week_start: WeekStart,
) -> SlaPolicies {
    let attribute = attribute.unwrap_or(DEFAULT_ATTRIBUTE);
    let achieved = filtered.iter().filter(|e| !e.is_sla_breach).count();
    let kpis = SlaKpis {
        events: filtered.len(),
        achievement_rate: percent(achieved, distinct_count(filtered.iter().map(|e| &e.sla_event_id)))
            .map(round2),
        breached_tickets: distinct_tickets(filtered, |e| e.is_sla_breach),
        achieved_tickets: distinct_tickets(filtered, |e| !e.is_sla_breach),
        active_tickets: distinct_tickets(filtered, |e| e.is_active_sla),
        at_risk_tickets: distinct_tickets(filtered, SlaRecord::is_at_risk),
    };

    let completed: Vec<&SlaRecord> = filtered
        .iter()
        .copied()
        .filter(|e| e.is_completed())
        .collect();
    let breach_times: Vec<_> = filtered.iter().filter_map(|e| e.sla_breach_at).collect();

    SlaPolicies {
        kpis,
        completed_by_date: completed_by_date(&completed),
        attribute,
        top_achieved: top_n(
            completed
                .iter()
                .filter(|e| !e.is_sla_breach)
                .filter_map(|e| e.column(attribute)),
            TOP_ATTRIBUTES,
        ),
        top_breached: top_n(
            completed
                .iter()
                .filter(|e| e.is_sla_breach)
                .filter_map(|e| e.column(attribute)),
            TOP_ATTRIBUTES,
        ),
        breaches_by_hour: percentage_by_hour(breach_times.iter().copied()),
        breaches_by_weekday: average_by_weekday(
            breach_times.iter().map(|ts| ts.date()),
            week_start,
        ),
    }
}

fn distinct_tickets(events: &[&SlaRecord], pred: impl Fn(&SlaRecord) -> bool) -> usize {
    distinct_count(events.iter().filter(|e| pred(**e)).map(|e| e.ticket_id))
}

fn completed_by_date(completed: &[&SlaRecord]) -> Vec<DailyOutcome> {
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for event in completed {
        let entry = days.entry(event.sla_applied_at.date()).or_default();
        if event.is_sla_breach {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }
    days.into_iter()
        .map(|(date, (achieved, breached))| DailyOutcome {
            date,
            achieved,
            breached,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sla;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn event(id: &str, ticket: i64, day: u32, breached: bool, active: bool, policy: &str) -> SlaRecord {
        let mut e = sla(id, ticket, d(day));
        e.is_sla_breach = breached;
        e.is_active_sla = active;
        e.sla_policy_name = Some(policy.to_string());
        if breached {
            e.sla_breach_at = d(day).and_hms_opt(15, 30, 0);
        }
        e
    }

    fn sample() -> Vec<SlaRecord> {
        vec![
            event("e1", 1, 4, false, false, "Urgent"),
            event("e2", 1, 4, true, false, "Urgent"),
            event("e3", 2, 5, true, true, "Normal"),
            event("e4", 3, 5, false, true, "Normal"),
        ]
    }

    #[test]
    fn kpis_count_distinct_tickets() {
        let all = sample();
        let filtered: Vec<&SlaRecord> = all.iter().collect();
        let page = build(&filtered, None, WeekStart::Sunday);

        assert_eq!(page.kpis.events, 4);
        assert_eq!(page.kpis.achievement_rate, Some(50.0));
        assert_eq!(page.kpis.breached_tickets, 2);
        assert_eq!(page.kpis.achieved_tickets, 2);
        assert_eq!(page.kpis.active_tickets, 2);
        assert_eq!(page.kpis.at_risk_tickets, 1);
    }

    #[test]
    fn completed_outcomes_per_day() {
        let all = sample();
        let filtered: Vec<&SlaRecord> = all.iter().collect();
        let page = build(&filtered, None, WeekStart::Sunday);
        assert_eq!(
            page.completed_by_date,
            vec![DailyOutcome { date: d(4), achieved: 1, breached: 1 }]
        );
        assert_eq!(page.top_achieved[0].key, "Urgent");
        assert_eq!(page.top_breached[0].key, "Urgent");
        assert_eq!(page.top_breached.len(), 1);
    }

    #[test]
    fn breaches_by_time() {
        let all = sample();
        let filtered: Vec<&SlaRecord> = all.iter().collect();
        let page = build(&filtered, None, WeekStart::Monday);
        assert_eq!(page.breaches_by_hour.len(), 1);
        assert_eq!(page.breaches_by_hour[0].key, 15);
        assert_eq!(page.breaches_by_hour[0].percent, 100.0);
        // 2024-03-04 is a Monday, 2024-03-05 a Tuesday.
        assert_eq!(page.breaches_by_weekday[0].day, "Monday");
        assert_eq!(page.breaches_by_weekday[0].average, 0.5);
        assert_eq!(page.breaches_by_weekday[1].average, 0.5);
    }

    #[test]
    fn no_events_means_no_rate() {
        let page = build(&[], Some(FilterColumn::TicketBrand), WeekStart::Sunday);
        assert_eq!(page.kpis.achievement_rate, None);
        assert_eq!(page.kpis.breached_tickets, 0);
        assert!(page.completed_by_date.is_empty());
        assert!(page.breaches_by_hour.is_empty());
    }
}
