use crate::dates::WeekStart;
use crate::filters::{FilterColumn, Filterable};
use crate::models::TicketRecord;
use crate::stats::{average_by_weekday, cross_tab, percentage_by_hour, top_n, CrossTab, Share, WeekdayAverage};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_ATTRIBUTE: FilterColumn = FilterColumn::TicketBrand;
const TOP_ATTRIBUTES: usize = 10;

#[derive(Debug, Serialize)]
pub struct TicketKpis {
    pub created: usize,
    pub unsolved: usize,
    pub solved: usize,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CreatedSolved {
    pub date: NaiveDate,
    pub created: u64,
    pub solved: u64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyVolume {
    pub years_available: Vec<i32>,
    pub selected_years: Vec<i32>,
    /// Months down, years across.
    pub grid: CrossTab<u32, i32>,
}

#[derive(Debug, Serialize)]
pub struct TicketMetrics {
    pub kpis: TicketKpis,
    pub by_hour: Vec<Share<u32>>,
    pub by_weekday: Vec<WeekdayAverage>,
    pub created_vs_solved: Vec<CreatedSolved>,
    pub attribute: FilterColumn,
    pub top_attributes: Vec<Share<String>>,
    pub attribute_by_date: CrossTab<NaiveDate, String>,
    pub monthly: MonthlyVolume,
}

/// `all` is the unfiltered dataset; only the month/year view reads it.
pub fn build(
    all: &[TicketRecord],
    filtered: &[&TicketRecord],
    attribute: Option<FilterColumn>,
    years: Option<&[i32]>,
    week_start: WeekStart,
) -> TicketMetrics {
    let attribute = attribute.unwrap_or(DEFAULT_ATTRIBUTE);
    let solved = filtered.iter().filter(|t| t.is_solved()).count();

    TicketMetrics {
        kpis: TicketKpis {
            created: filtered.len(),
            unsolved: filtered.len() - solved,
            solved,
        },
        by_hour: percentage_by_hour(filtered.iter().map(|t| t.created_timestamp)),
        by_weekday: average_by_weekday(filtered.iter().map(|t| t.created_at), week_start),
        created_vs_solved: created_vs_solved(filtered),
        attribute,
        top_attributes: top_n(
            filtered.iter().filter_map(|t| t.column(attribute)),
            TOP_ATTRIBUTES,
        ),
        attribute_by_date: cross_tab(filtered.iter().filter_map(|t| {
            t.column(attribute)
                .map(|value| (t.created_at, value.to_string()))
        })),
        monthly: monthly_volume(all, years),
    }
}

fn created_vs_solved(filtered: &[&TicketRecord]) -> Vec<CreatedSolved> {
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for ticket in filtered {
        let entry = days.entry(ticket.created_at).or_default();
        entry.0 += 1;
        if ticket.first_solved_at.is_some() {
            entry.1 += 1;
        }
    }
    days.into_iter()
        .map(|(date, (created, solved))| CreatedSolved {
            date,
            created,
            solved,
        })
        .collect()
}

fn monthly_volume(all: &[TicketRecord], years: Option<&[i32]>) -> MonthlyVolume {
    let years_available: Vec<i32> = all
        .iter()
        .map(|t| t.created_at.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let selected_years = match years {
        Some(years) => years_available
            .iter()
            .copied()
            .filter(|year| years.contains(year))
            .collect(),
        None => years_available.clone(),
    };
    let grid = cross_tab(
        all.iter()
            .filter(|t| selected_years.contains(&t.created_at.year()))
            .map(|t| (t.created_at.month(), t.created_at.year())),
    );
    MonthlyVolume {
        years_available,
        selected_years,
        grid,
    }
}
