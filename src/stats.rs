use crate::dates::{weekday_name, WeekStart};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share<K> {
    pub key: K,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub day: &'static str,
    pub count: u64,
    pub average: f64,
}

/// Dense grid of counts, zero-filled for pairs that never occur.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab<R, C> {
    pub rows: Vec<R>,
    pub columns: Vec<C>,
    pub counts: Vec<Vec<u64>>,
}

impl<R: Ord, C: Ord> CrossTab<R, C> {
    pub fn get(&self, row: &R, column: &C) -> u64 {
        match (self.rows.binary_search(row), self.columns.binary_search(column)) {
            (Ok(r), Ok(c)) => self.counts[r][c],
            _ => 0,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total * 100`, or `None` when there is nothing to divide by.
pub fn percent(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64 * 100.0)
}

pub fn distinct_count<T: Eq + Hash>(values: impl IntoIterator<Item = T>) -> usize {
    values.into_iter().collect::<HashSet<_>>().len()
}

/// Median of the non-null, non-NaN values. `None` is the "no data" result.
pub fn median(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().flatten().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Share of events per hour of day, for the hours that occur, ascending.
pub fn percentage_by_hour(timestamps: impl IntoIterator<Item = NaiveDateTime>) -> Vec<Share<u32>> {
    let mut hours: BTreeMap<u32, u64> = BTreeMap::new();
    for ts in timestamps {
        *hours.entry(ts.hour()).or_default() += 1;
    }
    let total: u64 = hours.values().sum();
    hours
        .into_iter()
        .map(|(hour, count)| Share {
            key: hour,
            count,
            percent: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

/// Value counts in first-encountered order.
pub fn frequencies<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    counts
}

/// Value counts sorted by descending frequency; ties keep first-encountered order.
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts = frequencies(values);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Share of each value over all given values, most frequent first.
pub fn percentage_by_value<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Share<String>> {
    let counts = value_counts(values);
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    counts
        .into_iter()
        .map(|(key, count)| Share {
            key,
            count,
            percent: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

/// The `n` most frequent values. `percent` is relative to the sum of the kept values.
pub fn top_n<'a>(values: impl IntoIterator<Item = &'a str>, n: usize) -> Vec<Share<String>> {
    let mut counts = value_counts(values);
    counts.truncate(n);
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    counts
        .into_iter()
        .map(|(key, count)| Share {
            key,
            count,
            percent: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

/// Events per weekday divided by the number of distinct dates seen, every
/// weekday present in the requested canonical order.
pub fn average_by_weekday(
    dates: impl IntoIterator<Item = NaiveDate>,
    week_start: WeekStart,
) -> Vec<WeekdayAverage> {
    let mut per_day: HashMap<chrono::Weekday, u64> = HashMap::new();
    let mut distinct: BTreeSet<NaiveDate> = BTreeSet::new();
    for date in dates {
        *per_day.entry(date.weekday()).or_default() += 1;
        distinct.insert(date);
    }
    let days = distinct.len();

    week_start
        .ordered_days()
        .into_iter()
        .map(|day| {
            let count = per_day.get(&day).copied().unwrap_or(0);
            let average = if days == 0 {
                0.0
            } else {
                round2(count as f64 / days as f64)
            };
            WeekdayAverage {
                day: weekday_name(day),
                count,
                average,
            }
        })
        .collect()
}

/// Counts per `(row, column)` pair pivoted into a dense sorted grid.
pub fn cross_tab<R, C>(pairs: impl IntoIterator<Item = (R, C)>) -> CrossTab<R, C>
where
    R: Ord + Clone,
    C: Ord + Clone,
{
    let mut cells: BTreeMap<(R, C), u64> = BTreeMap::new();
    let mut columns: BTreeSet<C> = BTreeSet::new();
    let mut rows: BTreeSet<R> = BTreeSet::new();
    for (row, column) in pairs {
        rows.insert(row.clone());
        columns.insert(column.clone());
        *cells.entry((row, column)).or_default() += 1;
    }

    let rows: Vec<R> = rows.into_iter().collect();
    let columns: Vec<C> = columns.into_iter().collect();
    let counts = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    cells
                        .get(&(row.clone(), column.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    CrossTab {
        rows,
        columns,
        counts,
    }
}
