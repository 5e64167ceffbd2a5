//! Read-only aggregates over committed expenses: totals, per-category
//! breakdown, and day grouping for listings.

use chrono::{Datelike, NaiveDate};

use crate::expense::{Category, Expense};

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Sum of expenses dated in the given month. Records with unparsable dates
/// are left out.
pub fn month_total(expenses: &[Expense], year: i32, month: u32) -> f64 {
    expenses
        .iter()
        .filter(|e| {
            parse_date(&e.date)
                .map(|d| d.year() == year && d.month() == month)
                .unwrap_or(false)
        })
        .map(|e| e.amount)
        .sum()
}

/// Per-category sums, in order of each category's first appearance.
pub fn by_category(expenses: &[Expense]) -> Vec<(Category, f64)> {
    let mut out: Vec<(Category, f64)> = Vec::new();
    for e in expenses {
        match out.iter_mut().find(|(c, _)| *c == e.category) {
            Some((_, sum)) => *sum += e.amount,
            None => out.push((e.category, e.amount)),
        }
    }
    out
}

/// Expenses sharing one date
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    pub date: &'a str,
    pub total: f64,
    pub expenses: Vec<&'a Expense>,
}

/// Group by date string, newest first. Within a day, stored order is kept.
/// Unparsable dates sort after all real dates.
pub fn group_by_date(expenses: &[Expense]) -> Vec<DayGroup<'_>> {
    let mut groups: Vec<DayGroup<'_>> = Vec::new();
    for e in expenses {
        match groups.iter_mut().find(|g| g.date == e.date) {
            Some(g) => {
                g.total += e.amount;
                g.expenses.push(e);
            }
            None => groups.push(DayGroup {
                date: &e.date,
                total: e.amount,
                expenses: vec![e],
            }),
        }
    }

    // Option<NaiveDate> orders None first; reverse puts it last
    groups.sort_by(|a, b| parse_date(b.date).cmp(&parse_date(a.date)));
    groups
}
