//! Minguo (Republic of China) calendar dates, as used by the e-invoice
//! platform. Minguo year = Gregorian year - 1911.

use chrono::NaiveDate;

use crate::error::{IngestError, Result};

pub const MINGUO_OFFSET: i32 = 1911;

pub fn to_naive_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    year.checked_add(MINGUO_OFFSET)
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .ok_or(IngestError::InvalidDate { year, month, day })
}

/// Minguo year/month/day to `YYYY-MM-DD`
pub fn to_iso(year: i32, month: u32, day: u32) -> Result<String> {
    Ok(to_naive_date(year, month, day)?.format("%Y-%m-%d").to_string())
}
