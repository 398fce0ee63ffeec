//! Identity of one daily summary run.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use gazette_core::serde::to_rfc3339_ms;

pub const TRIGGER_TYPE: &str = "cron_daily_la";
pub const TRIGGER_KEY_PREFIX: &str = "cron-daily-la";
pub const DEFAULT_SUMMARY_INTERVAL_SECS: i64 = 24 * 60 * 60;

/// Offset of the reference calendar (Los Angeles standard time) from UTC.
///
/// The offset is fixed: the day boundary stays at 08:00 UTC all year.
const REFERENCE_UTC_OFFSET_HOURS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRunContext {
    pub trigger_type: &'static str,
    pub trigger_key: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub window_start: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub window_end: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub day_start_utc: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub day_end_utc: DateTime<Utc>,
}

/// Calendar date of `now` in the reference calendar.
pub fn reference_date(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::hours(REFERENCE_UTC_OFFSET_HOURS)).date_naive()
}

/// Build the run context for an invocation at `now`.
///
/// `trigger_key` depends only on the reference-calendar date of `now`, so every
/// invocation on the same day shares it.
pub fn build_run_context(now: DateTime<Utc>, summary_interval: Duration) -> SummaryRunContext {
    let date = reference_date(now);
    let day_start_utc = day_start(date);
    let day_end_utc = day_start_utc + Duration::days(1) - Duration::milliseconds(1);

    SummaryRunContext {
        trigger_type: TRIGGER_TYPE,
        trigger_key: format!("{TRIGGER_KEY_PREFIX}:{}", date.format("%Y-%m-%d")),
        window_start: now - summary_interval,
        window_end: now,
        day_start_utc,
        day_end_utc,
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(REFERENCE_UTC_OFFSET_HOURS)
}
