//! Rolling uptime aggregation
//!
//! Derives a day-bucketed status view and an overall uptime percentage from
//! a target's history records. Everything here is recomputed on each read;
//! nothing is cached or persisted.

use crate::probe::Status;
use crate::store::LogRecord;
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display window in calendar days
pub const WINDOW_DAYS: i64 = 30;

const MS_PER_DAY: i64 = 86_400_000;

/// Derived uptime view for one target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UptimeSummary {
    /// Uptime percentage over the entire record set; `None` means no data
    pub overall_percent: Option<f64>,

    /// Success ratio in [0, 1] keyed by days ago, for days inside the window.
    /// Days with no records are absent.
    pub buckets: BTreeMap<i64, f64>,
}

impl UptimeSummary {
    /// Success ratio for a day, if any records fell on it
    pub fn bucket_ratio(&self, days_ago: i64) -> Option<f64> {
        self.buckets.get(&days_ago).copied()
    }

    /// Rendering classification for a day inside the window
    pub fn bucket_status(&self, days_ago: i64) -> BucketStatus {
        classify_ratio(self.bucket_ratio(days_ago))
    }

    /// Overall percentage as display text
    pub fn overall_text(&self) -> String {
        match self.overall_percent {
            Some(percent) => format!("{:.2}%", percent),
            None => "no data".to_string(),
        }
    }
}

/// Rendering classification of one day bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BucketStatus {
    Success,
    Partial,
    Failure,
    NoData,
}

impl fmt::Display for BucketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketStatus::Success => write!(f, "success"),
            BucketStatus::Partial => write!(f, "partial"),
            BucketStatus::Failure => write!(f, "failure"),
            BucketStatus::NoData => write!(f, "no data"),
        }
    }
}

/// Classify a day's success ratio for rendering
pub fn classify_ratio(ratio: Option<f64>) -> BucketStatus {
    match ratio {
        None => BucketStatus::NoData,
        Some(r) if r >= 1.0 => BucketStatus::Success,
        Some(r) if r < 0.3 => BucketStatus::Failure,
        Some(_) => BucketStatus::Partial,
    }
}

/// Aggregate history records into a rolling uptime summary.
///
/// Day boundaries come from each record's own UTC date; `days_ago` is the
/// floor of the distance from `now` to that day's midnight. Buckets outside
/// the window are discarded, but the overall percentage still covers the
/// entire record set.
pub fn aggregate(records: &[LogRecord], now: NaiveDateTime) -> UptimeSummary {
    let mut per_day: BTreeMap<chrono::NaiveDate, (u64, u64)> = BTreeMap::new();
    let mut successes = 0u64;

    for record in records {
        let entry = per_day.entry(record.timestamp.date()).or_default();
        entry.1 += 1;
        if record.status == Status::Success {
            entry.0 += 1;
            successes += 1;
        }
    }

    let overall_percent = if records.is_empty() {
        None
    } else {
        Some(successes as f64 / records.len() as f64 * 100.0)
    };

    let now_ms = now.and_utc().timestamp_millis();
    let mut buckets = BTreeMap::new();

    for (day, (day_successes, day_total)) in per_day {
        let day_start_ms = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let days_ago = (now_ms - day_start_ms).div_euclid(MS_PER_DAY);

        if (0..WINDOW_DAYS).contains(&days_ago) {
            buckets.insert(days_ago, day_successes as f64 / day_total as f64);
        }
    }

    UptimeSummary {
        overall_percent,
        buckets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    fn record(timestamp: NaiveDateTime, status: Status) -> LogRecord {
        LogRecord { timestamp, status }
    }

    #[test]
    fn test_empty_history_reports_no_data() {
        let summary = aggregate(&[], now());

        assert_eq!(summary.overall_percent, None);
        assert!(summary.buckets.is_empty());
        assert_eq!(summary.overall_text(), "no data");
        assert_eq!(summary.bucket_status(0), BucketStatus::NoData);
    }

    #[test]
    fn test_mixed_day_yields_partial_bucket() {
        let mut records = Vec::new();
        for minute in 0..7 {
            records.push(record(now() - Duration::minutes(minute), Status::Success));
        }
        for minute in 7..10 {
            records.push(record(now() - Duration::minutes(minute), Status::Failed));
        }

        let summary = aggregate(&records, now());

        assert_eq!(summary.overall_percent, Some(70.0));
        assert_eq!(summary.bucket_ratio(0), Some(0.7));
        assert_eq!(summary.bucket_status(0), BucketStatus::Partial);
        assert_eq!(summary.overall_text(), "70.00%");
    }

    #[test]
    fn test_day_grouping_uses_record_dates() {
        let records = vec![
            record(now(), Status::Success),
            record(now() - Duration::days(1), Status::Failed),
            record(now() - Duration::days(1), Status::Failed),
        ];

        let summary = aggregate(&records, now());

        assert_eq!(summary.bucket_ratio(0), Some(1.0));
        assert_eq!(summary.bucket_ratio(1), Some(0.0));
        assert_eq!(summary.bucket_status(0), BucketStatus::Success);
        assert_eq!(summary.bucket_status(1), BucketStatus::Failure);
    }

    #[test]
    fn test_window_excludes_distant_days_but_not_overall() {
        let records = vec![
            record(now() - Duration::days(45), Status::Failed),
            record(now(), Status::Success),
        ];

        let summary = aggregate(&records, now());

        // Old record is outside the display window yet counts overall
        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.bucket_ratio(0), Some(1.0));
        assert_eq!(summary.overall_percent, Some(50.0));
    }

    #[test]
    fn test_future_records_never_create_buckets() {
        let records = vec![
            record(now() + Duration::days(2), Status::Success),
            record(now(), Status::Success),
        ];

        let summary = aggregate(&records, now());

        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.overall_percent, Some(100.0));
    }

    #[test]
    fn test_window_boundary() {
        let records = vec![
            record(now() - Duration::days(29), Status::Success),
            record(now() - Duration::days(30), Status::Success),
        ];

        let summary = aggregate(&records, now());

        assert!(summary.bucket_ratio(29).is_some());
        assert!(summary.bucket_ratio(30).is_none());
    }

    #[test]
    fn test_classify_ratio_thresholds() {
        assert_eq!(classify_ratio(Some(1.0)), BucketStatus::Success);
        assert_eq!(classify_ratio(Some(0.999)), BucketStatus::Partial);
        assert_eq!(classify_ratio(Some(0.3)), BucketStatus::Partial);
        assert_eq!(classify_ratio(Some(0.299)), BucketStatus::Failure);
        assert_eq!(classify_ratio(Some(0.0)), BucketStatus::Failure);
        assert_eq!(classify_ratio(None), BucketStatus::NoData);
    }
}
