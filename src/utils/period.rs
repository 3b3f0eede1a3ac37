use crate::error::{AppError, AppResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inclusive range of whole calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> AppResult<Self> {
        if start_date > end_date {
            return Err(AppError::ValidationError(
                "start_date must not be after end_date".to_string(),
            ));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Both bounds are needed for a filter; a single bound is ignored.
    pub fn from_query(start: Option<&str>, end: Option<&str>) -> AppResult<Option<Self>> {
        match (start, end) {
            (Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => {
                Ok(Some(Self::new(parse_date(s)?, parse_date(e)?)?))
            }
            _ => Ok(None),
        }
    }

    /// First instant of the range.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.start_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// First instant after the range (exclusive upper bound).
    pub fn ends_before(&self) -> DateTime<Utc> {
        match self.end_date.succ_opt() {
            Some(next) => next.and_time(chrono::NaiveTime::MIN).and_utc(),
            None => NaiveDateTime::MAX.and_utc(),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.starts_at() && at < self.ends_before()
    }
}

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// `YYYY-MM-DD` with a four-digit year between 1900 and 9999.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()))
        .ok_or_else(|| {
            AppError::ValidationError(format!("Invalid date '{value}', expected YYYY-MM-DD"))
        })
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_datetime(value: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_date(value).map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    ThisMonth,
    LastMonth,
    ThisYear,
    Custom,
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn month_range(year: i32, month: u32) -> DateRange {
    let start_date = first_of_month(year, month);
    let next = if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    };
    DateRange {
        start_date,
        end_date: next - Duration::days(1),
    }
}

impl Period {
    /// Turn a period selector into concrete days relative to `today`.
    /// `Custom` needs both dates; the others ignore them.
    pub fn resolve(
        self,
        today: NaiveDate,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<DateRange> {
        match self {
            Period::ThisMonth => Ok(month_range(today.year(), today.month())),
            Period::LastMonth => {
                if today.month() == 1 {
                    Ok(month_range(today.year() - 1, 12))
                } else {
                    Ok(month_range(today.year(), today.month() - 1))
                }
            }
            Period::ThisYear => DateRange::new(
                first_of_month(today.year(), 1),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
            Period::Custom => DateRange::from_query(start, end)?.ok_or_else(|| {
                AppError::ValidationError(
                    "start_date and end_date are required for a custom period".to_string(),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_this_month_covers_whole_month() {
        let range = Period::ThisMonth.resolve(day(2024, 2, 14), None, None).unwrap();
        assert_eq!(range.start_date, day(2024, 2, 1));
        assert_eq!(range.end_date, day(2024, 2, 29));
    }

    #[test]
    fn test_last_month_wraps_year() {
        let range = Period::LastMonth.resolve(day(2025, 1, 10), None, None).unwrap();
        assert_eq!(range.start_date, day(2024, 12, 1));
        assert_eq!(range.end_date, day(2024, 12, 31));
    }

    #[test]
    fn test_custom_period_requires_both_dates() {
        assert!(
            Period::Custom
                .resolve(day(2025, 1, 10), Some("2025-01-01"), None)
                .is_err()
        );
        let range = Period::Custom
            .resolve(day(2025, 1, 10), Some("2025-01-01"), Some("2025-01-31"))
            .unwrap();
        assert_eq!(range.end_date, day(2025, 1, 31));
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        assert!(DateRange::from_query(Some("2025-02-01"), Some("2025-01-01")).is_err());
        assert!(DateRange::from_query(Some("2025-13-01"), Some("2025-01-01")).is_err());
        assert_eq!(DateRange::from_query(Some("2025-01-01"), None).unwrap(), None);
    }

    #[test]
    fn test_end_day_is_inclusive() {
        let range = DateRange::new(day(2025, 3, 1), day(2025, 3, 31)).unwrap();
        let late_on_last_day = day(2025, 3, 31).and_hms_opt(23, 59, 59).unwrap().and_utc();
        let next_day = day(2025, 4, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();

        assert!(range.contains(range.starts_at()));
        assert!(range.contains(late_on_last_day));
        assert!(!range.contains(next_day));
    }

    #[test]
    fn test_out_of_range_years_are_rejected() {
        for end in ["+262142-12-31", "-0001-01-01", "1899-12-31"] {
            let err = DateRange::from_query(Some("2025-01-01"), Some(end)).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        assert!(
            Period::Custom
                .resolve(day(2025, 1, 10), Some("2025-01-01"), Some("+262142-12-31"))
                .is_err()
        );
    }

    #[test]
    fn test_last_representable_day_has_an_upper_bound() {
        let range = DateRange {
            start_date: NaiveDate::MAX,
            end_date: NaiveDate::MAX,
        };
        assert_eq!(range.ends_before(), NaiveDateTime::MAX.and_utc());
        assert!(range.contains(range.starts_at()));
    }

    #[test]
    fn test_parse_datetime_accepts_both_forms() {
        let a = parse_datetime("2025-03-01").unwrap();
        let b = parse_datetime("2025-03-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
    }
}
