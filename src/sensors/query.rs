use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ValidationError;

pub const DEFAULT_LIMIT: u32 = 200;
pub const MAX_LIMIT: u32 = 10_000;

/// Naive layouts accepted for `from`/`to`, interpreted as UTC.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Layout of the `date` column as produced by SQLite's `datetime()`.
pub(crate) const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A validated `GET /api/sensors` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingQuery {
    pub limit: u32,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl Default for ReadingQuery {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, from: None, to: None }
    }
}

impl ReadingQuery {
    /// Validates raw query-string values.
    ///
    /// A bad `limit` silently falls back to the default; a bad `from`/`to`
    /// is an error naming the bound. Empty strings count as absent.
    pub fn parse(
        limit: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            limit: parse_limit(limit),
            from: parse_bound(from, "from")?,
            to: parse_bound(to, "to")?,
        })
    }

    /// Row cap to apply, or `None` when an explicit `[from, to]` window was
    /// requested and every matching row is returned.
    pub fn effective_limit(&self) -> Option<u32> {
        match (self.from, self.to) {
            (Some(_), Some(_)) => None,
            _ => Some(self.limit),
        }
    }
}

fn parse_limit(raw: Option<&str>) -> u32 {
    match raw.and_then(leading_integer) {
        None | Some(0) => DEFAULT_LIMIT,
        Some(n) => u32::try_from(n.clamp(1, i64::from(MAX_LIMIT))).unwrap_or(MAX_LIMIT),
    }
}

/// Reads an optionally signed run of leading digits, ignoring whatever
/// follows (`"10abc"` is 10, `"2.5"` is 2). Values past `i64` saturate.
/// `None` when there are no leading digits at all.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_bound(
    raw: Option<&str>,
    bound: &'static str,
) -> Result<Option<NaiveDateTime>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_timestamp(raw)
        .filter(|t| within_sanity_window(*t))
        .map(Some)
        .ok_or(ValidationError::InvalidDate(bound))
}

/// Parses the date-time layouts a browser or device is likely to send.
/// Offsets are normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// `[2000-01-01, 2050-01-01]`, both ends inclusive.
fn within_sanity_window(t: NaiveDateTime) -> bool {
    match (NaiveDate::from_ymd_opt(2000, 1, 1), NaiveDate::from_ymd_opt(2050, 1, 1)) {
        (Some(min), Some(max)) => {
            (min.and_time(NaiveTime::MIN)..=max.and_time(NaiveTime::MIN)).contains(&t)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn defaults_when_nothing_given() {
        let q = ReadingQuery::parse(None, None, None).unwrap();
        assert_eq!(q, ReadingQuery::default());
        assert_eq!(q.effective_limit(), Some(DEFAULT_LIMIT));
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(parse_limit(Some("50")), 50);
        assert_eq!(parse_limit(Some("1")), 1);
        assert_eq!(parse_limit(Some("10000")), MAX_LIMIT);
        assert_eq!(parse_limit(Some("999999")), MAX_LIMIT);
        assert_eq!(parse_limit(Some("-7")), 1);
        assert_eq!(parse_limit(Some("99999999999999999999")), MAX_LIMIT);
        assert_eq!(parse_limit(Some("-99999999999999999999")), 1);
    }

    #[test]
    fn limit_reads_leading_digits() {
        assert_eq!(parse_limit(Some("2.5")), 2);
        assert_eq!(parse_limit(Some("10abc")), 10);
        assert_eq!(parse_limit(Some(" +25 ")), 25);
    }

    #[test]
    fn bad_limit_falls_back_to_default() {
        assert_eq!(parse_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("-0")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("-")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some(".5")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn parses_supported_layouts() {
        let expected = dt("2025-10-01 15:00:00");
        for raw in [
            "2025-10-01T15:00:00Z",
            "2025-10-01T17:00:00+02:00",
            "2025-10-01T15:00:00",
            "2025-10-01 15:00:00",
            "2025-10-01T15:00",
            "2025-10-01 15:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "layout {raw}");
        }
        assert_eq!(parse_timestamp("2025-10-01"), Some(dt("2025-10-01 00:00:00")));
    }

    #[test]
    fn unparsable_dates_are_rejected() {
        let err = ReadingQuery::parse(None, Some("yesterday"), None).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("from"));
        let err = ReadingQuery::parse(None, None, Some("2025-13-40")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("to"));
    }

    #[test]
    fn dates_outside_window_are_rejected() {
        let err = ReadingQuery::parse(None, Some("1999-12-31T23:59:59Z"), None).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("from"));
        let err = ReadingQuery::parse(None, None, Some("2050-01-01T00:00:01Z")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("to"));
    }

    #[test]
    fn window_edges_are_inclusive() {
        let q = ReadingQuery::parse(None, Some("2000-01-01"), Some("2050-01-01")).unwrap();
        assert_eq!(q.from, Some(dt("2000-01-01 00:00:00")));
        assert_eq!(q.to, Some(dt("2050-01-01 00:00:00")));
    }

    #[test]
    fn empty_bounds_are_absent() {
        let q = ReadingQuery::parse(Some("5"), Some(""), Some("  ")).unwrap();
        assert_eq!(q.from, None);
        assert_eq!(q.to, None);
        assert_eq!(q.effective_limit(), Some(5));
    }

    #[test]
    fn limit_ignored_only_with_both_bounds() {
        let both = ReadingQuery::parse(Some("3"), Some("2025-01-01"), Some("2025-02-01")).unwrap();
        assert_eq!(both.effective_limit(), None);

        let from_only = ReadingQuery::parse(Some("3"), Some("2025-01-01"), None).unwrap();
        assert_eq!(from_only.effective_limit(), Some(3));

        let to_only = ReadingQuery::parse(Some("3"), None, Some("2025-02-01")).unwrap();
        assert_eq!(to_only.effective_limit(), Some(3));
    }
}
