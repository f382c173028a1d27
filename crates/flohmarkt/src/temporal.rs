use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

use crate::parser::ParseError;

const DEFAULT_START_HOUR: u32 = 9;
const DEFAULT_DURATION_HOURS: i64 = 6;

static RE_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})\b").expect("invalid regex: numeric date")
});
static RE_ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("invalid regex: iso date")
});
static RE_MONTH_NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\.?\s*([a-zäöü]+)\.?\s*(\d{4})\b")
        .expect("invalid regex: month name date")
});
static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?:[:.](\d{2}))?\b").expect("invalid regex: time of day")
});

/// German month names as written on the listing pages, including the `Maerz` spelling.
pub(crate) const GERMAN_MONTHS: [(&str, u32); 13] = [
    ("Januar", 1),
    ("Februar", 2),
    ("März", 3),
    ("Maerz", 3),
    ("April", 4),
    ("Mai", 5),
    ("Juni", 6),
    ("Juli", 7),
    ("August", 8),
    ("September", 9),
    ("Oktober", 10),
    ("November", 11),
    ("Dezember", 12),
];

/// English names and common abbreviations of both languages.
const OTHER_MONTHS: [(&str, u32); 23] = [
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mär", 3),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("okt", 10),
    ("oct", 10),
    ("nov", 11),
    ("december", 12),
    ("dez", 12),
    ("dec", 12),
];

pub(crate) fn parse_month(month: &str) -> Option<u32> {
    let month = month.to_lowercase();
    GERMAN_MONTHS
        .iter()
        .chain(OTHER_MONTHS.iter())
        .find(|(name, _)| name.to_lowercase() == month)
        .map(|(_, n)| *n)
}

fn parse_number<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, ParseError> {
    s.parse()
        .map_err(|_| ParseError::DateParse(format!("Invalid {}: {}", what, s)))
}

/// Day-first date parsing that ignores surrounding words.
///
/// The first recognisable date in the text wins: `dd.mm.yyyy` (or a two digit
/// year), ISO `yyyy-mm-dd`, then `d. Monat yyyy` with German or English month names.
pub fn parse_date_fuzzy(text: &str) -> Result<NaiveDate, ParseError> {
    let (year, month, day): (i32, u32, u32) = if let Some(caps) = RE_NUMERIC_DATE.captures(text) {
        let year: i32 = parse_number(&caps[3], "year")?;
        let year = if caps[3].len() == 2 { 2000 + year } else { year };
        (year, parse_number(&caps[2], "month")?, parse_number(&caps[1], "day")?)
    } else if let Some(caps) = RE_ISO_DATE.captures(text) {
        (
            parse_number(&caps[1], "year")?,
            parse_number(&caps[2], "month")?,
            parse_number(&caps[3], "day")?,
        )
    } else {
        RE_MONTH_NAME_DATE
            .captures_iter(text)
            .find_map(|caps| {
                let month = parse_month(&caps[2])?;
                Some((caps[3].parse().ok()?, month, caps[1].parse().ok()?))
            })
            .ok_or_else(|| {
                ParseError::DateParse(format!("Could not find a date in: {}", text))
            })?
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ParseError::DateParse(format!("Invalid date: {}-{}-{}", year, month, day))
    })
}

/// Parses a time of day such as `11:00`, `9.30 Uhr` or `14 Uhr`.
pub fn parse_time_fuzzy(text: &str) -> Result<NaiveTime, ParseError> {
    let cleaned = text.trim().replace("Uhr", "");
    let caps = RE_TIME
        .captures(&cleaned)
        .ok_or_else(|| ParseError::TimeParse(format!("Could not find a time in: {}", text)))?;

    let hour: u32 = caps[1]
        .parse()
        .map_err(|_| ParseError::TimeParse(format!("Invalid hour: {}", &caps[1])))?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| ParseError::TimeParse(format!("Invalid minute: {}", m.as_str())))?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ParseError::TimeParse(format!("Invalid time: {}:{:02}", hour, minute)))
}

/// Turns German date and time fragments into instants in a fixed zone.
#[derive(Debug, Clone, Copy)]
pub struct TemporalResolver {
    tz: Tz,
}

impl TemporalResolver {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Resolves a date plus optional start and end times.
    ///
    /// A missing start defaults to 09:00 and a missing end to six hours after
    /// the start. The resolved end must lie after the start.
    pub fn resolve_date_time(
        &self,
        date_text: &str,
        start_text: Option<&str>,
        end_text: Option<&str>,
    ) -> Result<(DateTime<Tz>, DateTime<Tz>), ParseError> {
        let date = parse_date_fuzzy(date_text)?;

        let start_time = start_text
            .map(parse_time_fuzzy)
            .transpose()?
            .unwrap_or_else(|| {
                NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
            });
        let start = self.localize(date.and_time(start_time))?;

        let end = match end_text {
            Some(text) => self.localize(date.and_time(parse_time_fuzzy(text)?))?,
            None => start + TimeDelta::hours(DEFAULT_DURATION_HOURS),
        };

        if end <= start {
            return Err(ParseError::InvalidRange(format!(
                "{} ends at {} before it starts at {}",
                date,
                end.format("%H:%M"),
                start.format("%H:%M")
            )));
        }

        Ok((start, end))
    }

    /// Labels a wall-clock time with the zone. Times skipped by a DST change do not exist.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Tz>, ParseError> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| ParseError::TimeParse(format!("Nonexistent local time: {}", naive)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn resolver() -> TemporalResolver {
        TemporalResolver::new(chrono_tz::Europe::Berlin)
    }

    #[test]
    fn test_resolve_defaults() {
        let (start, end) = resolver()
            .resolve_date_time("05.01.2025", None, None)
            .expect("Failed to resolve");

        assert_eq!(start.naive_local().to_string(), "2025-01-05 09:00:00");
        assert_eq!(end.naive_local().to_string(), "2025-01-05 15:00:00");
        assert_eq!(start.timezone(), chrono_tz::Europe::Berlin);
        assert_eq!(end.timezone(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_resolve_with_times_and_uhr_suffix() {
        let (start, end) = resolver()
            .resolve_date_time("Sonntag, 12.10.2025", Some("11:00 Uhr"), Some(" 17:30Uhr "))
            .expect("Failed to resolve");

        assert_eq!(start.naive_local().to_string(), "2025-10-12 11:00:00");
        assert_eq!(end.hour(), 17);
        assert_eq!(end.minute(), 30);
    }

    #[test]
    fn test_resolve_start_only_adds_six_hours() {
        let (start, end) = resolver()
            .resolve_date_time("01.06.2025", Some("10 Uhr"), None)
            .expect("Failed to resolve");

        assert_eq!(start.hour(), 10);
        assert_eq!(end.hour(), 16);
    }

    #[test]
    fn test_parse_month_name_dates() {
        let date = parse_date_fuzzy("am 7. September 2025 im Westpark").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());

        let date = parse_date_fuzzy("14. märz 2026").unwrap();
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 14);

        let date = parse_date_fuzzy("3 MAI 2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 5, 3).unwrap());
    }

    #[test]
    fn test_parse_other_numeric_forms() {
        assert_eq!(
            parse_date_fuzzy("2025-11-02").unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
        );
        assert_eq!(
            parse_date_fuzzy("Sa 1.3.26").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        assert!(matches!(
            parse_date_fuzzy("demnächst"),
            Err(ParseError::DateParse(_))
        ));
        assert!(matches!(
            parse_date_fuzzy("31.02.2025"),
            Err(ParseError::DateParse(_))
        ));
        assert!(resolver().resolve_date_time("irgendwann", None, None).is_err());
    }

    #[test]
    fn test_malformed_time_is_an_error() {
        assert!(matches!(
            parse_time_fuzzy("abends"),
            Err(ParseError::TimeParse(_))
        ));
        assert!(matches!(
            parse_time_fuzzy("25:00"),
            Err(ParseError::TimeParse(_))
        ));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = resolver()
            .resolve_date_time("05.01.2025", Some("18:00"), Some("11:00"))
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidRange(_)));
    }

    #[test]
    fn test_dst_gap_is_rejected() {
        // clocks jump from 02:00 to 03:00 on 30 March 2025 in Berlin
        let err = resolver()
            .resolve_date_time("30.03.2025", Some("02:30"), Some("05:00"))
            .unwrap_err();
        assert!(matches!(err, ParseError::TimeParse(_)));
    }
}
