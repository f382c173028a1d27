use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::config::Config;
use crate::temporal::TemporalResolver;
use crate::types::{Event, Source};

/// Renders the weekly Telegram message.
#[derive(Debug, Clone)]
pub struct DigestFormatter {
    temporal: TemporalResolver,
    reference_name: String,
    radius_km: f64,
    sources: Vec<Source>,
}

impl DigestFormatter {
    pub fn new(config: &Config) -> Self {
        Self {
            temporal: TemporalResolver::new(config.timezone),
            reference_name: config.reference_name.clone(),
            radius_km: config.radius_km,
            sources: Source::ALL.to_vec(),
        }
    }

    /// Monday 00:00 to Sunday 23:59 of the week containing `now`, in the
    /// configured zone. The end stops a minute short of midnight.
    ///
    /// A bound that falls into a DST gap moves to the nearest valid wall-clock
    /// time inside the week.
    pub fn week_range(&self, now: DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
        let tz = self.temporal.timezone();
        let today = now.with_timezone(&tz).date_naive();
        let monday = today - TimeDelta::days(today.weekday().num_days_from_monday() as i64);
        let sunday = monday + TimeDelta::days(6);

        let start = nearest_local(tz, monday.and_time(NaiveTime::MIN), TimeDelta::hours(1));
        let end = nearest_local(tz, sunday.and_time(last_minute()), TimeDelta::hours(-1));
        (start, end)
    }

    pub fn filter_this_week(&self, events: &[Event], now: DateTime<Tz>) -> Vec<Event> {
        let (start, end) = self.week_range(now);
        events
            .iter()
            .filter(|e| start <= e.start && e.start <= end)
            .cloned()
            .collect()
    }

    pub fn empty_message(&self) -> String {
        format!(
            "🔎 No flea markets found within {} km of {} this week. (Sources: {})",
            self.radius_km,
            self.reference_name,
            self.source_labels()
        )
    }

    pub fn build_digest(&self, events: &[Event], now: DateTime<Tz>) -> String {
        let week_events = self.filter_this_week(events, now);
        if week_events.is_empty() {
            return self.empty_message();
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<&Event>> = BTreeMap::new();
        for event in &week_events {
            by_day.entry(event.start.date_naive()).or_default().push(event);
        }

        let mut lines = vec![
            format!(
                "🧺 *Flea markets this week* ({} +{} km)",
                self.reference_name, self.radius_km
            ),
            String::new(),
        ];
        for day_events in by_day.values() {
            lines.push(day_events[0].start.format("📅 *%A* %d.%m").to_string());
            lines.extend(day_events.iter().map(|e| e.to_string()));
            lines.push(String::new());
        }
        lines.push(format!("_Sources: {}_", self.source_labels()));

        lines.join("\n")
    }

    fn source_labels(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn last_minute() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// Labels `naive` with `tz`, stepping by `step` while the wall-clock time does
/// not exist. Ambiguous times take the earlier instant for a forward step and
/// the later one otherwise.
fn nearest_local(tz: Tz, naive: NaiveDateTime, step: TimeDelta) -> DateTime<Tz> {
    (0..3)
        .find_map(|i| {
            let local = tz.from_local_datetime(&(naive + step * i));
            if step < TimeDelta::zero() {
                local.latest()
            } else {
                local.earliest()
            }
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
