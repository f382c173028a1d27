use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::parser::{self, ParseError};
use crate::temporal::TemporalResolver;

#[derive(Debug, thiserror::Error)]
#[error("Invalid source '{0}'. Accepted values: 'marktcom', 'kd-poco', 'dortmund-westpark'")]
pub struct SourceParseError(String);

/// How a source page lays out its dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// Rows of the first `<table>` whose first cell holds a `dd.mm.yyyy` date,
    /// with `HH:MM` times in the remaining cells.
    Table,
    /// Every `dd.mm.yyyy` in the page text.
    NumericDates,
    /// Every `d. Monat yyyy` in the page text.
    MonthNameDates,
}

/// A known flea market listing page. Each source covers a single venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    MarktcomRuhrPark,
    KdPocoDorsten,
    DortmundWestpark,
}

impl Source {
    pub const ALL: [Source; 3] = [
        Source::MarktcomRuhrPark,
        Source::KdPocoDorsten,
        Source::DortmundWestpark,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Source::MarktcomRuhrPark => "marktcom",
            Source::KdPocoDorsten => "kd-poco",
            Source::DortmundWestpark => "dortmund-westpark",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Source::MarktcomRuhrPark => {
                "https://www.marktcom.de/veranstaltung/troedelmarkt-bochum-ruhr-park-in-44791-bochum-bochum-nord"
            }
            Source::KdPocoDorsten => "https://www.kd-maerkte.de/poco-dorsten.html",
            Source::DortmundWestpark => {
                "https://www.dortmund.de/dortmund-erleben/veranstaltungskalender/termin_98666.html"
            }
        }
    }

    /// Short name used when citing sources in the digest.
    pub fn label(&self) -> &'static str {
        match self {
            Source::MarktcomRuhrPark => "Marktcom",
            Source::KdPocoDorsten => "K&D Märkte",
            Source::DortmundWestpark => "Stadt Dortmund",
        }
    }

    pub fn rule(&self) -> ExtractionRule {
        match self {
            Source::MarktcomRuhrPark => ExtractionRule::Table,
            Source::KdPocoDorsten => ExtractionRule::NumericDates,
            Source::DortmundWestpark => ExtractionRule::MonthNameDates,
        }
    }

    /// Opening hours assumed when the page does not list any.
    pub fn default_hours(&self) -> (&'static str, &'static str) {
        match self {
            Source::MarktcomRuhrPark => ("11:00", "17:00"),
            Source::KdPocoDorsten => ("11:00", "18:00"),
            Source::DortmundWestpark => ("11:00", "16:00"),
        }
    }

    pub fn listing(&self) -> Listing {
        match self {
            Source::MarktcomRuhrPark => Listing {
                title: "Trödelmarkt Ruhr Park",
                city: "Bochum",
                venue: "Westfield Ruhr Park (P1)",
                address: "Am Einkaufszentrum 1, 44791 Bochum",
                org: "MARKTCOM / Ostwald",
            },
            Source::KdPocoDorsten => Listing {
                title: "Trödelmarkt POCO Dorsten",
                city: "Dorsten",
                venue: "POCO Dorsten",
                address: "Marler Str. 137, 46282 Dorsten",
                org: "K&D Märkte",
            },
            Source::DortmundWestpark => Listing {
                title: "Trödelmarkt im Westpark",
                city: "Dortmund",
                venue: "Westpark",
                address: "Rittershausstr., 44137 Dortmund",
                org: "Stadt Dortmund",
            },
        }
    }

    pub fn extract(&self, html: &str) -> Vec<RawEventCandidate> {
        parser::parse_source_page(*self, html)
    }

    /// Extracts and resolves candidates. Candidates whose dates cannot be
    /// resolved are logged and skipped.
    pub fn events(&self, html: &str, temporal: &TemporalResolver) -> Vec<Event> {
        self.extract(html)
            .into_iter()
            .filter_map(|candidate| match candidate.resolve(temporal) {
                Ok(event) => Some(event),
                Err(e) => {
                    log::warn!(
                        "Skipping {} candidate '{}': {}",
                        self.slug(),
                        candidate.date_text,
                        e
                    );
                    None
                }
            })
            .collect()
    }
}

impl FromStr for Source {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.slug() == s)
            .ok_or_else(|| SourceParseError(s.to_string()))
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Fixed venue metadata attached to every event of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub title: &'static str,
    pub city: &'static str,
    pub venue: &'static str,
    pub address: &'static str,
    pub org: &'static str,
}

/// An extracted event whose date and times are still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventCandidate {
    pub title: String,
    pub city: String,
    pub venue: String,
    pub address: String,
    pub date_text: String,
    pub start_time_text: Option<String>,
    pub end_time_text: Option<String>,
    pub org: String,
    pub src: String,
}

impl RawEventCandidate {
    pub fn new(
        source: Source,
        date_text: impl Into<String>,
        start_time_text: Option<String>,
        end_time_text: Option<String>,
    ) -> Self {
        let listing = source.listing();
        Self {
            title: listing.title.to_string(),
            city: listing.city.to_string(),
            venue: listing.venue.to_string(),
            address: listing.address.to_string(),
            date_text: date_text.into(),
            start_time_text,
            end_time_text,
            org: listing.org.to_string(),
            src: source.url().to_string(),
        }
    }

    pub fn resolve(&self, temporal: &TemporalResolver) -> Result<Event, ParseError> {
        let (start, end) = temporal.resolve_date_time(
            &self.date_text,
            self.start_time_text.as_deref(),
            self.end_time_text.as_deref(),
        )?;

        Ok(Event {
            title: self.title.clone(),
            city: self.city.clone(),
            venue: self.venue.clone(),
            address: self.address.clone(),
            start,
            end,
            org: self.org.clone(),
            src: self.src.clone(),
        })
    }
}

/// A normalized market date. `start` always lies before `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub title: String,
    pub city: String,
    pub venue: String,
    pub address: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub org: String,
    pub src: String,
}

impl Event {
    /// Events on the same day in the same city and venue are one occurrence.
    pub fn dedup_key(&self) -> (NaiveDate, String, String) {
        (
            self.start.date_naive(),
            self.city.to_lowercase(),
            self.venue.to_lowercase(),
        )
    }

    /// Text the geocoder matches against.
    pub fn location_text(&self) -> String {
        format!("{} {}", self.city, self.address)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "• {} – {}: *{}* ({}-{}) — {}",
            self.start.format("%a %d.%m"),
            self.city,
            self.venue,
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.title
        )
    }
}
