use std::collections::HashSet;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::Config;
use crate::geo::{Coordinates, GeoResolver};
use crate::scraper::{ScraperError, WebScraper};
use crate::temporal::TemporalResolver;
use crate::types::{Event, Source};

/// Result of fetching and extracting a single source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: Source,
    pub result: Result<Vec<Event>, ScraperError>,
}

impl SourceOutcome {
    pub fn ok(source: Source, events: Vec<Event>) -> Self {
        Self {
            source,
            result: Ok(events),
        }
    }

    pub fn failed(source: Source, error: ScraperError) -> Self {
        Self {
            source,
            result: Err(error),
        }
    }
}

/// Merges per-source results into one chronological, duplicate-free list of
/// events near the reference point.
#[derive(Debug, Clone)]
pub struct EventAggregator {
    geo: GeoResolver,
    temporal: TemporalResolver,
    reference: Coordinates,
    radius_km: f64,
}

impl EventAggregator {
    pub fn new(config: &Config) -> Self {
        Self::with_geo(config, GeoResolver::new(config.reference))
    }

    pub fn with_geo(config: &Config, geo: GeoResolver) -> Self {
        Self {
            geo,
            temporal: TemporalResolver::new(config.timezone),
            reference: config.reference,
            radius_km: config.radius_km,
        }
    }

    pub fn temporal(&self) -> &TemporalResolver {
        &self.temporal
    }

    /// Fetches all `sources` concurrently and collects the results once every
    /// fetch has finished or failed.
    pub async fn run(&self, scraper: &WebScraper, sources: &[Source]) -> Vec<Event> {
        let mut futs: FuturesUnordered<_> = sources
            .iter()
            .map(|&source| async move {
                match scraper.fetch_source(source, &self.temporal).await {
                    Ok(events) => SourceOutcome::ok(source, events),
                    Err(e) => SourceOutcome::failed(source, e),
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(sources.len());
        while let Some(outcome) = futs.next().await {
            outcomes.push(outcome);
        }
        // completion order is arbitrary; merge in the order sources were given
        outcomes.sort_by_key(|o| sources.iter().position(|s| *s == o.source));

        self.collect(outcomes)
    }

    pub fn collect(&self, outcomes: Vec<SourceOutcome>) -> Vec<Event> {
        let mut events = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(found) => events.extend(found),
                Err(e) => log::error!("Source {} failed: {}", outcome.source.slug(), e),
            }
        }

        let before = events.len();
        events.retain(|e| {
            let near = self
                .geo
                .within_radius(&e.location_text(), self.reference, self.radius_km);
            if !near {
                log::debug!("Dropping {} in {}: outside radius", e.title, e.city);
            }
            near
        });
        log::info!(
            "{} of {} event(s) within {} km",
            events.len(),
            before,
            self.radius_km
        );

        dedup_sorted(events)
    }
}

/// Sorts by start and keeps the first event of each (date, city, venue) key.
pub fn dedup_sorted(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| e.start);

    let mut seen = HashSet::new();
    events.retain(|e| {
        let fresh = seen.insert(e.dedup_key());
        if !fresh {
            log::debug!("Dropping duplicate {} at {} on {}", e.title, e.venue, e.start);
        }
        fresh
    });
    events
}
