use std::collections::BTreeMap;

use crate::types::Event;

#[derive(Debug)]
pub struct EventStats {
    pub by_org: BTreeMap<String, usize>,
    pub total: usize,
}

impl EventStats {
    pub fn from_events(events: &[Event]) -> EventStats {
        let mut by_org = BTreeMap::new();
        for event in events {
            *by_org.entry(event.org.clone()).or_insert(0) += 1;
        }
        EventStats {
            by_org,
            total: events.len(),
        }
    }
}

impl std::fmt::Display for EventStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        for (org, count) in &self.by_org {
            writeln!(f, "  {:<26}{}", format!("{}:", org), count)?;
        }
        writeln!(f, "  {:<26}{}", "Total:", self.total)
    }
}
