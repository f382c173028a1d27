pub mod aggregator;
pub mod config;
pub mod digest;
pub mod geo;
pub mod notify;
mod parser;
pub mod scraper;
pub mod temporal;
#[cfg(test)]
mod test_server;
pub mod types;
pub mod utils;

pub use aggregator::{EventAggregator, SourceOutcome};
pub use config::{Config, ConfigError, Credentials};
pub use digest::DigestFormatter;
pub use parser::ParseError;
pub use scraper::{ScraperError, WebScraper};
pub use types::{Event, RawEventCandidate, Source};
