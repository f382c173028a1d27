use crate::config::Config;
use crate::temporal::TemporalResolver;
use crate::types::{Event, Source};

use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Empty response for {0}")]
    EmptyBody(String),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: Option<String>,
}

impl WebScraper {
    pub fn new(config: &Config) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Serves every source from `{base_url}/{slug}` instead of its own site.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn source_url(&self, source: Source) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), source.slug()),
            None => source.url().to_string(),
        }
    }

    pub async fn fetch_source(
        &self,
        source: Source,
        temporal: &TemporalResolver,
    ) -> Result<Vec<Event>, ScraperError> {
        let url = self.source_url(source);
        log::info!("Fetching {} from {}...", source.slug(), url);
        let html = self.get_html(&url).await?;
        if html.trim().is_empty() {
            return Err(ScraperError::EmptyBody(url));
        }
        let events = source.events(&html, temporal);
        log::info!("{}: {} event(s)", source.slug(), events.len());
        Ok(events)
    }

    pub async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}
