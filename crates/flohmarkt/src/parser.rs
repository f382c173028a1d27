use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::temporal::GERMAN_MONTHS;
use crate::types::{ExtractionRule, RawEventCandidate, Source};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse date: {0}")]
    DateParse(String),
    #[error("Failed to parse time: {0}")]
    TimeParse(String),
    #[error("Invalid time range: {0}")]
    InvalidRange(String),
}

static RE_NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{4}").expect("invalid regex: numeric date"));
static RE_CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("invalid regex: clock time"));
static RE_MONTH_NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    let names = GERMAN_MONTHS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\d{{1,2}}\.\s*(?:{})\s*\d{{4}}", names))
        .expect("invalid regex: month name date")
});

fn elem_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn page_text(document: &Html) -> String {
    elem_text(document.root_element())
}

/// Dispatches to the extraction rule of `source`.
pub fn parse_source_page(source: Source, html: &str) -> Vec<RawEventCandidate> {
    let document = Html::parse_document(html);
    let candidates = match source.rule() {
        ExtractionRule::Table => parse_table_rows(source, &document),
        ExtractionRule::NumericDates => parse_text_dates(source, &document, &RE_NUMERIC_DATE),
        ExtractionRule::MonthNameDates => {
            parse_text_dates(source, &document, &RE_MONTH_NAME_DATE)
        }
    };
    log::debug!("{}: extracted {} candidate(s)", source.slug(), candidates.len());
    candidates
}

/// Reads dated rows from the first table. Pages without a table fall back to
/// scanning the full text for dates.
fn parse_table_rows(source: Source, document: &Html) -> Vec<RawEventCandidate> {
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let (default_start, default_end) = source.default_hours();

    let Some(table) = document.select(&table_selector).next() else {
        log::info!("{}: no table found, scanning page text", source.slug());
        return parse_text_dates(source, document, &RE_NUMERIC_DATE);
    };

    let mut candidates = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(elem_text).collect();
        if cells.len() < 2 {
            continue;
        }
        let Some(date) = RE_NUMERIC_DATE.find(&cells[0]) else {
            continue;
        };

        let rest = cells[1..].join(" ");
        let mut times = RE_CLOCK_TIME.find_iter(&rest).map(|m| m.as_str());
        let start = times.next().unwrap_or(default_start);
        let end = times.next().unwrap_or(default_end);

        candidates.push(RawEventCandidate::new(
            source,
            date.as_str(),
            Some(start.to_string()),
            Some(end.to_string()),
        ));
    }

    candidates
}

fn parse_text_dates(source: Source, document: &Html, pattern: &Regex) -> Vec<RawEventCandidate> {
    let (start, end) = source.default_hours();
    let text = page_text(document);

    pattern
        .find_iter(&text)
        .map(|m| {
            RawEventCandidate::new(
                source,
                m.as_str(),
                Some(start.to_string()),
                Some(end.to_string()),
            )
        })
        .collect()
}
