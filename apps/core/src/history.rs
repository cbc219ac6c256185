use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use tracing::{debug, warn};

use crate::config::{Browser, Config};
use crate::locator::{locator_from_config, StoreLocator};
use crate::model::{ErrorView, HistoryEntry, SearchResult};
use crate::query::{HistoryQuery, MAX_RESULTS};
use crate::store::{self, StoreError};

const ROW_ARITY: usize = 4;

#[derive(Debug)]
pub enum SearchError {
    NotLocated,
    Store(StoreError),
    Query(rusqlite::Error),
    Row(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLocated => write!(f, "history store could not be located"),
            Self::Store(error) => write!(f, "store error: {error}"),
            Self::Query(error) => write!(f, "query error: {error}"),
            Self::Row(error) => write!(f, "row error: {error}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<StoreError> for SearchError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}

#[derive(Debug)]
pub enum SearchOutcome {
    Unavailable(SearchError),
    Empty,
    Results(Vec<HistoryEntry>),
}

impl SearchOutcome {
    pub fn into_result(self, browser: Browser) -> SearchResult<HistoryEntry> {
        match self {
            Self::Unavailable(_) => {
                SearchResult::unavailable(ErrorView::history_unavailable(browser.label()))
            }
            Self::Empty => SearchResult::settled(Vec::new()),
            Self::Results(entries) => SearchResult::settled(entries),
        }
    }
}

/// Blocking history search as seen by the live controller. Implementations
/// must fold every failure into the returned result.
pub trait HistorySource: Send + Sync + 'static {
    fn search(&self, query: &str) -> SearchResult<HistoryEntry>;
    fn unavailable_view(&self) -> ErrorView;
}

pub struct HistorySearcher {
    locator: Box<dyn StoreLocator>,
    browser: Browser,
    limit: usize,
}

impl HistorySearcher {
    pub fn new(locator: Box<dyn StoreLocator>, browser: Browser, limit: usize) -> Self {
        Self {
            locator,
            browser,
            limit: limit.min(MAX_RESULTS),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            locator_from_config(cfg),
            cfg.browser,
            cfg.max_results as usize,
        )
    }

    pub fn search_outcome(&self, query: Option<&str>) -> SearchOutcome {
        match self.run(query) {
            Ok(entries) if entries.is_empty() => SearchOutcome::Empty,
            Ok(entries) => SearchOutcome::Results(entries),
            Err(error) => {
                warn!(%error, "history search unavailable");
                SearchOutcome::Unavailable(error)
            }
        }
    }

    fn run(&self, query: Option<&str>) -> Result<Vec<HistoryEntry>, SearchError> {
        let path = self.locator.resolve_path().ok_or(SearchError::NotLocated)?;
        if !path.exists() {
            return Err(StoreError::Unavailable(path).into());
        }

        let conn = store::load(&path)?;
        let query = HistoryQuery::parse(query, self.limit);
        debug!(terms = query.terms.len(), limit = query.limit, "running history query");
        query_entries(&conn, &query)
    }
}

impl HistorySource for HistorySearcher {
    fn search(&self, query: &str) -> SearchResult<HistoryEntry> {
        self.search_outcome(Some(query)).into_result(self.browser)
    }

    fn unavailable_view(&self) -> ErrorView {
        ErrorView::history_unavailable(self.browser.label())
    }
}

pub fn query_entries(
    conn: &Connection,
    query: &HistoryQuery,
) -> Result<Vec<HistoryEntry>, SearchError> {
    let mut stmt = conn.prepare(&query.sql())?;
    if stmt.column_count() != ROW_ARITY {
        return Err(SearchError::Row(format!(
            "expected {ROW_ARITY} columns, got {}",
            stmt.column_count()
        )));
    }

    let rows = stmt.query_map(query.params(), map_row)?;
    let entries = rows
        .map(|row| row.map_err(|e| SearchError::Row(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Maps `(id, url, title, last_visit_date)`; the visit date is stored as
/// microseconds since the Unix epoch and may be NULL for unvisited places.
fn map_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let id: i64 = row.get(0)?;
    let url: String = row.get(1)?;
    let title: Option<String> = row.get(2)?;
    let last_visited = match row.get::<_, Option<i64>>(3)? {
        Some(micros) => micros_to_datetime(micros)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, micros))?,
        None => DateTime::<Utc>::UNIX_EPOCH,
    };

    Ok(HistoryEntry {
        id,
        url,
        title: title.unwrap_or_default(),
        last_visited,
    })
}

fn micros_to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
}

#[cfg(test)]
mod tests {
    use super::micros_to_datetime;

    #[test]
    fn converts_store_microseconds() {
        let ts = micros_to_datetime(1_700_000_000_123_456).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
        assert!(micros_to_datetime(i64::MAX).is_none());
    }
}
