use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub last_visited: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(id: i64, url: &str, title: &str, last_visited: DateTime<Utc>) -> Self {
        Self {
            id,
            url: url.to_string(),
            title: title.to_string(),
            last_visited,
        }
    }
}

/// Presentation handle attached to a result when the history store cannot
/// be searched. Consumers decide how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorView {
    pub title: String,
    pub description: String,
}

impl ErrorView {
    pub fn history_unavailable(browser_label: &str) -> Self {
        Self {
            title: format!("{browser_label} history not available"),
            description: format!(
                "Could not read the {browser_label} history database. Check that {browser_label} is installed and the profile path in the config is correct."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<T> {
    pub data: Vec<T>,
    pub is_loading: bool,
    pub error_view: Option<ErrorView>,
}

impl<T> SearchResult<T> {
    pub fn loading() -> Self {
        Self {
            data: Vec::new(),
            is_loading: true,
            error_view: None,
        }
    }

    pub fn settled(data: Vec<T>) -> Self {
        Self {
            data,
            is_loading: false,
            error_view: None,
        }
    }

    pub fn unavailable(view: ErrorView) -> Self {
        Self {
            data: Vec::new(),
            is_loading: false,
            error_view: Some(view),
        }
    }

    pub fn is_empty_success(&self) -> bool {
        !self.is_loading && self.data.is_empty() && self.error_view.is_none()
    }
}

impl<T> Default for SearchResult<T> {
    fn default() -> Self {
        Self::loading()
    }
}
