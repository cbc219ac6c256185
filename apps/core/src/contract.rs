use serde::{Deserialize, Serialize};

use crate::model::{ErrorView, HistoryEntry, SearchResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItemDto {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub last_visited: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchStateDto {
    Loading { query: String },
    Results { query: String, results: Vec<HistoryItemDto> },
    Empty { query: String },
    Unavailable { query: String, error: ErrorView },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionResponseDto {
    Opened { target: String },
    Failed { message: String },
}

impl From<&HistoryEntry> for HistoryItemDto {
    fn from(value: &HistoryEntry) -> Self {
        Self {
            id: value.id,
            url: value.url.clone(),
            title: value.title.clone(),
            last_visited: value.last_visited.to_rfc3339(),
        }
    }
}

impl SearchStateDto {
    pub fn from_result(query: &str, result: &SearchResult<HistoryEntry>) -> Self {
        let query = query.to_string();
        if result.is_loading {
            return Self::Loading { query };
        }
        if let Some(error) = &result.error_view {
            return Self::Unavailable {
                query,
                error: error.clone(),
            };
        }
        if result.data.is_empty() {
            return Self::Empty { query };
        }
        Self::Results {
            query,
            results: result.data.iter().map(HistoryItemDto::from).collect(),
        }
    }
}
