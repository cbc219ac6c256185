/// Hard cap on the number of history rows a single search returns.
pub const MAX_RESULTS: usize = 30;

const SELECT_COLUMNS: &str = "SELECT id, url, title, last_visit_date FROM moz_places";
const ORDER_BY: &str = "ORDER BY last_visit_date DESC";
const TERM_FILTER: &str = "NOT EXISTS (SELECT 1 FROM json_each(?1) \
     WHERE coalesce(instr(moz_places.title, json_each.value), 0) = 0)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub raw: String,
    pub terms: Vec<String>,
    pub limit: usize,
}

impl HistoryQuery {
    /// Splits trimmed input on single spaces. Every resulting term must
    /// appear in the title, so `"a  b"` also carries an empty term.
    pub fn parse(query: Option<&str>, limit: usize) -> Self {
        let raw = query.unwrap_or_default().trim().to_string();
        let terms = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(' ').map(str::to_string).collect()
        };

        Self {
            raw,
            terms,
            limit: limit.clamp(1, MAX_RESULTS),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms are bound together as one JSON array in `?1` and the limit in
    /// `?2`, so the statement depth does not grow with the term count. A NULL
    /// title never satisfies a term.
    pub fn sql(&self) -> String {
        if self.is_unfiltered() {
            return format!("{SELECT_COLUMNS} {ORDER_BY} LIMIT ?2");
        }
        format!("{SELECT_COLUMNS} WHERE {TERM_FILTER} {ORDER_BY} LIMIT ?2")
    }

    pub fn params(&self) -> (String, usize) {
        let terms = serde_json::Value::from(self.terms.clone()).to_string();
        (terms, self.limit)
    }
}
