use std::time::Instant;

use rusqlite::{params, Connection};

use crate::config::Browser;
use crate::history::{HistorySearcher, SearchOutcome};
use crate::locator::FixedPathLocator;
use crate::query::MAX_RESULTS;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn seed_store(path: &std::path::Path, rows: i64) {
    let mut conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE moz_places (
            id INTEGER PRIMARY KEY,
            url LONGVARCHAR,
            title LONGVARCHAR,
            last_visit_date INTEGER
        );",
    )
    .unwrap();
    let tx = conn.transaction().unwrap();
    for i in 0..rows {
        tx.execute(
            "INSERT INTO moz_places (id, url, title, last_visit_date) VALUES (?1, ?2, ?3, ?4)",
            params![
                i + 1,
                format!("https://example.com/docs/{i}"),
                format!("Document {i:05} reference"),
                1_700_000_000_000_000_i64 + i * 1_000_000
            ],
        )
        .unwrap();
    }
    tx.commit().unwrap();
}

#[test]
fn cold_load_search_p95_under_250ms() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("places.sqlite");
    seed_store(&path, 10_000);

    let searcher = HistorySearcher::new(
        Box::new(FixedPathLocator::new(&path)),
        Browser::Firefox,
        MAX_RESULTS,
    );

    for _ in 0..5 {
        let _ = searcher.search_outcome(Some("Document 0"));
    }

    let mut samples = Vec::with_capacity(40);
    for _ in 0..40 {
        let start = Instant::now();
        let outcome = searcher.search_outcome(Some("Document 0 reference"));
        samples.push(start.elapsed().as_secs_f64() * 1000.0);
        assert!(matches!(outcome, SearchOutcome::Results(ref rows) if rows.len() == MAX_RESULTS));
    }

    let p95 = p95_ms(&mut samples);
    assert!(p95 <= 250.0, "p95 too high: {p95:.3}ms (budget 250.0ms)");
}
