#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const BASE_MICROS: i64 = 1_700_000_000_000_000;

pub struct PlaceRow<'a> {
    pub id: i64,
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub last_visit_date: Option<i64>,
}

impl<'a> PlaceRow<'a> {
    pub fn visited(id: i64, title: &'a str, minutes_after_base: i64) -> Self {
        Self {
            id,
            url: "https://example.com/",
            title: Some(title),
            last_visit_date: Some(BASE_MICROS + minutes_after_base * 60_000_000),
        }
    }
}

/// A temporary profile directory holding a Firefox-shaped `places.sqlite`.
pub struct FixtureStore {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl FixtureStore {
    pub fn new(rows: &[PlaceRow<'_>]) -> Self {
        Self::with_journal(rows, "DELETE")
    }

    pub fn with_journal(rows: &[PlaceRow<'_>], journal_mode: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.sqlite");
        write_places(&path, rows, journal_mode);
        Self { dir, path }
    }

    pub fn titled(titles: &[&str]) -> Self {
        let rows: Vec<PlaceRow<'_>> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| PlaceRow::visited(i as i64 + 1, title, i as i64))
            .collect();
        Self::new(&rows)
    }
}

pub fn write_places(path: &Path, rows: &[PlaceRow<'_>], journal_mode: &str) {
    let conn = Connection::open(path).unwrap();
    let _: String = conn
        .query_row(&format!("PRAGMA journal_mode = {journal_mode}"), [], |row| row.get(0))
        .unwrap();
    conn.execute_batch(
        "CREATE TABLE moz_places (
            id INTEGER PRIMARY KEY,
            url LONGVARCHAR,
            title LONGVARCHAR,
            rev_host LONGVARCHAR,
            visit_count INTEGER DEFAULT 0,
            last_visit_date INTEGER
        );",
    )
    .unwrap();
    for row in rows {
        conn.execute(
            "INSERT INTO moz_places (id, url, title, last_visit_date) VALUES (?1, ?2, ?3, ?4)",
            params![row.id, row.url, row.title, row.last_visit_date],
        )
        .unwrap();
    }
}
