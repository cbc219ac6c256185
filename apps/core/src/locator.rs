use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::config::Config;

pub const HISTORY_DB_FILE: &str = "places.sqlite";

/// Supplies the path of the history database to search. `None` means the
/// store could not be located at all.
pub trait StoreLocator: Send + Sync {
    fn resolve_path(&self) -> Option<PathBuf>;
}

pub struct FixedPathLocator {
    path: PathBuf,
}

impl FixedPathLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StoreLocator for FixedPathLocator {
    fn resolve_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

pub struct ProfileLocator {
    profile_dir: Option<PathBuf>,
    profiles_root: Option<PathBuf>,
}

impl ProfileLocator {
    pub fn new(profile_dir: Option<PathBuf>, profiles_root: Option<PathBuf>) -> Self {
        Self {
            profile_dir,
            profiles_root,
        }
    }
}

impl StoreLocator for ProfileLocator {
    fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.profile_dir {
            return Some(dir.join(HISTORY_DB_FILE));
        }
        self.profiles_root.as_deref().and_then(newest_store_under)
    }
}

pub fn locator_from_config(cfg: &Config) -> Box<dyn StoreLocator> {
    if let Some(path) = &cfg.history_db_path {
        return Box::new(FixedPathLocator::new(path.clone()));
    }
    Box::new(ProfileLocator::new(
        cfg.profile_dir.clone(),
        cfg.profiles_root(),
    ))
}

/// Picks the most recently modified `places.sqlite` among the profile
/// folders directly under `root`.
fn newest_store_under(root: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<(SystemTime, PathBuf)> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == HISTORY_DB_FILE)
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.into_path())
        })
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    candidates.into_iter().next().map(|(_, path)| path)
}
