use std::path::PathBuf;

use crate::reports::DEFAULT_TOP_LIMIT;
use crate::view::DEFAULT_PAGE_SIZE;

const APP_DIR: &str = "datafoot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: Option<PathBuf>,
    pub top_limit: usize,
    pub page_size: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: crate::store::default_db_path(),
            top_limit: DEFAULT_TOP_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load `.env.local` / `.env` if present, then read `DATAFOOT_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let db_path = lookup("DATAFOOT_DB")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .or(defaults.db_path);
        let top_limit = lookup("DATAFOOT_TOP_LIMIT")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.top_limit)
            .max(1);
        let page_size = lookup("DATAFOOT_PAGE_SIZE")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.page_size)
            .max(1);
        let log_filter = lookup("DATAFOOT_LOG")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.log_filter);
        Self {
            db_path,
            top_limit,
            page_size,
            log_filter,
        }
    }
}

pub fn app_data_dir() -> Option<PathBuf> {
    // Prefer XDG data dir.
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".local").join("share").join(APP_DIR))
}
