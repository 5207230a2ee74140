use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;
use time::UtcOffset;
use time::macros::format_description;

const DEFAULT_LOG_FILE: &str = "lastfm-data.csv";
const DEFAULT_CACHE_DIR: &str = ".cache";

pub const RECORDS_CACHE: &str = "lastfm-data.json";
pub const TRACKS_CACHE: &str = "lastfm-grouped-scrobbles.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    pub log_path: PathBuf,
    pub cache_dir: PathBuf,
    pub utc_offset: UtcOffset,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            utc_offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }
}

impl StatsConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = env::var("SCROBSTAT_LOG") {
            config.log_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("SCROBSTAT_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Ok(offset) = env::var("SCROBSTAT_UTC_OFFSET") {
            config.utc_offset =
                parse_offset(&offset).context("invalid SCROBSTAT_UTC_OFFSET")?;
        }
        Ok(config)
    }

    pub fn ensure_cache_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("failed to create {}", self.cache_dir.display()))?;
        Ok(self.cache_dir.clone())
    }
}

pub fn parse_offset(text: &str) -> Result<UtcOffset> {
    UtcOffset::parse(
        text.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("{text:?} is not a +HH:MM offset"))
}
