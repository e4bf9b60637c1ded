use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    config::Config,
    core::{
        errors::{Result, TrackerError},
        utils::{ensure_dir, replace_file, write_atomic, PathResolver},
    },
    domain::{TrackerBook, CURRENT_SCHEMA_VERSION},
};

use super::StorageBackend;

const BACKUP_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "trackers";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for the tracker book and its backups.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    data_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    backup_on_save: bool,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            data_file: PathResolver::data_file_in(&app_root),
            root: app_root,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
            backup_on_save: true,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut storage = Self::new(
            Some(config.resolve_data_dir()),
            Some(config.backup_retention),
        )?;
        storage.backup_on_save = config.backup_on_save;
        Ok(storage)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn data_path(&self) -> &Path {
        &self.data_file
    }

    pub fn backup_path(&self, backup_name: &str) -> PathBuf {
        self.backups_dir.join(backup_name)
    }

    /// Writes a timestamped copy of `book` into the backups directory.
    pub fn backup(&self, book: &TrackerBook, note: Option<&str>) -> Result<PathBuf> {
        ensure_dir(&self.backups_dir)?;
        let mut file_stem = format!("{}_{}", BACKUP_PREFIX, backup_timestamp());
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = self
            .backups_dir
            .join(format!("{}.{}", file_stem, BACKUP_EXTENSION));
        write_atomic(&path, &serialize_book(book)?)?;
        self.prune_backups()?;
        info!(path = %path.display(), "backup written");
        Ok(path)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    /// Replaces the live data file with a backup and returns its contents.
    pub fn restore(&self, backup_name: &str) -> Result<TrackerBook> {
        let backup_path = self.backup_path(backup_name);
        if !backup_path.exists() {
            return Err(TrackerError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let book = load_book_from_path(&backup_path)?;
        save_book_to_path(&book, &self.data_file)?;
        info!(backup = backup_name, "backup restored");
        Ok(book)
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.data_file.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let backup_name = format!(
            "{}_{}.{}",
            BACKUP_PREFIX,
            backup_timestamp(),
            BACKUP_EXTENSION
        );
        fs::copy(&self.data_file, self.backups_dir.join(&backup_name))?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for entry in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(entry));
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<TrackerBook>> {
        if !self.data_file.exists() {
            debug!(path = %self.data_file.display(), "no tracker data yet");
            return Ok(None);
        }
        load_book_from_path(&self.data_file).map(Some)
    }

    fn save(&self, book: &TrackerBook) -> Result<()> {
        if self.backup_on_save {
            self.backup_existing_file()?;
        }
        save_book_to_path(book, &self.data_file)
    }
}

pub fn save_book_to_path(book: &TrackerBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    replace_file(path, &serialize_book(book)?)
}

pub fn load_book_from_path(path: &Path) -> Result<TrackerBook> {
    let data = fs::read_to_string(path)?;
    let book: TrackerBook = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(TrackerError::Storage(format!(
            "`{}` uses schema version {}, newer than supported version {}",
            path.display(),
            book.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(book)
}

fn serialize_book(book: &TrackerBook) -> Result<String> {
    Ok(serde_json::to_string_pretty(book)?)
}

fn backup_timestamp() -> String {
    Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let segments: Vec<&str> = stem.split('_').collect();
    let (date, time) = segments
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .find(|(date, time)| is_digits(date, 8) && is_digits(time, 4))?;
    NaiveDateTime::parse_from_str(&format!("{}{}", date, time), "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
