#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::NaiveDate;
use habit_core::{
    config::{Config, ConfigManager},
    core::{FixedClock, TrackerEngine},
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// 2024-03-06, a Wednesday.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
}

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn config_for(base: &Path) -> Config {
    Config {
        data_dir: Some(base.join("data")),
        backup_retention: 3,
        ..Config::default()
    }
}

pub fn open_engine(base: &Path) -> TrackerEngine {
    open_engine_on(base, today())
}

pub fn open_engine_on(base: &Path, day: NaiveDate) -> TrackerEngine {
    let config = config_for(base);
    let storage = JsonStorage::from_config(&config).expect("create json storage backend");
    TrackerEngine::open(Box::new(storage), Box::new(FixedClock::new(day)), &config)
        .expect("open engine")
}

/// Creates an isolated engine and config manager backed by a unique directory.
pub fn setup_test_env() -> (TrackerEngine, ConfigManager, PathBuf) {
    let base = temp_base();
    let engine = open_engine(&base);
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (engine, config_manager, base)
}
