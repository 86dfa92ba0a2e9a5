//! Configuration loading and representation.
//!
//! Everything is read from `STOCKROOM_*` environment variables; anything
//! missing or unparseable falls back to its default with a warning.

use core::str::FromStr;

/// How read-modify-write operations (add, increment, decrement) guard
/// against concurrent writers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Pin each write to the revision that was read; re-read and retry on conflict.
    #[default]
    CompareAndSwap,
    /// Unconditional writes. Two concurrent updates to one item can lose one of them.
    LastWriteWins,
}

impl FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cas" | "compare-and-swap" => Ok(Self::CompareAndSwap),
            "lww" | "last-write-wins" => Ok(Self::LastWriteWins),
            other => Err(format!("unknown concurrency mode: {other}")),
        }
    }
}

/// What `update_metadata` does when the item does not exist.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MissingItemPolicy {
    /// Fail with `NotFound`.
    #[default]
    Fail,
    /// Write a bare record holding only the metadata fields.
    CreateBare,
}

impl FromStr for MissingItemPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "create" | "create-bare" => Ok(Self::CreateBare),
            other => Err(format!("unknown missing-item policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project: Option<String>,
    pub database: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project: None,
            database: "(default)".to_string(),
            api_key: None,
            base_url: "https://firestore.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Collection holding one document per item.
    pub collection: String,
    pub concurrency: ConcurrencyMode,
    /// Extra attempts after a compare-and-swap conflict.
    pub max_conflict_retries: u32,
    pub missing_item: MissingItemPolicy,
    pub firestore: FirestoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: "inventory".to_string(),
            concurrency: ConcurrencyMode::default(),
            max_conflict_retries: 3,
            missing_item: MissingItemPolicy::default(),
            firestore: FirestoreConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(collection) = var("STOCKROOM_COLLECTION") {
            config.collection = collection;
        }
        parse_into(&var, "STOCKROOM_CONCURRENCY", &mut config.concurrency);
        parse_into(&var, "STOCKROOM_MAX_CONFLICT_RETRIES", &mut config.max_conflict_retries);
        parse_into(&var, "STOCKROOM_MISSING_ITEM", &mut config.missing_item);

        config.firestore.project = var("STOCKROOM_FIRESTORE_PROJECT");
        config.firestore.api_key = var("STOCKROOM_FIRESTORE_API_KEY");
        if let Some(database) = var("STOCKROOM_FIRESTORE_DATABASE") {
            config.firestore.database = database;
        }
        if let Some(base_url) = var("STOCKROOM_FIRESTORE_BASE_URL") {
            config.firestore.base_url = base_url;
        }

        config
    }
}

fn parse_into<T, F>(var: &F, key: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(key) else {
        return;
    };
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(e) => tracing::warn!(key, value = %raw, error = %e, "ignoring invalid setting; using default"),
    }
}
