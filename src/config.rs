use crate::domain::ports::SharedLedgerStore;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryLedgerStore;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// What the binary prints once every command has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Report {
    #[default]
    Accounts,
    Transfers,
}

/// Runtime configuration. Every option can also come from the environment.
#[derive(Debug, Clone, Args)]
pub struct LedgerConfig {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LEDGER_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log filter directive, overridden by RUST_LOG.
    #[arg(long, env = "LEDGER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LEDGER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, env = "LEDGER_REPORT", value_enum, default_value_t = Report::Accounts)]
    pub report: Report,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            report: Report::Accounts,
        }
    }
}

impl LedgerConfig {
    /// Builds the configured store: RocksDB when a database path is set,
    /// in-memory otherwise.
    pub fn open_store(&self) -> Result<SharedLedgerStore> {
        match &self.db_path {
            None => Ok(Arc::new(InMemoryLedgerStore::new())),
            Some(path) => open_persistent(path),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: &std::path::Path) -> Result<SharedLedgerStore> {
    let store = crate::infrastructure::rocksdb::RocksDBStore::open(path)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(path: &std::path::Path) -> Result<SharedLedgerStore> {
    Err(crate::error::LedgerError::storage(format!(
        "cannot open {}: built without the storage-rocksdb feature",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AccountStore, LedgerStore};
    use crate::error::LedgerError;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: LedgerConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["p2p-ledger"]).unwrap();
        assert_eq!(cli.config.db_path, None);
        assert_eq!(cli.config.log_format, LogFormat::Text);
        assert_eq!(cli.config.report, Report::Accounts);
    }

    #[test]
    fn test_flags() {
        let cli = TestCli::try_parse_from([
            "p2p-ledger",
            "--log-format",
            "json",
            "--report",
            "transfers",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.config.log_format, LogFormat::Json);
        assert_eq!(cli.config.report, Report::Transfers);
        assert_eq!(cli.config.log_level, "debug");
    }

    #[tokio::test]
    async fn test_in_memory_store_by_default() {
        let store = LedgerConfig::default().open_store().unwrap();
        let uow = store.begin().await.unwrap();
        assert!(uow.list_accounts().await.unwrap().is_empty());
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    #[test]
    fn test_db_path_requires_rocksdb_feature() {
        let config = LedgerConfig {
            db_path: Some(PathBuf::from("/tmp/ledger-db")),
            ..LedgerConfig::default()
        };
        assert!(matches!(config.open_store(), Err(LedgerError::Storage(_))));
    }
}
