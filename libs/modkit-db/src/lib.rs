//! SQLite connection handle shared by TaskMind modules.
//!
//! A [`DbHandle`] owns one sqlx pool. File databases get WAL journaling and a
//! busy timeout unless the DSN says otherwise; in-memory databases are pinned
//! to a single long-lived connection because every SQLite connection to
//! `:memory:` opens its own empty database.
//!
//! ```rust,no_run
//! # async fn demo() -> modkit_db::Result<()> {
//! use modkit_db::{ConnectOpts, DbHandle};
//!
//! let db = DbHandle::connect("sqlite://database/taskmind.db", ConnectOpts::default()).await?;
//! sqlx::query("SELECT 1").execute(db.pool()).await?;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

pub use sqlite::{absolutize_sqlite_dsn, is_memory_dsn};
use sqlite::{parse_sqlite_dsn, Pragmas, SqliteTarget};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Pool tuning. Ignored where it makes no sense for in-memory databases.
#[derive(Debug, Clone)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    /// Overridden by a `busy_timeout` DSN parameter.
    pub busy_timeout: Option<Duration>,
    /// For file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            busy_timeout: None,
            create_sqlite_dirs: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbHandle {
    pool: SqlitePool,
    dsn: String,
    memory: bool,
}

impl DbHandle {
    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let parsed = parse_sqlite_dsn(dsn)?;
        let pragmas = Pragmas::from_pairs(&parsed.pragmas);

        let (connect, memory) = match &parsed.target {
            SqliteTarget::Memory => {
                let o = SqliteConnectOptions::from_str("sqlite::memory:")?
                    .journal_mode(pragmas.journal_mode.unwrap_or(SqliteJournalMode::Memory));
                (o, true)
            }
            SqliteTarget::File(path) => {
                if opts.create_sqlite_dirs {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let o = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(pragmas.journal_mode.unwrap_or(SqliteJournalMode::Wal))
                    .busy_timeout(
                        pragmas
                            .busy_timeout
                            .or(opts.busy_timeout)
                            .unwrap_or(DEFAULT_BUSY_TIMEOUT),
                    );
                (o, false)
            }
        };
        let connect = connect
            .synchronous(pragmas.synchronous.unwrap_or(SqliteSynchronous::Normal))
            .foreign_keys(true);

        let mut pool_opts = SqlitePoolOptions::new();
        if let Some(t) = opts.acquire_timeout {
            pool_opts = pool_opts.acquire_timeout(t);
        }
        pool_opts = if memory {
            pool_opts
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_opts.max_connections(opts.max_conns.unwrap_or(10).max(1))
        };

        let pool = pool_opts.connect_with(connect).await?;
        tracing::debug!(dsn = %dsn, memory, "SQLite pool ready");

        Ok(Self {
            pool,
            dsn: dsn.to_string(),
            memory,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn is_memory(&self) -> bool {
        self.memory
    }

    /// Apply a module's embedded migrations. Several modules share one
    /// migrations table, so versions owned by other modules are tolerated.
    pub async fn run_migrations(&self, mut migrator: Migrator) -> Result<()> {
        migrator.set_ignore_missing(true);
        migrator.run(&self.pool).await?;
        Ok(())
    }

    /// Graceful pool close.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
