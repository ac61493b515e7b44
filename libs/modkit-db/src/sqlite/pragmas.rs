use sqlx::sqlite::{SqliteJournalMode, SqliteSynchronous};
use std::collections::HashMap;
use std::time::Duration;

fn journal_mode(s: &str) -> Option<SqliteJournalMode> {
    Some(match s.to_ascii_uppercase().as_str() {
        "DELETE" => SqliteJournalMode::Delete,
        "WAL" => SqliteJournalMode::Wal,
        "MEMORY" => SqliteJournalMode::Memory,
        "TRUNCATE" => SqliteJournalMode::Truncate,
        "PERSIST" => SqliteJournalMode::Persist,
        "OFF" => SqliteJournalMode::Off,
        _ => return None,
    })
}

fn synchronous(s: &str) -> Option<SqliteSynchronous> {
    Some(match s.to_ascii_uppercase().as_str() {
        "OFF" => SqliteSynchronous::Off,
        "NORMAL" => SqliteSynchronous::Normal,
        "FULL" => SqliteSynchronous::Full,
        "EXTRA" => SqliteSynchronous::Extra,
        _ => return None,
    })
}

/// Typed PRAGMA settings taken from a DSN. Invalid values are dropped with a warning.
#[derive(Debug, Default)]
pub(crate) struct Pragmas {
    pub journal_mode: Option<SqliteJournalMode>,
    pub synchronous: Option<SqliteSynchronous>,
    pub busy_timeout: Option<Duration>,
}

impl Pragmas {
    pub(crate) fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let mut p = Pragmas::default();
        for (key, value) in pairs {
            match key.as_str() {
                "journal_mode" => p.journal_mode = journal_mode(value),
                // Legacy toggle; an explicit journal_mode wins.
                "wal" if !pairs.contains_key("journal_mode") => {
                    p.journal_mode = match value.to_ascii_lowercase().as_str() {
                        "true" | "1" => Some(SqliteJournalMode::Wal),
                        "false" | "0" => Some(SqliteJournalMode::Delete),
                        _ => None,
                    }
                }
                "synchronous" => p.synchronous = synchronous(value),
                "busy_timeout" => {
                    p.busy_timeout = value.parse::<u64>().ok().map(Duration::from_millis)
                }
                _ => continue,
            }
            let applied = match key.as_str() {
                "journal_mode" | "wal" => p.journal_mode.is_some(),
                "synchronous" => p.synchronous.is_some(),
                "busy_timeout" => p.busy_timeout.is_some(),
                _ => true,
            };
            if !applied {
                tracing::warn!(pragma = %key, value = %value, "invalid SQLite PRAGMA value, ignoring");
            }
        }
        p
    }
}
