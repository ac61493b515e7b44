use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::DbError;

/// PRAGMA keys accepted in the DSN query string; everything else is ignored.
const PRAGMA_KEYS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SqliteTarget {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedDsn {
    pub target: SqliteTarget,
    pub pragmas: HashMap<String, String>,
}

fn split_dsn(dsn: &str) -> Option<(&str, Option<&str>)> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    Some(match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    })
}

fn is_memory_path(path: &str) -> bool {
    matches!(path, ":memory:" | "memory:" | "")
}

/// `true` for `sqlite::memory:`, `sqlite://memory:` and any `mode=memory` DSN.
pub fn is_memory_dsn(dsn: &str) -> bool {
    let Some((path, query)) = split_dsn(dsn) else {
        return false;
    };
    is_memory_path(path)
        || query.is_some_and(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .any(|(k, v)| k.eq_ignore_ascii_case("mode") && v.eq_ignore_ascii_case("memory"))
        })
}

pub(crate) fn parse_sqlite_dsn(dsn: &str) -> Result<ParsedDsn, DbError> {
    let (path, query) = split_dsn(dsn).ok_or_else(|| DbError::UnknownDsn(dsn.to_string()))?;

    let mut pragmas = HashMap::new();
    if let Some(q) = query {
        for (k, v) in url::form_urlencoded::parse(q.as_bytes()) {
            let key = k.to_ascii_lowercase();
            if PRAGMA_KEYS.contains(&key.as_str()) {
                pragmas.insert(key, v.into_owned());
            } else {
                tracing::debug!(param = %k, "ignoring unsupported SQLite DSN parameter");
            }
        }
    }

    let target = if is_memory_dsn(dsn) {
        SqliteTarget::Memory
    } else {
        SqliteTarget::File(PathBuf::from(path))
    };
    Ok(ParsedDsn { target, pragmas })
}

/// Anchor a relative SQLite file DSN at `base_dir`. Memory and absolute DSNs,
/// and anything that is not a SQLite DSN, are returned unchanged.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> String {
    let Some((path, query)) = split_dsn(dsn) else {
        return dsn.to_string();
    };
    if is_memory_dsn(dsn) || Path::new(path).is_absolute() {
        return dsn.to_string();
    }

    let abs = base_dir.join(path);
    let mut out = format!("sqlite://{}", abs.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    out
}
