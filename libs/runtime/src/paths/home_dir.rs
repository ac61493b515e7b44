use std::env;
use std::path::{Path, PathBuf};

#[cfg(target_os = "windows")]
const PLATFORM_HOME: &str = "%APPDATA%";
#[cfg(not(target_os = "windows"))]
const PLATFORM_HOME: &str = "$HOME";

#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory (set {0})")]
    NoHome(&'static str),
    #[error("failed to get current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `%APPDATA%` on Windows, the user home elsewhere.
fn platform_home() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    let dir = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let dir = dirs::home_dir();
    dir.ok_or(HomeDirError::NoHome(PLATFORM_HOME))
}

/// Resolve the application home directory into an absolute path.
///
/// `None` maps to `<platform home>/<default_subdir>`. A leading `~` is expanded
/// and relative paths are anchored at the current working directory.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured {
        None => platform_home()?.join(default_subdir),
        Some(raw) => expand(raw.trim())?,
    };

    if create {
        std::fs::create_dir_all(&path).map_err(|source| HomeDirError::Create {
            path: path.clone(),
            source,
        })?;
    }
    Ok(path)
}

fn expand(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    let p = Path::new(raw);
    if p.is_absolute() {
        Ok(p.to_path_buf())
    } else {
        Ok(env::current_dir()
            .map_err(HomeDirError::CurrentDir)?
            .join(p))
    }
}
