use crate::config::{LoggingConfig, Section};
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 50;
const DEFAULT_MAX_BACKUPS: usize = 5;

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// `true` when `target` is `prefix` itself or a module path below it.
fn matches_target(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

type SharedRotate = Arc<Mutex<FileRotate<AppendTimestamp>>>;

#[derive(Clone)]
struct RotHandle(Option<SharedRotate>);

impl Write for RotHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(f) => f.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(f) => f.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Routes each record to the file of the longest matching target section,
/// falling back to the `default` file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_target: Vec<(String, SharedRotate)>,
}

impl FileRouter {
    fn resolve(&self, target: &str) -> Option<SharedRotate> {
        self.by_target
            .iter()
            .filter(|(prefix, _)| matches_target(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RotHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RotHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RotHandle(self.resolve(meta.target()))
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(section: &Section, base_dir: &Path) -> std::io::Result<Option<SharedRotate>> {
    if section.file.trim().is_empty() {
        return Ok(None);
    }
    let path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let rot = FileRotate::new(
        &path,
        AppendTimestamp::default(FileLimit::MaxFiles(
            section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS),
        )),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Some(Arc::new(Mutex::new(rot))))
}

/// Console and file target filters derived from the config sections.
fn build_targets(cfg: &LoggingConfig) -> (Targets, Targets) {
    let mut console = Targets::new().with_default(LevelFilter::OFF);
    let mut file = Targets::new().with_default(LevelFilter::OFF);

    if let Some(default) = cfg.get(DEFAULT_SECTION) {
        console = console.with_default(parse_level(&default.console_level));
        if !default.file.trim().is_empty() {
            file = file.with_default(parse_level(&default.file_level));
        }
    }

    for (target, section) in cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION) {
        console = console.with_target(target.clone(), parse_level(&section.console_level));
        // Without its own file a section still feeds the default file at its file level.
        if !section.file.trim().is_empty() || cfg.contains_key(DEFAULT_SECTION) {
            file = file.with_target(target.clone(), parse_level(&section.file_level));
        }
    }

    (console, file)
}

fn build_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    for (target, section) in cfg {
        match open_rotating(section, base_dir) {
            Ok(Some(writer)) if target == DEFAULT_SECTION => router.default = Some(writer),
            Ok(Some(writer)) => router.by_target.push((target.clone(), writer)),
            Ok(None) => {}
            Err(e) => eprintln!(
                "failed to open log file '{}' for '{}': {}",
                section.file, target, e
            ),
        }
    }
    router
}

/// Install the global subscriber. Relative log files resolve against `base_dir`
/// (normally `server.home_dir`). Safe to call more than once; later calls are no-ops.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` records from dependencies into tracing.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let (console_targets, file_targets) = build_targets(cfg);
    let router = build_router(cfg, base_dir);

    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let file = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(file_targets)
    });

    let _ = Registry::default().with(console).with(file).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "debug".into(),
            file: file.into(),
            file_level: "warn".into(),
            max_age_days: None,
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_parsing_is_case_insensitive_with_info_fallback() {
        assert_eq!(parse_level("TRACE"), LevelFilter::TRACE);
        assert_eq!(parse_level(" Debug "), LevelFilter::DEBUG);
        assert_eq!(parse_level("warning"), LevelFilter::WARN);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
    }

    #[test]
    fn target_prefix_matching_respects_module_boundaries() {
        assert!(matches_target("tasks", "tasks"));
        assert!(matches_target("tasks::domain::service", "tasks"));
        assert!(!matches_target("tasks_extra", "tasks"));
        assert!(!matches_target("accounts", "tasks"));
    }

    #[test]
    fn router_prefers_the_longest_matching_section() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("tasks".into(), section("logs/tasks.log"));
        cfg.insert("tasks::api".into(), section("logs/tasks-api.log"));

        let router = build_router(&cfg, tmp.path());
        assert!(router.default.is_some());
        assert_eq!(router.by_target.len(), 2);

        let api = router.resolve("tasks::api::rest::handlers").unwrap();
        let tasks = router.resolve("tasks::domain").unwrap();
        let other = router.resolve("sqlx::query").unwrap();
        assert!(!Arc::ptr_eq(&api, &tasks));
        assert!(Arc::ptr_eq(&other, router.default.as_ref().unwrap()));

        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn empty_file_disables_the_sink() {
        let tmp = tempdir().unwrap();
        assert!(open_rotating(&section(""), tmp.path()).unwrap().is_none());
        assert!(open_rotating(&section("a/b/c.log"), tmp.path())
            .unwrap()
            .is_some());
        assert!(tmp.path().join("a/b").is_dir());
    }

    #[test]
    fn relative_paths_resolve_under_base_dir() {
        let tmp = tempdir().unwrap();
        let p = resolve_log_path("logs/x.log", tmp.path());
        assert!(p.starts_with(tmp.path()));
        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(abs.to_str().unwrap(), Path::new("/ignored")), abs);
    }
}
