use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "fozboy.log";
const LOG_RETENTION_DAYS: u64 = 7;

/// Return the log directory path.
///
/// Precedence: `FOZBOY_LOG_DIR` env var > platform default.
/// macOS: `~/Library/Logs/fozboy/`
/// Linux: `$XDG_DATA_HOME/fozboy/logs/` or `~/.local/share/fozboy/logs/`
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FOZBOY_LOG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library").join("Logs").join("fozboy");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Some(data) = dirs::data_dir() {
            return data.join("fozboy").join("logs");
        }
    }

    PathBuf::from("logs")
}

/// Remove rolled log files older than `max_age_days`.
///
/// Only names starting with the appender prefix are touched, so a shared
/// log directory keeps its other files.
fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry
            .file_name()
            .to_string_lossy()
            .starts_with(LOG_FILE_PREFIX)
        {
            continue;
        }
        let modified = entry.metadata().and_then(|meta| meta.modified());
        if matches!(modified, Ok(time) if time < cutoff) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Initialize file logging. Keep the returned guard alive until exit so
/// buffered lines are flushed.
///
/// Filter controlled by `FOZBOY_LOG` or `RUST_LOG` (default: `info`).
/// Output goes to a daily rolling file in `log_dir()` only; stdout is owned
/// by the terminal UI.
pub fn init() -> WorkerGuard {
    let filter = EnvFilter::try_from_env("FOZBOY_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!(
            "warning: failed to create log directory {:?}: {}",
            log_path, e
        );
    }

    cleanup_old_logs(&log_path, LOG_RETENTION_DAYS);

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_path, LOG_FILE_PREFIX));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid data races.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn log_dir_respects_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = std::env::var("FOZBOY_LOG_DIR").ok();

        std::env::set_var("FOZBOY_LOG_DIR", "/tmp/fozboy-test-logs");
        assert_eq!(log_dir(), PathBuf::from("/tmp/fozboy-test-logs"));

        match original {
            Some(v) => std::env::set_var("FOZBOY_LOG_DIR", v),
            None => std::env::remove_var("FOZBOY_LOG_DIR"),
        }
    }

    #[test]
    fn log_dir_defaults_to_fozboy_subdir() {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = std::env::var("FOZBOY_LOG_DIR").ok();

        std::env::remove_var("FOZBOY_LOG_DIR");
        let dir = log_dir();
        assert!(
            dir.components().any(|c| c.as_os_str() == "fozboy") || dir == PathBuf::from("logs"),
            "unexpected log dir {:?}",
            dir
        );

        if let Some(v) = original {
            std::env::set_var("FOZBOY_LOG_DIR", v);
        }
    }

    #[test]
    fn cleanup_old_logs_removes_stale_files() {
        let tmp = std::env::temp_dir().join("fozboy-test-cleanup");
        let _ = std::fs::create_dir_all(&tmp);

        let old_a = tmp.join("fozboy.log.2025-01-01");
        let old_b = tmp.join("fozboy.log.2025-01-02");
        let other = tmp.join("other.txt");
        std::fs::write(&old_a, "a").unwrap();
        std::fs::write(&old_b, "b").unwrap();
        std::fs::write(&other, "c").unwrap();

        // max_age_days=0 puts the cutoff at "now", so every matching file goes.
        cleanup_old_logs(&tmp, 0);
        assert!(!old_a.exists());
        assert!(!old_b.exists());
        assert!(other.exists(), "unrelated file should be preserved");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn cleanup_old_logs_missing_dir_is_noop() {
        cleanup_old_logs(Path::new("/nonexistent/fozboy/logs"), 0);
    }
}
