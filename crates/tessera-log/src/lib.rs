//! Structured logging for the terrain engine.
//!
//! Console output with uptime timestamps, plus a JSON log file in debug
//! builds. The level comes from `RUST_LOG` when set, otherwise from the
//! `debug.log_level` config setting.

use std::path::Path;

use tessera_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";
const LOG_FILE: &str = "tessera.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - supplies the fallback level when `RUST_LOG` is unset
///
/// ```no_run
/// use tessera_config::Config;
/// use tessera_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directives for the given config, falling back to the default
/// `info` level with quiet GPU backends.
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_gpu_backends() {
        let filter_str = EnvFilter::new(filter_directives(None)).to_string();
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_config_level_used() {
        let mut config = Config::default();
        config.debug.log_level = "debug,tessera_mesh=trace".to_string();
        assert_eq!(filter_directives(Some(&config)), "debug,tessera_mesh=trace");
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for filter_str in [
            "info",
            "debug,tessera_lod=trace",
            "warn,tessera_brush=debug,tessera_splat=trace",
            "error",
        ] {
            assert!(
                EnvFilter::try_new(filter_str).is_ok(),
                "failed to parse filter: {filter_str}"
            );
        }
    }

    #[test]
    fn test_log_dir_can_be_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        std::fs::create_dir_all(&log_dir).unwrap();
        std::fs::File::create(log_dir.join(LOG_FILE)).unwrap();
        assert!(log_dir.join(LOG_FILE).exists());
    }
}
