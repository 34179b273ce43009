use std::any::Any;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialize the logging system with JSON formatting and environment-based filtering.
///
/// `RUST_LOG` wins when set. Otherwise `configured` (the config file's
/// `log_level`) is used, then [`DEFAULT_LOG_LEVEL`].
pub fn init_normal_logging(configured: Option<&str>) {
    fmt()
        .with_env_filter(build_filter(configured))
        .json()
        .flatten_event(true)
        .init();
}

pub fn init_logging(configured: Option<&str>) {
    // If tokio-console is enabled, DO NOT install the normal subscriber
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        init_console_logging();
    } else {
        init_normal_logging(configured);
    }
}

fn init_console_logging() {
    console_subscriber::init();
}

fn build_filter(configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    configured
        .map(normalize_level)
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Accepts the level names older config files use (`WARNING`, `CRITICAL`).
pub fn normalize_level(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

/// Log panics through `tracing` before the default hook runs.
///
/// Release builds abort on panic, so this is the only structured record of one.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
        let thread = std::thread::current();

        tracing::error!(
            panic = panic_message(info.payload()),
            location = location.as_deref().unwrap_or("unknown"),
            thread = thread.name().unwrap_or("unnamed"),
            "panic"
        );

        default_hook(info);
    }));
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
