//! Logging for suite runs.
//!
//! Every test calls [`init_test_logging`] first; only the first call in a
//! process installs the subscriber. Output goes through the test writer so
//! `cargo test` captures it per test and shows it for failures.
//!
//! The filter comes from `RUST_LOG` when set, otherwise [`DEFAULT_FILTER`].
//! Step progress is logged at INFO, page/console detail at DEBUG:
//!
//! ```bash
//! RUST_LOG=famboard_e2e=debug,famboard_browser=debug cargo test -- --ignored
//! ```

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str =
    "famboard_e2e=info,famboard_browser=info,famboard_config=info,famboard_api=info";

/// Installs the global subscriber once per process.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        init_logger_with_filter(filter, !should_use_colors());
    });
}

/// Installs a subscriber with an explicit filter.
///
/// Does nothing if another subscriber is already installed.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_test_writer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A harness may have installed its own subscriber first.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Whether colored output should be used.
///
/// - `NO_COLOR` set: no colors
/// - `CI=true`: no colors (CI logs are read as plain text)
/// - `FORCE_COLOR` set: colors
/// - otherwise: whatever the terminal supports
pub fn should_use_colors() -> bool {
    color_choice(|name| std::env::var(name).ok(), || {
        console::Term::stdout().features().colors_supported()
    })
}

fn color_choice<F, T>(var: F, terminal_supports: T) -> bool
where
    F: Fn(&str) -> Option<String>,
    T: FnOnce() -> bool,
{
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CI").is_some_and(|v| v == "true") {
        return false;
    }
    if var("FORCE_COLOR").is_some() {
        return true;
    }
    terminal_supports()
}
