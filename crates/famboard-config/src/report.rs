//! Results directory naming for the reporting layer.
//!
//! The directory name is computed once per process and exported through
//! `FAMBOARD_RESULTS_DIR`; whatever produces reports reads it from there.

use std::sync::OnceLock;

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

pub const RESULTS_DIR_ENV: &str = "FAMBOARD_RESULTS_DIR";

const RESULTS_DIR_FORMAT: &str = "results-%Y-%m-%d_%H-%M-%S";

/// `results-<YYYY-MM-DD_HH-MM-SS>` for the given instant.
pub fn results_dir_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(RESULTS_DIR_FORMAT).to_string()
}

/// The results directory for this run, computed on first use.
pub fn results_dir() -> &'static str {
    static DIR: OnceLock<String> = OnceLock::new();
    DIR.get_or_init(|| results_dir_name(&Local::now()))
}

/// Exports the results directory to the environment, once per process.
///
/// A value already present in the environment (set by a wrapper script)
/// wins and is returned instead.
pub fn export_results_dir() -> String {
    static EXPORTED: OnceLock<String> = OnceLock::new();
    EXPORTED
        .get_or_init(|| {
            if let Ok(existing) = std::env::var(RESULTS_DIR_ENV) {
                return existing;
            }
            let dir = results_dir().to_string();
            // SAFETY: runs once, guarded by the OnceLock, before any report
            // writer reads the variable; nothing else in the suite writes the
            // environment.
            unsafe {
                std::env::set_var(RESULTS_DIR_ENV, &dir);
            }
            info!("results will be saved to: {}", dir);
            dir
        })
        .clone()
}
