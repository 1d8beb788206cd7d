pub mod credentials;
pub mod error;
pub mod report;
pub mod settings;

// Re-export main types
pub use credentials::*;
pub use error::*;
pub use report::{export_results_dir, results_dir, results_dir_name, RESULTS_DIR_ENV};
pub use settings::*;
