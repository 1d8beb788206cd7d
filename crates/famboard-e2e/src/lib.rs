//! # famboard-e2e
//!
//! End-to-end suite for the family organizer: page objects, the actor
//! session and the family lifecycle journey.
//!
//! ## Layers
//!
//! - [`pages`]: `LoginPage` and `FamilyAppPage`, written against
//!   [`famboard_browser::Driver`]
//! - [`session`]: which identity is logged in on the shared page
//! - [`journey`]: the ordered, stateful family lifecycle script
//! - [`harness`]: settings, browser launch and per-test page lifecycle
//!
//! Browser scenarios need Chrome and a reachable app. They share one
//! browser and only run when `--ignored` is passed:
//!
//! ```bash
//! FAMBOARD_APP_URL=http://localhost:5500/index.html cargo test -p famboard-e2e -- --ignored
//! ```

pub mod data;
pub mod error;
pub mod harness;
pub mod journey;
pub mod logging;
pub mod pages;
pub mod selectors;
pub mod session;

pub use data::{JourneyArtifacts, TestData, run_token};
pub use error::{E2eError, Result, ensure};
pub use harness::SuiteHarness;
pub use journey::{Journey, JourneyStep, SessionContext};
pub use logging::init_test_logging;
pub use pages::{AppWaits, FamilyAppPage, LoginPage, TaskRecord, TaskState};
pub use session::{ActorSession, SessionState};
