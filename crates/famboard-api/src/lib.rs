//! # famboard-api
//!
//! A minimal REST client for the API tests: one HTTP call per method, a
//! fixed base URL, an optional bearer token, JSON bodies. No retries, no
//! pagination, no caching. Responses come back as status + body for the
//! test to assert on; bodies are logged at debug level.
//!
//! ```ignore
//! let api = ApiClient::new("https://gorest.co.in/public/v2", Some(token))?;
//! let created = api.post("/users", &json!({ "name": "QA" })).await?;
//! assert_eq!(created.status(), StatusCode::CREATED);
//! ```

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResponse};
pub use error::{ApiError, Result};
pub use reqwest::{Method, StatusCode};
