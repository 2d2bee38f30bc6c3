//! Collection pipelines for the nivesh datasets.
//!
//! One process executes one fetch-normalize-merge-store cycle per dataset
//! and exits. No locking is provided; running two collection jobs against
//! the same dataset concurrently is out of scope.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use logging::init_logging;
