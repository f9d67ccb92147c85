//! Browsing core for public SpaceX launch data: one-shot collection fetch
//! with bounded retry, client-side filter/sort/paging, locally persisted
//! favorites, and a detail view that joins rocket, launchpad and payloads.

pub mod browser;
pub mod clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod repo;
pub mod services;
pub mod stats;
pub mod view;

#[cfg(test)]
mod testing;

pub use browser::{Browser, ListView};
pub use config::AppConfig;
pub use errors::{ApiError, ApiResult};
