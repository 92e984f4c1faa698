//! This crate provides a small read-only HTTP API over a precomputed climate dataset. The dataset
//! is a SQLite file with a `measurement` table (daily precipitation and temperature observations
//! per station) and a `station` table.
//!
//! The API exposes:
//!
//! * precipitation over the trailing 12 months of data
//! * the list of stations
//! * temperature observations of the most active station over the trailing 12 months
//! * daily minimum, average and maximum temperature from a start date, optionally up to an end
//!   date
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs serialisation of JSON response data.
//! * [rusqlite] provides read-only access to the SQLite dataset.
//! * [chrono] handles calendar dates.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod metrics;
pub mod models;
pub mod queries;
pub mod query;
pub mod resource_manager;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod types;
pub mod validated_path;
