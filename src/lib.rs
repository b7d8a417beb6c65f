//! Weekly stacking and top-N aggregation for movie release charts.
//!
//! Rows come in through [`loader`], the pure functions in [`aggregate`] turn
//! them into placements and rankings, and any renderer can consume the result.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod quiz;
pub mod report;
pub mod revenue;
