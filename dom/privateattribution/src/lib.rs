//! Private attribution measurement engine.
//!
//! Records ad interactions (views and clicks) observed on source sites,
//! attributes later conversions on target sites to at most one of them,
//! encodes the result as a one-hot histogram and hands it to an aggregation
//! protocol client. Every impression carries a small conversion budget that
//! bounds how often it can contribute to a measurement.

pub mod budget;
pub mod clock;
pub mod config;
pub mod dap;
pub mod error;
pub mod impressions;
pub mod queries;
pub mod service;
pub mod telemetry;
pub mod util;
