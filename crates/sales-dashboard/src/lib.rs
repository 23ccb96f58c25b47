//! Reporting core for the agency sales dashboard.
//!
//! The crate owns the producer leaderboard roll-up, the zip-code health
//! classifier, and the America/Chicago calendar helpers that decide which
//! day a producer is logging against. Storage is reached through the
//! [`reporting::MetricsStore`] trait so the HTTP service, the CLI, and tests
//! can plug in their own backends.

pub mod access;
pub mod calendar;
pub mod config;
pub mod error;
pub mod reporting;
pub mod telemetry;
