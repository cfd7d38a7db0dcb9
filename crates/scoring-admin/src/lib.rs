//! Per-credit-line scoring configuration service.
//!
//! The crate is split along the same seams as the running system: `scoring`
//! owns the configuration domain, persistence traits, and the HTTP API;
//! `panel` owns the admin-panel runtime that edits a draft of one line's
//! configuration and saves it back through the API; `site` owns the
//! theme preference and session-expiry watchdog shared by every page.

pub mod config;
pub mod error;
pub mod panel;
pub mod scoring;
pub mod site;
pub mod telemetry;
