//! # SpaceBio Application
//!
//! The async side of SpaceBio: HTTP API, CLI, configuration and the
//! runner for the timed mock actions. All search, facet and account logic
//! lives in `spacebio-core`.

pub mod actions;
pub mod api;
pub mod cli;
pub mod config;
