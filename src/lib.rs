//! olistdash: Olist e-commerce dashboard
//!
//! Loads the Olist CSV datasets, joins them into per-order and per-city
//! tables, and answers (year, category) queries for the TUI and CLI.

pub mod cli;
pub mod config;
pub mod datasets;
pub mod logging;
pub mod services;
pub mod tui;
pub mod types;
