//! Hour-of-day explorer for timestamped pickup data.
//!
//! The data layer ([`data`]) loads a CSV (optionally gzip-compressed, local or
//! over HTTP) behind a memoization cache, then derives the rows at a chosen
//! hour and a 24-bucket histogram. [`app`] and [`ui`] render it with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
