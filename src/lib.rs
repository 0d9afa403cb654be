//! chainpeek: a terminal dashboard for a bitcoind node
//!
//! The binary polls the node over JSON-RPC, caches blocks and transactions in
//! shared stores, and fans typed events out to a set of mode views drawn with
//! ratatui.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod modules;
pub mod store;
pub mod ui;
