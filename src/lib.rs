//! faq-assistant-tui library: catalog, backend client and the terminal application core.

pub mod app_core;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod model;
pub mod theme;
pub mod ui;
