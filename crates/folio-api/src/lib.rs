//! HTTP proxy server for the portfolio assistant.

pub mod config;
pub mod server;
