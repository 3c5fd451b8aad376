//! CLI module containing argument parsing, configuration and display

pub mod args;
pub mod config;
pub mod display;

pub use args::{Args, Command};
pub use config::{AppConfig, ConfigError, StoreLocation};

#[cfg(test)]
mod tests;
