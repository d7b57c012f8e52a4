#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod app;
pub use app::ServerApp;

mod cli;
pub use cli::Cli;

mod config;
pub use config::AppConfig;
