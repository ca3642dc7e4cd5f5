//! Live annotation recorder CLI library.
//!
//! This crate provides the interactive session loop and its command
//! grammar.

mod cli;
pub mod command;
mod config;
mod session;

pub use cli::Cli;
pub use command::{Command, CommandError, Input};
pub use config::Config;
pub use session::{Session, StartTimeSource, YouTubeStartTime};
