//! Application layer - use cases and services

pub mod bot;
pub mod commands;
pub mod services;

pub use bot::{BotCommand, BotCommandHandler};
pub use commands::{Cli, CommandExecutor, Commands};
pub use services::{MonitorComponents, MonitorService};
