pub mod app_command;
pub mod export;
pub mod register;
pub mod seed;

pub use app_command::{AppCommand, HELP_TEXT};
