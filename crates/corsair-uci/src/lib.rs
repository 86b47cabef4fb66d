//! UCI protocol handling for corsair.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, GoParams, UciOption, parse_command};
pub use engine::UciEngine;
pub use error::UciError;
