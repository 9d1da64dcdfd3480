//! Command execution functions.
//!
//! Each command returns the process exit code on completion.

mod config;
mod open_dir;
mod sign;

pub use config::config;
pub use open_dir::{open_dir, output_dir};
pub use sign::sign;
