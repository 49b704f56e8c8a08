//! Configuration and error models for syngram.

mod config;
mod error;

pub use config::*;
pub use error::*;
