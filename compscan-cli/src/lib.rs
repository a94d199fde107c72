//! compscan CLI library
//!
//! The `compscan` binary is a thin wrapper around these modules; integration
//! tests drive the command functions directly.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
