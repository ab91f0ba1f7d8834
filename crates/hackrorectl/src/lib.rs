//! hackrorectl - bench CLI for HackRore diagnostics
//!
//! Parsing lives in `cli`, execution in `commands`, rendering in `display`.

pub mod cli;
pub mod commands;
pub mod display;
pub mod logging;
