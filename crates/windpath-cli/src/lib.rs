//! Windpath CLI library.
//!
//! Command handlers, argument parsing helpers, and terminal output for the
//! `windpath-cli` binary.

pub mod commands;
pub mod output;
pub mod sources;
pub mod terminal;
