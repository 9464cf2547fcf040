//! # chime-cli
//!
//! Command-line interface for chime: argument parsing and the `serve` and
//! `packs` commands. The binary entrypoint lives in `main.rs`.

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;

pub use error::CliError;
