//! Command-line driver for pagefilter.
//!
//! Loads a schema graph and a JSON record set, then either compiles a
//! filter expression (`check`) or pages through the records (`page`).

pub mod commands;
pub mod config;
