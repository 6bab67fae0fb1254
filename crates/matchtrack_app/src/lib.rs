//! Command-line front end of the matching job tracker.
pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
