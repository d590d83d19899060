//! The `courier` command-line client: configuration, logging setup and a
//! session loop that drives `courier_core` with `courier_engine`.
pub mod cli;
pub mod platform;
