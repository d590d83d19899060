pub mod app;
pub mod commands;
pub mod config;
pub mod effects;
pub mod logging;
pub mod picker;
pub mod render;
pub mod shell;
