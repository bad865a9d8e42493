pub mod config;
pub mod formatter;
pub mod runner;
