pub mod app_config;
pub mod cli;
pub mod target;
