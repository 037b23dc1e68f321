pub mod config;
pub mod languages;
pub mod status;
pub mod types;
