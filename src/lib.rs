pub mod api;
pub mod blockchain;
pub mod config;
pub mod utils;
