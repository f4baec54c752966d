pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod item;
pub mod metric;
pub mod utils;
