pub mod communication;
pub mod config;
pub mod global_variables;
pub mod models;
pub mod monitoring;
pub mod render;
pub mod scene;
pub mod shared_data;
