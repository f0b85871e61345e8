pub mod app;
pub mod command;
pub mod config;
pub mod core;
pub mod envelope;
pub mod plugin;
pub mod resource;
pub mod store;
pub mod worker;
