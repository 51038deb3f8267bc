pub mod api;
pub mod app;
pub mod config;
pub mod converter;
pub mod fetch_error;
pub mod fetcher;
pub mod importers;
pub mod models;
pub mod services;
pub mod sinks;
pub mod utils;
