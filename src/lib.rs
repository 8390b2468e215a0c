pub mod app;
pub mod config;
pub mod crypto;
pub mod currency;
pub mod db;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod handoff;
pub mod middleware;
pub mod models;
pub mod orchestrator;
pub mod orders;
pub mod payments;
pub mod render;
pub mod settings;
pub mod util;
