pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod services;

#[cfg(test)]
pub mod testing;
