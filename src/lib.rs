// chmctl - CHM management API client
// Library root

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod monitor;
pub mod protocol;
pub mod render;
pub mod resilience;

#[cfg(test)]
mod events_tests;
