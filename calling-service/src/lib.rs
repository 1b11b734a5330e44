//! Calling side of service-to-service authentication: fetch an ID token for
//! the receiving service and attach it to outbound requests.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
