//! Receiving side of service-to-service authentication.
//!
//! Requests arrive with a Google-issued ID token in `Authorization` or, when
//! the platform proxy has already authenticated them, in
//! `X-Serverless-Authorization` with the signature stripped. See
//! [`services::auth::verifier`] for how each case is verified.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
