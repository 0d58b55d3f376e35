//! REST API module
//!
//! HTTP endpoints for account signup/login, plan management, and metered
//! search

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::ApiServer;
