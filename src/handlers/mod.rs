//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls the matching service
//! 3. Returns HTTP response (JSON, status code)

/// Authentication endpoint
pub mod auth;
/// Coin transfer endpoint
pub mod coins;
/// Health check endpoint
pub mod health;
/// User info endpoint
pub mod info;
/// Catalog purchase endpoint
pub mod shop;
