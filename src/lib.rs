//! Cart-aware product recommendation service.
//!
//! The [`engine`] scores a catalog snapshot against a customer's cart and is
//! usable on its own; the remaining modules wrap it in an HTTP service.

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
