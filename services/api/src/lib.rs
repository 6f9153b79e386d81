//! services/api/src/lib.rs
//!
//! Library surface of the API service, so the binary and the integration
//! tests share the same router, adapters, and configuration.

pub mod adapters;
pub mod coach;
pub mod config;
pub mod error;
pub mod password;
pub mod web;
