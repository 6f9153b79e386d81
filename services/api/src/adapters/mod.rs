//! services/api/src/adapters/mod.rs
//!
//! Concrete implementations of the core's port traits.

pub mod db;
pub mod gemini;
