//! The Fruit Union Core - Shared types library.
//!
//! This crate provides common types used across all Fruit Union components:
//! - `dashboard` - Admin and delivery partner dashboards (HTTP + controllers)
//! - `cli` - Command-line tools for operators
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no backend access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, statuses, emails, prices and domain records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
