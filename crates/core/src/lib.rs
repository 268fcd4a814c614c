//! Shopwright Core - Shared types library.
//!
//! This crate provides common types used across the Shopwright components:
//! - `web` - The storefront and dashboard web application
//! - `integration-tests` - End-to-end test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. All
//! authoritative data lives in the remote backend; these types give the
//! frontend a type-safe vocabulary for it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
