//! Converty Core - Shared types library.
//!
//! This crate provides common types used across all Converty components:
//! - `storefront` - Public shop pages and cash-on-delivery checkout
//! - `dashboard` - Merchant administration panel
//! - `cli` - Command-line tools for migrations, merchants and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, slugs, prices, theme values,
//!   statuses, plans and pixel events

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
