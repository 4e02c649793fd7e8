//! Converty storefront library.
//!
//! Buyer-facing pages for every shop on the platform, addressed by slug
//! under `/shop/{slug}`. Catalog data is read-only here; the only write is
//! a cash-on-delivery order placed from a product's checkout page.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
