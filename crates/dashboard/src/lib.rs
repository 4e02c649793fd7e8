//! Converty merchant dashboard library.
//!
//! Everything the `converty-dashboard` binary serves lives here so the CLI
//! and tests can reuse the repositories, forms and router.
//!
//! # Tenancy
//!
//! A merchant owns exactly one shop. Every repository method takes the
//! session's `ShopId` and scopes its queries to it; handlers never look up
//! shop data by a bare row id.

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
