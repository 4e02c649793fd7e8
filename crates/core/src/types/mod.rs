//! Core types for Converty.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pixel;
pub mod plan;
pub mod price;
pub mod slug;
pub mod status;
pub mod theme;

pub use email::{Email, EmailError};
pub use id::*;
pub use pixel::{PixelEvent, PixelId, PixelIdError};
pub use plan::SubscriptionPlan;
pub use price::{CurrencyCode, Price, PriceError};
pub use slug::{Slug, SlugError};
pub use status::*;
pub use theme::{FontFamily, HexColor, HexColorError};
