//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `auth` - Email/password sign-up and login
//! - `media` - Uploaded image storage

pub mod auth;
pub mod media;

pub use auth::{AuthError, AuthService, Signup};
pub use media::{ImageUpload, LocalMediaStore, MediaError, MediaStore};
