//! Shop slug type.
//!
//! The slug is the public address of a storefront (`/shop/{slug}`), so it is
//! restricted to a URL-safe alphabet and normalized to lowercase.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug must be between {min} and {max} characters")]
    Length { min: usize, max: usize },
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
    #[error("slug cannot start or end with a hyphen")]
    EdgeHyphen,
    #[error("slug cannot contain consecutive hyphens")]
    DoubleHyphen,
}

/// A URL-safe shop identifier such as `tech-store`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 64;

    /// Parse a slug entered by a merchant.
    ///
    /// Input is trimmed and lowercased before validation.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the slug is too short or long, contains
    /// characters outside `[a-z0-9-]`, or misplaces hyphens.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim().to_ascii_lowercase();

        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&s.len()) {
            return Err(SlugError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }

        if s.starts_with('-') || s.ends_with('-') {
            return Err(SlugError::EdgeHyphen);
        }

        if s.contains("--") {
            return Err(SlugError::DoubleHyphen);
        }

        Ok(Self(s))
    }

    /// Derive a slug from a shop name.
    ///
    /// Runs of anything that is not an ASCII letter or digit collapse into a
    /// single hyphen. Returns `None` when the name has too few usable
    /// characters (for example a name written entirely in another script).
    ///
    /// ```
    /// use converty_core::Slug;
    ///
    /// assert_eq!(Slug::from_name("Tech Store").unwrap().as_str(), "tech-store");
    /// assert_eq!(Slug::from_name("  Fashion -- Hub! ").unwrap().as_str(), "fashion-hub");
    /// assert!(Slug::from_name("!!").is_none());
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if out.len() > Self::MAX_LENGTH {
            out.truncate(Self::MAX_LENGTH);
            while out.ends_with('-') {
                out.pop();
            }
        }

        Self::parse(&out).ok()
    }

    /// Append a suffix, used to resolve a collision with an existing slug.
    ///
    /// The base is shortened if needed so the result stays within bounds.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let room = Self::MAX_LENGTH.saturating_sub(suffix.len() + 1);
        let mut base: String = self.0.chars().take(room).collect();
        while base.ends_with('-') {
            base.pop();
        }
        Self(format!("{base}-{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Slug::parse("tech-store").unwrap().as_str(), "tech-store");
        assert_eq!(Slug::parse(" Shop42 ").unwrap().as_str(), "shop42");
    }

    #[test]
    fn test_parse_length() {
        assert!(matches!(Slug::parse("a"), Err(SlugError::Length { .. })));
        assert!(matches!(
            Slug::parse(&"a".repeat(65)),
            Err(SlugError::Length { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_characters() {
        assert_eq!(Slug::parse("tech store"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("café"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("../etc"), Err(SlugError::InvalidCharacter));
    }

    #[test]
    fn test_parse_hyphen_rules() {
        assert_eq!(Slug::parse("-shop"), Err(SlugError::EdgeHyphen));
        assert_eq!(Slug::parse("shop-"), Err(SlugError::EdgeHyphen));
        assert_eq!(Slug::parse("my--shop"), Err(SlugError::DoubleHyphen));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Slug::from_name("Tech Store").unwrap().as_str(), "tech-store");
        assert_eq!(
            Slug::from_name("Fashion Hub").unwrap().as_str(),
            "fashion-hub"
        );
        assert_eq!(
            Slug::from_name("Mike's Bikes & Co.").unwrap().as_str(),
            "mike-s-bikes-co"
        );
        assert!(Slug::from_name("").is_none());
    }

    #[test]
    fn test_from_name_truncates_long_names() {
        let name = "word ".repeat(40);
        let slug = Slug::from_name(&name).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_with_suffix() {
        let slug = Slug::parse("tech-store").unwrap();
        assert_eq!(slug.with_suffix("a1b2").as_str(), "tech-store-a1b2");

        let long = Slug::parse(&"x".repeat(64)).unwrap();
        let suffixed = long.with_suffix("abcd");
        assert_eq!(suffixed.as_str().len(), Slug::MAX_LENGTH);
        assert!(Slug::parse(suffixed.as_str()).is_ok());
    }
}
