//! Facebook Pixel identifiers and standard events.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("pixel id must be {min}-{max} digits")]
pub struct PixelIdError {
    min: usize,
    max: usize,
}

/// A Facebook Pixel ID.
///
/// The ID is written into an inline `<script>`, so only plain digits pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PixelId(String);

impl PixelId {
    pub const MIN_LENGTH: usize = 5;
    pub const MAX_LENGTH: usize = 20;

    /// # Errors
    ///
    /// Returns [`PixelIdError`] unless the trimmed input is 5-20 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PixelIdError> {
        let s = s.trim();
        let valid_length = (Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&s.len());
        if !valid_length || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PixelIdError {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Parse an optional form value; blank input means "no pixel".
    ///
    /// # Errors
    ///
    /// Returns [`PixelIdError`] for non-blank input that is not a valid ID.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, PixelIdError> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            Self::parse(s).map(Some)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PixelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PixelId {
    type Error = PixelIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PixelId> for String {
    fn from(id: PixelId) -> Self {
        id.0
    }
}

/// Standard pixel events fired along the purchase funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelEvent {
    PageView,
    ViewContent,
    AddToCart,
    Purchase,
}

impl PixelEvent {
    /// Event name as passed to `fbq('track', ...)`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PageView => "PageView",
            Self::ViewContent => "ViewContent",
            Self::AddToCart => "AddToCart",
            Self::Purchase => "Purchase",
        }
    }
}

impl fmt::Display for PixelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            PixelId::parse(" 1234567890123456 ").unwrap().as_str(),
            "1234567890123456"
        );
    }

    #[test]
    fn test_parse_rejects_script_content() {
        assert!(PixelId::parse("123');alert(1);//").is_err());
        assert!(PixelId::parse("12 34 56").is_err());
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(PixelId::parse("1234").is_err());
        assert!(PixelId::parse("12345").is_ok());
        assert!(PixelId::parse(&"9".repeat(21)).is_err());
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(PixelId::parse_optional("  ").unwrap(), None);
        assert!(PixelId::parse_optional("123456").unwrap().is_some());
        assert!(PixelId::parse_optional("abc").is_err());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(PixelEvent::ViewContent.to_string(), "ViewContent");
        assert_eq!(PixelEvent::AddToCart.as_str(), "AddToCart");
    }
}
