//! Storefront theme values: brand colours and font family.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("colour must be a hex value like #3b82f6")]
pub struct HexColorError;

/// A `#rrggbb` colour, stored lowercase.
///
/// Theme colours are interpolated into a `<style>` block on every storefront
/// page, so only this exact shape is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub const DEFAULT_PRIMARY: &'static str = "#3b82f6";
    pub const DEFAULT_SECONDARY: &'static str = "#1e40af";
    pub const DEFAULT_ACCENT: &'static str = "#f59e0b";

    /// # Errors
    ///
    /// Returns [`HexColorError`] unless the input is `#` followed by six hex
    /// digits.
    pub fn parse(s: &str) -> Result<Self, HexColorError> {
        let s = s.trim();
        let digits = s.strip_prefix('#').ok_or(HexColorError)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HexColorError);
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn default_primary() -> Self {
        Self(Self::DEFAULT_PRIMARY.to_owned())
    }

    #[must_use]
    pub fn default_secondary() -> Self {
        Self(Self::DEFAULT_SECONDARY.to_owned())
    }

    #[must_use]
    pub fn default_accent() -> Self {
        Self(Self::DEFAULT_ACCENT.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for HexColor {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for HexColor {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for HexColor {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Font family applied to the storefront body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.font_family", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    pub const ALL: [Self; 3] = [Self::Sans, Self::Serif, Self::Mono];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sans => "sans",
            Self::Serif => "serif",
            Self::Mono => "mono",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sans => "Sans Serif",
            Self::Serif => "Serif",
            Self::Mono => "Monospace",
        }
    }

    /// CSS `font-family` stack.
    #[must_use]
    pub const fn css_stack(&self) -> &'static str {
        match self {
            Self::Sans => {
                "ui-sans-serif, system-ui, -apple-system, \"Segoe UI\", Roboto, sans-serif"
            }
            Self::Serif => "ui-serif, Georgia, Cambria, \"Times New Roman\", serif",
            Self::Mono => "ui-monospace, SFMono-Regular, Menlo, Consolas, monospace",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FontFamily {
    type Err = crate::StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| crate::StatusParseError {
                kind: "font family",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_valid() {
        assert_eq!(HexColor::parse("#3B82F6").unwrap().as_str(), "#3b82f6");
        assert_eq!(HexColor::parse(" #000000 ").unwrap().as_str(), "#000000");
    }

    #[test]
    fn test_hex_color_invalid() {
        for input in ["3b82f6", "#fff", "#3b82f6ff", "#zzzzzz", "", "red"] {
            assert_eq!(HexColor::parse(input), Err(HexColorError), "{input}");
        }
    }

    #[test]
    fn test_hex_color_blocks_css_injection() {
        assert!(HexColor::parse("#000;}body{").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(HexColor::parse(HexColor::DEFAULT_PRIMARY).is_ok());
        assert!(HexColor::parse(HexColor::DEFAULT_SECONDARY).is_ok());
        assert!(HexColor::parse(HexColor::DEFAULT_ACCENT).is_ok());
    }

    #[test]
    fn test_font_family_parse() {
        assert_eq!("serif".parse::<FontFamily>().unwrap(), FontFamily::Serif);
        assert!("comic".parse::<FontFamily>().is_err());
    }
}
