//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors from parsing a merchant-entered amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("amount is required")]
    Empty,
    #[error("amount must be a number")]
    NotANumber,
    #[error("amount cannot be negative")]
    Negative,
    #[error("amount is too large")]
    TooLarge,
    #[error("unsupported currency: {0}")]
    UnknownCurrency(String),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Largest amount accepted from a form (matches `NUMERIC(12, 2)`).
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse an amount typed into a form field.
    ///
    /// Accepts `19.99`, `19,99` and surrounding whitespace; rounds half away
    /// from zero to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] for empty, non-numeric, negative or oversized
    /// input.
    pub fn parse_amount(input: &str) -> Result<Decimal, PriceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(&input.replace(',', "."))
            .map_err(|_| PriceError::NotANumber)?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX_AMOUNT {
            return Err(PriceError::TooLarge);
        }

        Ok(amount)
    }

    /// Line total for `quantity` units at `unit_price`.
    ///
    /// `None` when the product overflows or exceeds [`Self::MAX_AMOUNT`],
    /// the largest value an order or order item column can hold.
    #[must_use]
    pub fn line_total(unit_price: Decimal, quantity: i32) -> Option<Decimal> {
        unit_price
            .checked_mul(Decimal::from(quantity))
            .filter(|total| *total <= Self::MAX_AMOUNT)
    }

    /// Sum of line totals, bounded like [`Self::line_total`].
    #[must_use]
    pub fn order_total(line_totals: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
        line_totals
            .into_iter()
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .filter(|total| *total <= Self::MAX_AMOUNT)
    }

    /// Format for display (e.g., `$19.99`, `€5.00`, `12.50 TND`).
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self.amount.round_dp(2);
        match self.currency_code.symbol() {
            Some(symbol) => format!("{symbol}{amount:.2}"),
            None => format!("{amount:.2} {}", self.currency_code.code()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes a shop can sell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    TND,
    MAD,
}

impl CurrencyCode {
    pub const ALL: [Self; 7] = [
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::CAD,
        Self::AUD,
        Self::TND,
        Self::MAD,
    ];

    /// Prefix symbol, when the currency is conventionally written with one.
    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD | Self::CAD | Self::AUD => Some("$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::TND | Self::MAD => None,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::TND => "TND",
            Self::MAD => "MAD",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::USD => "US Dollar",
            Self::EUR => "Euro",
            Self::GBP => "British Pound",
            Self::CAD => "Canadian Dollar",
            Self::AUD => "Australian Dollar",
            Self::TND => "Tunisian Dinar",
            Self::MAD => "Moroccan Dirham",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| PriceError::UnknownCurrency(s.to_owned()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.code().to_owned()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CurrencyCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CurrencyCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CurrencyCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(Price::new(dec("19.99"), CurrencyCode::USD).display(), "$19.99");
        assert_eq!(Price::new(dec("5"), CurrencyCode::EUR).display(), "€5.00");
        assert_eq!(Price::new(dec("0.5"), CurrencyCode::GBP).display(), "£0.50");
    }

    #[test]
    fn test_display_with_code_suffix() {
        assert_eq!(
            Price::new(dec("12.5"), CurrencyCode::TND).display(),
            "12.50 TND"
        );
    }

    #[test]
    fn test_line_total() {
        assert_eq!(Price::line_total(dec("19.99"), 3), Some(dec("59.97")));
        assert_eq!(Price::line_total(dec("19.99"), 0), Some(Decimal::ZERO));
        assert_eq!(Price::line_total(Price::MAX_AMOUNT, 1), Some(Price::MAX_AMOUNT));
        assert_eq!(Price::line_total(dec("9999999999.99"), 2), None);
        assert_eq!(Price::line_total(dec("5000000000.00"), i32::MAX), None);
    }

    #[test]
    fn test_order_total() {
        assert_eq!(
            Price::order_total([dec("59.97"), dec("25.98")]),
            Some(dec("85.95"))
        );
        assert_eq!(Price::order_total([]), Some(Decimal::ZERO));
        assert_eq!(
            Price::order_total([Price::MAX_AMOUNT, dec("0.01")]),
            None
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(Price::parse_amount("19.99").unwrap(), dec("19.99"));
        assert_eq!(Price::parse_amount(" 7 ").unwrap(), dec("7"));
        assert_eq!(Price::parse_amount("12,50").unwrap(), dec("12.50"));
        assert_eq!(Price::parse_amount("0.125").unwrap(), dec("0.13"));
        assert_eq!(Price::parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_errors() {
        assert_eq!(Price::parse_amount(""), Err(PriceError::Empty));
        assert_eq!(Price::parse_amount("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse_amount("-1"), Err(PriceError::Negative));
        assert_eq!(
            Price::parse_amount("99999999999"),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("TND".parse::<CurrencyCode>().unwrap(), CurrencyCode::TND);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&CurrencyCode::EUR).unwrap();
        assert_eq!(json, "\"EUR\"");
        let parsed: CurrencyCode = serde_json::from_str("\"mad\"").unwrap();
        assert_eq!(parsed, CurrencyCode::MAD);
    }
}
