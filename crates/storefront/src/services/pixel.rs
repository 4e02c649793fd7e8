//! Facebook Pixel snippet generation.
//!
//! A shop with a configured pixel id gets the standard `fbq` loader plus a
//! `PageView` on every page, and funnel events (`ViewContent`, `AddToCart`,
//! `Purchase`) on the pages that represent them. The snippet is inlined in
//! the page under the request's CSP nonce; `AddToCart` fires from
//! `storefront.js` when the buy button is clicked.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use converty_core::{CurrencyCode, PixelEvent, PixelId};

/// Resolve the pixel of a shop. Malformed stored ids disable tracking.
#[must_use]
pub fn pixel_for_shop(raw: Option<&str>) -> Option<PixelId> {
    let raw = raw?;
    match PixelId::parse_optional(raw) {
        Ok(pixel) => pixel,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring invalid Facebook Pixel ID");
            None
        }
    }
}

/// Custom data sent with a standard event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub content_name: String,
    pub content_ids: Vec<String>,
    pub content_type: &'static str,
    pub value: f64,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_items: Option<i32>,
}

impl EventPayload {
    #[must_use]
    pub fn product(
        product_id: impl ToString,
        name: &str,
        value: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            content_name: name.to_string(),
            content_ids: vec![product_id.to_string()],
            content_type: "product",
            value: value.to_f64().unwrap_or_default(),
            currency: currency.code(),
            num_items: None,
        }
    }

    #[must_use]
    pub const fn with_items(mut self, num_items: i32) -> Self {
        self.num_items = Some(num_items);
        self
    }

    /// Payload as JSON safe to embed in a `<script>` element or an attribute.
    #[must_use]
    pub fn to_script_json(&self) -> String {
        script_json(self)
    }
}

/// Serialize a value as JSON that cannot terminate the surrounding script.
#[must_use]
pub fn script_json<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Pixel code for one page.
#[derive(Debug, Clone)]
pub struct PixelSnippet {
    pub pixel_id: PixelId,
    pub events: Vec<(PixelEvent, EventPayload)>,
}

impl PixelSnippet {
    #[must_use]
    pub const fn new(pixel_id: PixelId) -> Self {
        Self {
            pixel_id,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: PixelEvent, payload: EventPayload) -> Self {
        self.events.push((event, payload));
        self
    }

    /// Inline script body: queue stub, `init`, `PageView` and the page's events.
    ///
    /// The loader itself (`fbevents.js`) is a separate `async` script tag.
    #[must_use]
    pub fn inline_script(&self) -> String {
        let mut script = String::from(
            "!function(f,n){if(f.fbq)return;n=f.fbq=function(){n.callMethod?\
             n.callMethod.apply(n,arguments):n.queue.push(arguments)};\
             if(!f._fbq)f._fbq=n;n.push=n;n.loaded=!0;n.version='2.0';n.queue=[]}(window);\n",
        );
        script.push_str(&format!(
            "fbq('init',{});\nfbq('track','{}');\n",
            script_json(&self.pixel_id.as_str()),
            PixelEvent::PageView
        ));
        for (event, payload) in &self.events {
            script.push_str(&format!(
                "fbq('track','{event}',{});\n",
                payload.to_script_json()
            ));
        }
        script
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pixel() -> PixelId {
        PixelId::parse("123456789012345").unwrap()
    }

    #[test]
    fn test_pixel_for_shop() {
        assert_eq!(pixel_for_shop(None), None);
        assert_eq!(pixel_for_shop(Some("")), None);
        assert_eq!(pixel_for_shop(Some("abc")), None);
        assert_eq!(pixel_for_shop(Some("123456789012345")), Some(pixel()));
    }

    #[test]
    fn test_script_json_escapes_markup() {
        let json = script_json(&"</script><script>alert(1)&\u{2028}");
        assert!(!json.contains('<'));
        assert!(!json.contains('>'));
        assert!(!json.contains('&'));
        assert!(json.contains("\\u003c/script\\u003e"));
        assert!(json.contains("\\u2028"));
    }

    #[test]
    fn test_payload_fields() {
        let payload = EventPayload::product("p-1", "Headphones", Decimal::new(7999, 2), CurrencyCode::USD)
            .with_items(2);
        let json: serde_json::Value = serde_json::from_str(&payload.to_script_json()).unwrap();
        assert_eq!(json["content_ids"][0], "p-1");
        assert_eq!(json["content_type"], "product");
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["num_items"], 2);
        assert!((json["value"].as_f64().unwrap() - 79.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_num_items_omitted_when_unset() {
        let payload = EventPayload::product("p-1", "Headphones", Decimal::ONE, CurrencyCode::USD);
        assert!(!payload.to_script_json().contains("num_items"));
    }

    #[test]
    fn test_inline_script_tracks_events_in_order() {
        let payload = EventPayload::product("p-1", "Headphones", Decimal::ONE, CurrencyCode::EUR);
        let script = PixelSnippet::new(pixel())
            .with_event(PixelEvent::ViewContent, payload)
            .inline_script();

        assert!(script.contains("fbq('init',\"123456789012345\");"));
        let page_view = script.find("fbq('track','PageView')").unwrap();
        let view_content = script.find("fbq('track','ViewContent',").unwrap();
        assert!(page_view < view_content);
        assert!(script.contains("\"currency\":\"EUR\""));
    }
}
