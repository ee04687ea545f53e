//! Selector dialect parsing.
//!
//! The resolution core hands this crate opaque selector strings. Here they
//! gain meaning: an optional `css=`, `xpath=` or `text=` prefix picks the
//! location strategy, and unprefixed strings are plain CSS. `text=` becomes
//! an XPath over clickable-ish tags, since WebDriver has no text strategy
//! of its own.

use fantoccini::Locator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedSelector {
    Css(String),
    XPath(String),
}

impl ParsedSelector {
    pub(crate) fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("css=") {
            Self::Css(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("xpath=") {
            Self::XPath(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("text=") {
            Self::XPath(text_xpath(rest))
        } else {
            Self::Css(raw.to_string())
        }
    }

    pub(crate) fn locator(&self) -> Locator<'_> {
        match self {
            Self::Css(css) => Locator::Css(css),
            Self::XPath(xpath) => Locator::XPath(xpath),
        }
    }
}

fn text_xpath(text: &str) -> String {
    format!(
        "//*[self::button or self::a or self::label or self::span]\
         [contains(normalize-space(.), {})]",
        xpath_literal(text.trim())
    )
}

/// Quote a string for XPath 1.0, which has no escape syntax. Mixed quotes
/// force a concat() of single-quoted pieces.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
