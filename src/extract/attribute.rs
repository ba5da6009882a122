//! Attribute on the main product image element

use super::ExtractionStrategy;
use crate::error::{Error, Result};
use scraper::{Html, Selector};

/// Default selector for the main image
pub const DEFAULT_SELECTOR: &str = "div#imgTagWrapperId > img";

/// Default attribute holding the high resolution link
pub const DEFAULT_ATTRIBUTE: &str = "data-old-hires";

/// Reads an attribute from the first element matching a CSS selector
#[derive(Clone, Debug)]
pub struct AttributeStrategy {
    selector: String,
    attribute: String,
}

impl AttributeStrategy {
    /// Strategy reading `attribute` from the first match of `selector`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `selector` is not valid CSS.
    pub fn new(selector: impl Into<String>, attribute: impl Into<String>) -> Result<Self> {
        let selector = selector.into();
        parse_selector(&selector)?;
        Ok(Self {
            selector,
            attribute: attribute.into(),
        })
    }
}

impl Default for AttributeStrategy {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
        }
    }
}

impl ExtractionStrategy for AttributeStrategy {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn extract(&self, html: &str) -> Result<Option<String>> {
        let selector = parse_selector(&self.selector)?;
        let document = Html::parse_document(html);

        let link = document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(&self.attribute))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(link)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Config {
        message: format!("invalid CSS selector '{selector}': {e:?}"),
        key: Some("selector".to_string()),
    })
}
