//! Image link extraction from product page HTML
//!
//! An [`ImageLinkExtractor`] runs an ordered chain of [`ExtractionStrategy`]s over
//! the page; the first strategy that yields a link wins. Strategies distinguish
//! *absence* (`Ok(None)`, the next strategy is tried) from *malformed data*
//! (`Err`, the chain stops).
//!
//! - [`embedded`] - Image gallery JSON embedded in an inline script
//! - [`attribute`] - Attribute on the main image element

pub mod attribute;
pub mod embedded;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use attribute::AttributeStrategy;
pub use embedded::EmbeddedJsonStrategy;

use crate::error::Result;

/// One way of finding the image link in a page
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Look for the image link in `html`
    ///
    /// # Returns
    /// * `Ok(Some(link))` - Link found (may be relative)
    /// * `Ok(None)` - This strategy found nothing; try the next one
    /// * `Err(_)` - The page carries data this strategy recognises but cannot read
    fn extract(&self, html: &str) -> Result<Option<String>>;
}

/// Ordered fallback chain of extraction strategies
pub struct ImageLinkExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ImageLinkExtractor {
    /// Build an extractor from a custom chain (evaluated in order)
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies in evaluation order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Find the image link in a page
    ///
    /// # Errors
    ///
    /// Propagates the first strategy error; later strategies are not consulted.
    pub fn extract(&self, html: &str) -> Result<Option<String>> {
        for strategy in &self.strategies {
            if let Some(link) = strategy.extract(html)? {
                tracing::debug!(strategy = strategy.name(), link = %link, "image link found");
                return Ok(Some(link));
            }
            tracing::debug!(
                strategy = strategy.name(),
                "no image link, trying next strategy"
            );
        }
        Ok(None)
    }
}

impl Default for ImageLinkExtractor {
    /// Embedded gallery JSON first, then the main image attribute
    fn default() -> Self {
        Self::new(vec![
            Box::new(EmbeddedJsonStrategy::default()),
            Box::new(AttributeStrategy::default()),
        ])
    }
}

impl std::fmt::Debug for ImageLinkExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLinkExtractor")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
