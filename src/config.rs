//! Reader configuration

use std::env;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::types::Margins;

/// Configuration for a reader instance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderConfig {
    /// Page cache sizing
    pub cache: CacheConfig,
    /// Page margins applied inside the viewport
    pub margins: Margins,
}

impl ReaderConfig {
    /// Build a configuration from environment variables
    ///
    /// `RECTO_CACHE_CAPACITY` overrides the cache window,
    /// `RECTO_PAGE_MARGIN` sets a uniform margin; anything unset or
    /// unparsable falls back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let capacity = env::var("RECTO_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache.capacity);
        let margins = env::var("RECTO_PAGE_MARGIN")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Margins::uniform)
            .unwrap_or(defaults.margins);

        Self {
            cache: CacheConfig { capacity },
            margins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ReaderConfig::default();
        assert!(config.cache.capacity > 0);
        assert!(config.margins.top >= 0.0);
    }
}
