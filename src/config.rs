//! Paginator configuration
//!
//! `PaginatorConfig` can be built in code or loaded from a YAML/JSON file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a [`PageBasedPaginator`](crate::pagination::PageBasedPaginator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginatorConfig {
    /// Items requested per fetch
    pub page_size: u32,

    /// Emit the whole accumulated list on success (otherwise only the new page)
    pub expose_accumulated_list: bool,

    /// Keep appending fetched items internally even when only the latest
    /// page is exposed. Has no effect when `expose_accumulated_list` is set.
    pub track_unexposed_items: bool,

    /// Capacity of the state broadcast channel
    pub state_buffer: usize,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            expose_accumulated_list: true,
            track_unexposed_items: false,
            state_buffer: 64,
        }
    }
}

impl PaginatorConfig {
    /// Create a config with the given page size and defaults elsewhere
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Expose the accumulated list (or only the latest page)
    #[must_use]
    pub fn with_accumulated_list(mut self, expose: bool) -> Self {
        self.expose_accumulated_list = expose;
        self
    }

    /// Track items internally while exposing only the latest page
    #[must_use]
    pub fn with_unexposed_tracking(mut self, track: bool) -> Self {
        self.track_unexposed_items = track;
        self
    }

    /// Set state broadcast capacity
    #[must_use]
    pub fn with_state_buffer(mut self, capacity: usize) -> Self {
        self.state_buffer = capacity;
        self
    }

    /// Whether successful loads should append to the internal item list
    pub fn accumulates(&self) -> bool {
        self.expose_accumulated_list || self.track_unexposed_items
    }

    /// Check that every field holds a usable value
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value(
                "page_size",
                "must be greater than zero",
            ));
        }
        if self.state_buffer == 0 {
            return Err(Error::invalid_value(
                "state_buffer",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }
}
