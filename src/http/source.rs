//! HTTP page source implementation

use crate::error::{Error, Result};
use crate::pagination::PageSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for an [`HttpPageSource`]
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Endpoint URL
    pub url: String,
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Query parameter carrying the page size
    pub page_size_param: String,
    /// Dotted JSON path to the records array (empty = the body itself)
    pub records_path: String,
    /// Extra query parameters sent with every request
    pub query: HashMap<String, String>,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl HttpSourceConfig {
    /// Create a config for `url` with default parameter names
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_param: "page".to_string(),
            page_size_param: "page_size".to_string(),
            records_path: String::new(),
            query: HashMap::new(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(30),
            user_agent: format!("pagestream/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set query parameter names for page number and page size
    #[must_use]
    pub fn with_params(mut self, page: impl Into<String>, page_size: impl Into<String>) -> Self {
        self.page_param = page.into();
        self.page_size_param = page_size.into();
        self
    }

    /// Set the records path (e.g. `$.data.items`)
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    /// Add a static query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Page source backed by a JSON HTTP endpoint
pub struct HttpPageSource<T> {
    client: Client,
    url: Url,
    config: HttpSourceConfig,
    _records: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> HttpPageSource<T> {
    /// Create a source, validating the URL
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let url = Url::parse(&config.url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            url,
            config,
            _records: PhantomData,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Request one page and decode its records
    pub async fn get_page(&self, page: u32, page_size: u32) -> Result<Vec<T>> {
        let mut req = self
            .client
            .get(self.url.clone())
            .query(&[
                (self.config.page_param.as_str(), page.to_string()),
                (self.config.page_size_param.as_str(), page_size.to_string()),
            ]);

        if !self.config.query.is_empty() {
            req = req.query(&self.config.query);
        }
        for (key, value) in &self.config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: Value = response.json().await?;
        let records = extract_records(&body, &self.config.records_path)?;
        debug!(page, page_size, records = records.len(), url = %self.url, "fetched page");

        records
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(Error::from))
            .collect()
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<T>> {
        self.get_page(page, page_size).await
    }
}

impl<T> std::fmt::Debug for HttpPageSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("url", &self.url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Extract the records array at a dotted path (`$.data.items`, `data.items`,
/// or empty for the root). `null` counts as an empty page.
pub fn extract_records(body: &Value, path: &str) -> Result<Vec<Value>> {
    let trimmed = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);

    let mut current = body;
    if !trimmed.is_empty() {
        for part in trimmed.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| Error::record_extraction(path, format!("missing field '{part}'")))?;
        }
    }

    match current {
        Value::Array(records) => Ok(records.clone()),
        Value::Null => Ok(Vec::new()),
        _ => Err(Error::record_extraction(path, "expected an array")),
    }
}
