//! HTTP page source
//!
//! Fetches pages from a JSON endpoint that takes page number and page size
//! as query parameters.
//!
//! # Features
//!
//! - **Query Parameters**: Configurable names for page and page size
//! - **Record Extraction**: Dotted JSON path to the records array
//! - **Typed Records**: Records deserialized into any `DeserializeOwned` type

mod source;

pub use source::{extract_records, HttpPageSource, HttpSourceConfig};
