//! Page sources and item transformers
//!
//! A [`PageSource`] supplies raw items one page at a time; an
//! [`ItemTransformer`] maps raw items to the type exposed to consumers.
//! Both are implemented for async closures.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::any::{type_name, Any};
use std::future::Future;
use std::sync::Arc;

/// Supplies one page of items
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch page `page` (1-based) holding at most `page_size` items
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<T>>;
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for F
where
    T: Send + 'static,
    F: Fn(u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
{
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<T>> {
        (self)(page, page_size).await
    }
}

/// Maps a fetched item to the exposed item type
#[async_trait]
pub trait ItemTransformer<D, E>: Send + Sync {
    /// Transform a single item
    async fn transform(&self, item: D) -> Result<E>;
}

#[async_trait]
impl<D, E, F, Fut> ItemTransformer<D, E> for F
where
    D: Send + 'static,
    E: Send + 'static,
    F: Fn(D) -> Fut + Send + Sync,
    Fut: Future<Output = Result<E>> + Send,
{
    async fn transform(&self, item: D) -> Result<E> {
        (self)(item).await
    }
}

/// How fetched items become exposed items
pub enum Transformer<D, E> {
    /// Pass items through unchanged. Checked at runtime: fails unless `D` and
    /// `E` are the same type.
    Cast,
    /// Map every item through a transformer
    Map(Arc<dyn ItemTransformer<D, E>>),
}

impl<D, E> Transformer<D, E>
where
    D: Send + 'static,
    E: Send + 'static,
{
    /// Wrap an item transformer
    pub fn map(transformer: impl ItemTransformer<D, E> + 'static) -> Self {
        Self::Map(Arc::new(transformer))
    }

    /// Transform a fetched page, stopping at the first failure
    pub async fn apply(&self, items: Vec<D>) -> Result<Vec<E>> {
        match self {
            Self::Cast => cast_items(items),
            Self::Map(transformer) => {
                let mut exposed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let item = transformer.transform(item).await.map_err(|e| {
                        Error::transform_with(format!("item {index} could not be transformed"), e)
                    })?;
                    exposed.push(item);
                }
                Ok(exposed)
            }
        }
    }
}

impl<D, E> Clone for Transformer<D, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Cast => Self::Cast,
            Self::Map(transformer) => Self::Map(Arc::clone(transformer)),
        }
    }
}

impl<D, E> std::fmt::Debug for Transformer<D, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cast => f.write_str("Cast"),
            Self::Map(_) => f.write_str("Map(..)"),
        }
    }
}

fn cast_items<D: 'static, E: 'static>(items: Vec<D>) -> Result<Vec<E>> {
    let boxed: Box<dyn Any> = Box::new(items);
    boxed.downcast::<Vec<E>>().map(|items| *items).map_err(|_| {
        Error::transform(format!(
            "cannot pass {} through as {} without a transformer",
            type_name::<D>(),
            type_name::<E>()
        ))
    })
}
