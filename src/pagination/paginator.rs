//! Page-based paginator
//!
//! A driver task reads [`LoadTrigger`]s from a single-slot mailbox and runs
//! one trigger at a time. A newer, different trigger supersedes the one in
//! flight: the running load is dropped at its await point, so a superseded
//! fetch never emits a state and never touches the item list.

use super::source::{ItemTransformer, PageSource, Transformer};
use super::types::{LoadTrigger, PaginationState};
use crate::config::PaginatorConfig;
use crate::error::{Error, Result};
use futures::Stream;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// State stream payload
pub type PageState<E> = PaginationState<Vec<E>>;

/// Pagination cursor and loaded items, owned by one paginator
#[derive(Debug)]
struct Cursor<E> {
    current_page: u32,
    is_last_page: bool,
    items: Vec<E>,
}

impl<E> Cursor<E> {
    fn new() -> Self {
        Self {
            current_page: 1,
            is_last_page: false,
            items: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.current_page = 1;
        self.is_last_page = false;
        self.items.clear();
    }
}

/// State shared between the paginator handle and its driver task
struct Shared<D, E> {
    config: PaginatorConfig,
    source: Arc<dyn PageSource<D>>,
    transformer: Transformer<D, E>,
    cursor: Mutex<Cursor<E>>,
    latest: Mutex<Option<PageState<E>>>,
    states: broadcast::Sender<PageState<E>>,
}

impl<D, E> Shared<D, E>
where
    D: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn emit(&self, state: PageState<E>) {
        trace!(state = %state.kind(), "emitting state");
        *self.latest.lock() = Some(state.clone());
        // No subscribers is fine, the state stays readable via `latest`
        let _ = self.states.send(state);
    }

    async fn process(&self, trigger: LoadTrigger) {
        match trigger {
            LoadTrigger::Refresh => {
                self.cursor.lock().reset();
                self.load_next_page().await;
            }
            LoadTrigger::NextPage(_) => self.load_next_page().await,
            LoadTrigger::Update(_) => {
                let items = self.cursor.lock().items.clone();
                self.emit(PaginationState::Update(items));
            }
        }
    }

    async fn load_next_page(&self) {
        let next = {
            let cursor = self.cursor.lock();
            if cursor.is_last_page {
                None
            } else if cursor.items.is_empty() {
                Some((cursor.current_page, PaginationState::LoadingInitial))
            } else {
                Some((
                    cursor.current_page,
                    PaginationState::LoadingMore(cursor.items.clone()),
                ))
            }
        };

        let Some((page, loading)) = next else {
            debug!("last page already loaded");
            self.emit(PaginationState::End);
            return;
        };
        self.emit(loading);

        let page_size = self.config.page_size;
        let fetched = match self.source.fetch_page(page, page_size).await {
            Ok(fetched) => fetched,
            Err(e) => {
                let e = Error::fetch(page, e);
                warn!(page, error = %e, "page fetch failed");
                self.fail(e);
                return;
            }
        };

        let exposed = match self.transformer.apply(fetched).await {
            Ok(exposed) => exposed,
            Err(e) => {
                warn!(page, error = %e, "page transform failed");
                self.fail(e);
                return;
            }
        };

        let data = {
            let mut cursor = self.cursor.lock();
            let fetched_len = exposed.len();
            if fetched_len < page_size as usize {
                cursor.is_last_page = true;
            }
            if fetched_len > 0 || cursor.current_page == 1 {
                cursor.current_page += 1;
            }
            debug!(
                page,
                fetched = fetched_len,
                last_page = cursor.is_last_page,
                "page loaded"
            );

            if self.config.expose_accumulated_list {
                cursor.items.extend(exposed);
                cursor.items.clone()
            } else {
                if self.config.accumulates() {
                    cursor.items.extend(exposed.iter().cloned());
                }
                exposed
            }
        };
        self.emit(PaginationState::Success(data));
    }

    fn fail(&self, cause: Error) {
        let accumulated_size = self.cursor.lock().items.len();
        self.emit(PaginationState::error(accumulated_size, cause));
    }
}

/// Runs triggers one at a time, latest-wins
async fn drive<D, E>(shared: Arc<Shared<D, E>>, mut triggers: watch::Receiver<Option<LoadTrigger>>)
where
    D: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    let mut pending: Option<LoadTrigger> = None;

    loop {
        let trigger = match pending.take() {
            Some(trigger) => trigger,
            None => {
                if triggers.changed().await.is_err() {
                    break;
                }
                match *triggers.borrow_and_update() {
                    Some(trigger) => trigger,
                    None => continue,
                }
            }
        };
        debug!(?trigger, fetches = trigger.fetches(), "processing trigger");

        let run = shared.process(trigger);
        tokio::pin!(run);

        loop {
            tokio::select! {
                biased;
                () = &mut run => break,
                changed = triggers.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    match *triggers.borrow_and_update() {
                        Some(next) if next != trigger => {
                            debug!(?trigger, ?next, "trigger superseded");
                            pending = Some(next);
                            break;
                        }
                        _ => trace!(?trigger, "coalesced duplicate trigger"),
                    }
                }
            }
        }
    }

    debug!("paginator driver stopped");
}

/// Page-based paginator with a broadcast state stream
///
/// `D` is the fetched item type, `E` the exposed item type. Without a
/// transformer the two must be the same type, otherwise every load ends in a
/// transformation error.
///
/// Must be created inside a Tokio runtime. Dropping the paginator stops its
/// driver task and drops any fetch in flight.
///
/// # Example
///
/// ```rust,ignore
/// let paginator = PageBasedPaginator::with_transformer(
///     PaginatorConfig::new(10),
///     |page, size| async move { api.tasks(page, size).await },
///     |task: TaskDto| async move { Ok(TaskView::from(task)) },
/// )?;
///
/// let mut states = paginator.subscribe();
/// paginator.load_next_page();
/// while let Ok(state) = states.recv().await {
///     render(state);
/// }
/// ```
pub struct PageBasedPaginator<D, E = D> {
    shared: Arc<Shared<D, E>>,
    triggers: watch::Sender<Option<LoadTrigger>>,
    driver: JoinHandle<()>,
}

impl<D, E> PageBasedPaginator<D, E>
where
    D: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a paginator that passes fetched items through unchanged
    pub fn new(config: PaginatorConfig, source: impl PageSource<D> + 'static) -> Result<Self> {
        Self::with_parts(config, Arc::new(source), Transformer::Cast)
    }

    /// Create a paginator that maps every fetched item through `transformer`
    pub fn with_transformer(
        config: PaginatorConfig,
        source: impl PageSource<D> + 'static,
        transformer: impl ItemTransformer<D, E> + 'static,
    ) -> Result<Self> {
        Self::with_parts(config, Arc::new(source), Transformer::map(transformer))
    }

    /// Create a paginator from shared parts
    pub fn with_parts(
        config: PaginatorConfig,
        source: Arc<dyn PageSource<D>>,
        transformer: Transformer<D, E>,
    ) -> Result<Self> {
        config.validate()?;

        let (states, _) = broadcast::channel(config.state_buffer);
        let (triggers, trigger_rx) = watch::channel(None);
        let shared = Arc::new(Shared {
            config,
            source,
            transformer,
            cursor: Mutex::new(Cursor::new()),
            latest: Mutex::new(None),
            states,
        });
        let driver = tokio::spawn(drive(Arc::clone(&shared), trigger_rx));

        Ok(Self {
            shared,
            triggers,
            driver,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &PaginatorConfig {
        &self.shared.config
    }

    // ------------------------------------------------------------------
    // Triggers and state stream
    // ------------------------------------------------------------------

    /// Reset to page 1, drop loaded items and load the first page
    pub fn refresh_page(&self) {
        self.trigger(LoadTrigger::Refresh);
    }

    /// Load the next page, or emit `End` if the last page was reached
    pub fn load_next_page(&self) {
        let page = self.shared.cursor.lock().current_page;
        self.trigger(LoadTrigger::NextPage(page));
    }

    fn trigger(&self, trigger: LoadTrigger) {
        trace!(?trigger, "queueing trigger");
        self.triggers.send_replace(Some(trigger));
    }

    fn notify_list_size_change(&self, size: usize) {
        self.trigger(LoadTrigger::Update(size));
    }

    /// Subscribe to states emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PageState<E>> {
        self.shared.states.subscribe()
    }

    /// Subscribe as a `Stream`. Lagging subscribers skip missed states.
    pub fn state_stream(&self) -> impl Stream<Item = PageState<E>> + Send + 'static {
        futures::stream::unfold(self.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(state) => return Some((state, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "state subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }

    /// Most recently emitted state, `None` before the first trigger
    pub fn current_state(&self) -> Option<PageState<E>> {
        self.shared.latest.lock().clone()
    }

    /// Page number the next load will request
    pub fn current_page(&self) -> u32 {
        self.shared.cursor.lock().current_page
    }

    /// Check if the last page has been loaded
    pub fn is_last_page(&self) -> bool {
        self.shared.cursor.lock().is_last_page
    }

    // ------------------------------------------------------------------
    // Local queries and mutations
    // ------------------------------------------------------------------

    /// Snapshot of the loaded items
    pub fn loaded_items(&self) -> Vec<E> {
        self.shared.cursor.lock().items.clone()
    }

    /// Number of loaded items
    pub fn item_count(&self) -> usize {
        self.shared.cursor.lock().items.len()
    }

    /// Replace the item at `index`. Out of bounds is a no-op.
    ///
    /// Does not emit `Update`.
    pub fn update_item_at(&self, index: usize, item: E) {
        if let Some(slot) = self.shared.cursor.lock().items.get_mut(index) {
            *slot = item;
        }
    }

    /// Replace the first item matching `predicate`, returning whether one matched
    ///
    /// Does not emit `Update`.
    pub fn update_item(&self, item: E, predicate: impl Fn(&E) -> bool) -> bool {
        let mut cursor = self.shared.cursor.lock();
        match cursor.items.iter_mut().find(|existing| predicate(existing)) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Remove the first item matching `predicate`; emits `Update` if one was removed
    pub fn remove_item_where(&self, predicate: impl Fn(&E) -> bool) {
        let removed = {
            let mut cursor = self.shared.cursor.lock();
            let position = cursor.items.iter().position(|item| predicate(item));
            position.map(|index| {
                cursor.items.remove(index);
                cursor.items.len()
            })
        };
        if let Some(size) = removed {
            self.notify_list_size_change(size);
        }
    }

    /// Remove every item whose id is in `ids`; emits one `Update` if any were removed
    pub fn remove_items_by_ids<K, I, F>(&self, ids: I, id_selector: F)
    where
        K: Eq + Hash,
        I: IntoIterator<Item = K>,
        F: Fn(&E) -> K,
    {
        let ids: HashSet<K> = ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }
        let removed = {
            let mut cursor = self.shared.cursor.lock();
            let before = cursor.items.len();
            cursor.items.retain(|item| !ids.contains(&id_selector(item)));
            (cursor.items.len() != before).then_some(cursor.items.len())
        };
        if let Some(size) = removed {
            debug!(size, "removed items by id");
            self.notify_list_size_change(size);
        }
    }
}

impl<D, E> PageBasedPaginator<D, E>
where
    D: Send + 'static,
    E: Clone + PartialEq + Send + Sync + 'static,
{
    /// Index of the first item equal to `item`
    pub fn index_of(&self, item: &E) -> Option<usize> {
        self.shared
            .cursor
            .lock()
            .items
            .iter()
            .position(|existing| existing == item)
    }

    /// Remove the first item equal to `item`; emits `Update` if it was removed
    pub fn remove_item(&self, item: &E) {
        self.remove_item_where(|existing| existing == item);
    }
}

impl<D, E> Drop for PageBasedPaginator<D, E> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

impl<D, E> std::fmt::Debug for PageBasedPaginator<D, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cursor = self.shared.cursor.lock();
        f.debug_struct("PageBasedPaginator")
            .field("config", &self.shared.config)
            .field("transformer", &self.shared.transformer)
            .field("current_page", &cursor.current_page)
            .field("is_last_page", &cursor.is_last_page)
            .field("items", &cursor.items.len())
            .finish_non_exhaustive()
    }
}
