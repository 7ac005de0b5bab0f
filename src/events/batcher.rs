//! Debounced item removal
//!
//! Ids marked for removal are collected until no new id arrives for the
//! configured window, then flushed in one call so the paginator emits a
//! single `Update` for the whole batch.

use crate::pagination::PageBasedPaginator;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Default quiet window before pending removals are flushed
pub const DEFAULT_REMOVAL_WINDOW: Duration = Duration::from_millis(300);

enum Command<Id> {
    Mark(Id),
    Clear,
}

/// Collects ids and removes them in debounced batches
pub struct RemovalBatcher<Id> {
    commands: mpsc::UnboundedSender<Command<Id>>,
    worker: JoinHandle<()>,
}

impl<Id> RemovalBatcher<Id>
where
    Id: PartialEq + Send + 'static,
{
    /// Spawn a batcher calling `flush` with each batch of ids
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn<F>(window: Duration, flush: F) -> Self
    where
        F: Fn(Vec<Id>) + Send + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(window, rx, flush));
        Self { commands, worker }
    }

    /// Spawn a batcher removing flushed ids from `paginator`
    pub fn for_paginator<D, E, S>(
        paginator: Arc<PageBasedPaginator<D, E>>,
        window: Duration,
        id_selector: S,
    ) -> Self
    where
        Id: Eq + Hash,
        D: Send + 'static,
        E: Clone + Send + Sync + 'static,
        S: Fn(&E) -> Id + Send + Sync + 'static,
    {
        Self::spawn(window, move |ids| {
            paginator.remove_items_by_ids(ids, &id_selector);
        })
    }

    /// Mark an id for removal. Already pending ids are ignored.
    pub fn mark(&self, id: Id) {
        let _ = self.commands.send(Command::Mark(id));
    }

    /// Drop every pending id without flushing
    pub fn clear(&self) {
        let _ = self.commands.send(Command::Clear);
    }
}

impl<Id> Drop for RemovalBatcher<Id> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

impl<Id> std::fmt::Debug for RemovalBatcher<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalBatcher").finish_non_exhaustive()
    }
}

async fn run<Id, F>(window: Duration, mut rx: mpsc::UnboundedReceiver<Command<Id>>, flush: F)
where
    Id: PartialEq,
    F: Fn(Vec<Id>),
{
    let mut pending: Vec<Id> = Vec::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            None => rx.recv().await,
            Some(at) => tokio::select! {
                command = rx.recv() => command,
                () = tokio::time::sleep_until(at) => {
                    deadline = None;
                    debug!(count = pending.len(), "flushing pending removals");
                    flush(std::mem::take(&mut pending));
                    continue;
                }
            },
        };

        match command {
            Some(Command::Mark(id)) => {
                if !pending.contains(&id) {
                    pending.push(id);
                    deadline = Some(Instant::now() + window);
                }
            }
            Some(Command::Clear) => {
                pending.clear();
                deadline = None;
            }
            None => break,
        }
    }
}
