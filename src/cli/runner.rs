//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PaginatorConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpPageSource, HttpSourceConfig};
use crate::pagination::{PageBasedPaginator, PageState, PaginationState};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Demo {
                total,
                page_size,
                fail_page,
                no_accumulate,
            } => {
                self.demo(*total, *page_size, *fail_page, *no_accumulate)
                    .await
            }
            Commands::Fetch {
                url,
                records_path,
                page_param,
                page_size_param,
                page_size,
                max_pages,
                headers,
            } => {
                let mut source = HttpSourceConfig::new(url.as_str())
                    .with_params(page_param.as_str(), page_size_param.as_str())
                    .with_records_path(records_path.as_str());
                for raw in headers {
                    let (name, value) = raw.split_once('=').ok_or_else(|| {
                        Error::config(format!("Invalid header '{raw}', expected NAME=VALUE"))
                    })?;
                    source = source.header(name.trim(), value.trim());
                }
                self.fetch(source, *page_size, *max_pages).await
            }
        }
    }

    /// Load the paginator config from `--config`, or use defaults
    fn load_config(&self, page_size: Option<u32>) -> Result<PaginatorConfig> {
        let config = match &self.cli.config {
            Some(path) => PaginatorConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => PaginatorConfig::default(),
        };
        Ok(match page_size {
            Some(size) => config.with_page_size(size),
            None => config,
        })
    }

    /// Page through a synthetic dataset of `total` numbered items
    async fn demo(
        &self,
        total: u32,
        page_size: Option<u32>,
        fail_page: Option<u32>,
        no_accumulate: bool,
    ) -> Result<()> {
        let mut config = self.load_config(page_size)?;
        if no_accumulate {
            config = config.with_accumulated_list(false);
        }

        let failed = Arc::new(AtomicBool::new(false));
        let source = move |page: u32, size: u32| {
            let fail = fail_page == Some(page) && !failed.swap(true, Ordering::SeqCst);
            synthetic_page(total, page, size, fail)
        };
        let transformer = |n: u32| async move { Ok::<_, Error>(format!("item-{n}")) };

        let paginator: PageBasedPaginator<u32, String> =
            PageBasedPaginator::with_transformer(config, source, transformer)?;
        self.drain(&paginator, None).await
    }

    /// Page through an HTTP endpoint
    async fn fetch(
        &self,
        source: HttpSourceConfig,
        page_size: Option<u32>,
        max_pages: Option<u32>,
    ) -> Result<()> {
        let config = self.load_config(page_size)?;
        let source = HttpPageSource::<Value>::new(source)?;
        let paginator: PageBasedPaginator<Value> = PageBasedPaginator::new(config, source)?;
        self.drain(&paginator, max_pages).await
    }

    /// Request pages until the end, printing every state. A retryable
    /// failure is retried once per page.
    async fn drain<D, E>(
        &self,
        paginator: &PageBasedPaginator<D, E>,
        max_pages: Option<u32>,
    ) -> Result<()>
    where
        D: Send + 'static,
        E: Clone + Serialize + Send + Sync + 'static,
    {
        let mut states = paginator.subscribe();
        paginator.load_next_page();

        let mut pages = 0_u32;
        let mut retried = false;
        loop {
            let state = match states.recv().await {
                Ok(state) => state,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Output fell behind, states skipped");
                    continue;
                }
                Err(RecvError::Closed) => return Ok(()),
            };
            self.output_message(&state_message(&state));

            match &state {
                PaginationState::Success(_) => {
                    pages += 1;
                    retried = false;
                    if max_pages.is_some_and(|max| pages >= max) {
                        info!(pages, "Page limit reached");
                        return Ok(());
                    }
                    paginator.load_next_page();
                }
                PaginationState::Error { cause, .. } if cause.is_retryable() && !retried => {
                    retried = true;
                    warn!(page = paginator.current_page(), error = %cause, "Retrying page");
                    paginator.load_next_page();
                }
                PaginationState::Error { cause, .. } => {
                    return Err(Error::Other(format!("Pagination stopped: {cause}")));
                }
                PaginationState::End => {
                    info!(pages, items = paginator.item_count(), "Reached end of list");
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Build the output message for a state
pub fn state_message<E: Serialize>(state: &PageState<E>) -> Value {
    let kind = state.kind().as_str();
    match state {
        PaginationState::LoadingInitial | PaginationState::End => json!({ "state": kind }),
        PaginationState::LoadingMore(items)
        | PaginationState::Success(items)
        | PaginationState::Update(items) => json!({
            "state": kind,
            "count": items.len(),
            "items": items,
        }),
        PaginationState::Error {
            accumulated_size,
            cause,
        } => json!({
            "state": kind,
            "accumulated_size": accumulated_size,
            "message": cause.to_string(),
            "retryable": cause.is_retryable(),
        }),
    }
}

/// Items `(page - 1) * size + 1 ..= page * size`, capped at `total`
async fn synthetic_page(total: u32, page: u32, size: u32, fail: bool) -> Result<Vec<u32>> {
    if fail {
        return Err(Error::http_status(503, "synthetic failure"));
    }
    let start = page.saturating_sub(1).saturating_mul(size);
    let end = start.saturating_add(size).min(total);
    Ok((start.saturating_add(1)..=end).collect())
}
