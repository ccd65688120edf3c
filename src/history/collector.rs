use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{HistoryConfig, ListenBrainzConfig};
use crate::cursor::{CursorStep, PageCursor};
use crate::source::{fetch_with_retry, ListenSource, RetryPolicy, SourceError};

use super::log::ListenLog;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("fetching page {page} (min_ts {min_ts}) failed: {source}")]
    Fetch {
        page: usize,
        min_ts: i64,
        #[source]
        source: SourceError,
    },
    #[error("a {days}-day window reaches outside the supported date range")]
    WindowOutOfRange { days: u32 },
}

/// Limits applied to a single window walk
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub page_size: u32,
    pub max_pages: usize,
    pub max_duration: Duration,
    pub retry: RetryPolicy,
}

impl CollectOptions {
    pub fn from_config(source: &ListenBrainzConfig, history: &HistoryConfig) -> Self {
        Self {
            page_size: source.page_size,
            max_pages: history.max_pages,
            max_duration: history.max_duration(),
            retry: history.retry.clone().into(),
        }
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 500,
            max_duration: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Why the walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    PageLimit(usize),
    Deadline(Duration),
}

impl StopReason {
    pub fn is_partial(&self) -> bool {
        !matches!(self, StopReason::Exhausted)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "history exhausted"),
            StopReason::PageLimit(pages) => write!(f, "stopped after {pages} pages"),
            StopReason::Deadline(limit) => {
                write!(f, "stopped after {}s time limit", limit.as_secs_f64())
            }
        }
    }
}

#[derive(Debug)]
pub struct CollectedWindow {
    pub log: ListenLog,
    pub pages: usize,
    pub stop: StopReason,
}

/// Walk the listen history forward from `window_start` until it runs out.
///
/// Pages are fetched strictly in order since each cursor depends on the
/// previous page. Every listen received is appended to a log owned by this
/// call. Hitting the page or time limit returns what was collected so far.
pub async fn collect_window(
    source: &dyn ListenSource,
    window_start: i64,
    options: &CollectOptions,
) -> Result<CollectedWindow, HistoryError> {
    let deadline = Instant::now() + options.max_duration;
    let mut cursor = PageCursor::starting_at(window_start);
    let mut log = ListenLog::new();
    let mut pages = 0;

    let stop = loop {
        if pages >= options.max_pages {
            warn!(pages, "page limit reached before history was exhausted");
            break StopReason::PageLimit(pages);
        }

        let min_ts = cursor.min_ts();
        let fetched =
            fetch_with_retry(source, &options.retry, min_ts, options.page_size, deadline).await;
        let page = match fetched {
            Ok(Some(page)) => page,
            Ok(None) => {
                warn!(pages, "time limit reached before history was exhausted");
                break StopReason::Deadline(options.max_duration);
            }
            Err(err) => {
                return Err(HistoryError::Fetch {
                    page: pages + 1,
                    min_ts,
                    source: err,
                })
            }
        };
        pages += 1;

        let step = cursor.advance(&page);
        let received = page.listens.len();
        log.extend(page.listens);
        debug!(page = pages, min_ts, records = received, total = log.count(), "page collected");

        if step == CursorStep::Exhausted {
            break StopReason::Exhausted;
        }
    };

    info!(pages, listens = log.count(), stop = %stop, "listen window collected");

    Ok(CollectedWindow { log, pages, stop })
}
