//! Retry, pacing and pagination helpers
//!
//! Every wait in here races the façade's [`CancellationToken`]: once it fires,
//! the pending request or sleep resolves to [`GrooveError::Cancelled`] and the
//! loops return it as is.

use crate::error::{GrooveError, Result};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(300))
    }
}

/// Awaits `future` unless `cancel` fires first
pub async fn cancellable<T, F>(cancel: &CancellationToken, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GrooveError::Cancelled),
        result = future => result,
    }
}

/// Sleeps for `delay` unless `cancel` fires first
pub async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    cancellable(cancel, async {
        tokio::time::sleep(delay).await;
        Ok(())
    })
    .await
}

/// Runs `operation` until it succeeds or the policy is exhausted
///
/// Only [`GrooveError::is_retryable`] errors are retried; the last error is
/// returned on exhaustion.
pub async fn retry_with_delay<T, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match cancellable(cancel, operation()).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_cancelled() || !e.is_retryable() || attempt >= attempts => return Err(e),
            Err(e) => {
                warn!(attempt, attempts, error = %e, "Attempt failed, retrying");
                pause(policy.delay, cancel).await?;
                attempt += 1;
            }
        }
    }
}

/// Why a page walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// A page with content was reached
    Found,
    /// The last page had no successor
    LastPage,
    /// The chain led back to a page already fetched
    Cycle,
    /// `max_hops` pages were fetched without content
    HopLimit,
    /// A fetch failed before content was found
    FetchFailed,
}

/// Outcome of [`walk_pages`]
#[derive(Debug, Clone)]
pub struct PageWalk<P> {
    /// Page with content, or the last page fetched successfully
    pub page: Option<P>,
    /// Where to continue after `page`, never a page already fetched
    pub next_url: Option<String>,
    pub end: WalkEnd,
}

/// Follows a chain of pages until one has content
///
/// Starting at `start_url`, fetches at most `max_hops` pages. The walk stops
/// at the first page for which `has_items` holds, when `next_url` yields
/// nothing, when a URL comes back a second time, or when a fetch fails. In
/// every case but the first, the last page fetched successfully is returned.
///
/// The continuation of the returned page is dropped when it points at a page
/// already fetched, and always on a cycle.
///
/// Only cancellation is reported as an error.
pub async fn walk_pages<P, F, Fut>(
    start_url: &str,
    max_hops: usize,
    cancel: &CancellationToken,
    mut fetch: F,
    has_items: impl Fn(&P) -> bool,
    next_url: impl Fn(&P) -> Option<String>,
) -> Result<PageWalk<P>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    let mut visited = HashSet::new();
    let mut last = None;
    let mut url = start_url.trim().to_string();
    let mut end = WalkEnd::HopLimit;

    for hop in 0..max_hops {
        if visited.contains(&url) {
            debug!(url = %url, hop, "Page already visited, stopping");
            end = WalkEnd::Cycle;
            break;
        }

        let page = match cancellable(cancel, fetch(url.clone())).await {
            Ok(page) => page,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(url = %url, hop, error = %e, "Page fetch failed, keeping last page");
                end = WalkEnd::FetchFailed;
                break;
            }
        };
        visited.insert(url.clone());

        if has_items(&page) {
            last = Some(page);
            end = WalkEnd::Found;
            break;
        }

        let next = next_url(&page);
        last = Some(page);
        match next {
            Some(next) => url = next.trim().to_string(),
            None => {
                end = WalkEnd::LastPage;
                break;
            }
        }
    }

    let next_url = match (&last, end) {
        (_, WalkEnd::Cycle) | (None, _) => None,
        (Some(page), _) => next_url(page)
            .map(|next| next.trim().to_string())
            .filter(|next| !next.is_empty() && !visited.contains(next)),
    };

    Ok(PageWalk {
        page: last,
        next_url,
        end,
    })
}
