//! Search-as-you-type debouncing.
//!
//! Every keystroke in the search box issues a suggest request. Each visitor
//! has a single debounce timer: a new request resets it, and only the
//! request that survives a full quiet window actually queries the backend.
//!
//! # Architecture
//!
//! - Each key (one per browser, from the `qkart_search` cookie) owns an
//!   atomic generation counter
//! - `debounce()` bumps the counter, sleeps for the window, then checks
//!   whether its generation is still the latest
//! - Counters live in a bounded `moka` cache with idle expiry, so
//!   abandoned keys do not accumulate

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

/// Outcome of a debounced call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounced {
    /// No newer call arrived during the window; proceed.
    Fire,
    /// A newer call for the same key replaced this one.
    Superseded,
}

/// Per-key, latest-wins debouncer.
#[derive(Clone)]
pub struct SearchDebouncer {
    window: Duration,
    generations: Cache<String, Arc<AtomicU64>>,
}

impl SearchDebouncer {
    /// Maximum number of concurrently tracked visitors.
    const MAX_KEYS: u64 = 100_000;

    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        let generations = Cache::builder()
            .max_capacity(Self::MAX_KEYS)
            .time_to_idle(window.saturating_mul(20).max(Duration::from_secs(60)))
            .build();

        Self {
            window,
            generations,
        }
    }

    /// The configured quiet window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Wait out the debounce window for `key`.
    ///
    /// Returns [`Debounced::Fire`] if this is still the most recent call for
    /// `key` once the window has elapsed, [`Debounced::Superseded`] otherwise.
    /// A zero window always fires immediately.
    pub async fn debounce(&self, key: &str) -> Debounced {
        if self.window.is_zero() {
            return Debounced::Fire;
        }

        let counter = self
            .generations
            .get_with(key.to_owned(), async { Arc::new(AtomicU64::new(0)) })
            .await;

        let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.window).await;

        if counter.load(Ordering::SeqCst) == generation {
            Debounced::Fire
        } else {
            tracing::debug!(key, generation, "Search superseded by newer input");
            Debounced::Superseded
        }
    }
}
