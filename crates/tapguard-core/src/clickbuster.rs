//! Ghost-click suppression ("clickbusting").
//!
//! After a tap is activated through the touch path, the platform usually
//! fires a synthetic click at the same spot a few hundred milliseconds (and
//! occasionally a couple of seconds) later. Every confirmed tap leaves a
//! [`BustEntry`] here; the first native click landing near an entry before it
//! expires consumes it and is swallowed. Entries are keyed by coordinates,
//! never by element, so a tap that swaps the element under the finger still
//! busts the echo on whatever element now sits there.

use crate::{Point, TapConfig};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Coordinates of a recently confirmed tap, eligible to bust one click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BustEntry {
    pub point: Point,
    pub expires_at_ms: u64,
}

impl BustEntry {
    fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms < now_ms
    }
}

/// Registry of bust entries, oldest first.
#[derive(Debug)]
pub struct GhostClickSuppressor {
    entries: VecDeque<BustEntry>,
    window_ms: u64,
    match_tolerance_px: f64,
    max_entries: usize,
    ignore_origin_clicks: bool,
}

impl GhostClickSuppressor {
    pub fn new(config: &TapConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            window_ms: config.suppression_window_ms,
            match_tolerance_px: config.match_tolerance_px,
            max_entries: config.max_bust_entries.max(1),
            ignore_origin_clicks: config.ignore_origin_clicks,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&TapConfig::default())
    }

    /// Record a confirmed tap at `point`.
    pub fn register(&mut self, point: Point, confirmed_at_ms: u64) {
        if !point.is_finite() {
            debug!(x = point.x, y = point.y, "Non-finite bust entry dropped");
            return;
        }
        let entry = BustEntry {
            point,
            expires_at_ms: confirmed_at_ms.saturating_add(self.window_ms),
        };
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(x = evicted.point.x, y = evicted.point.y, "Bust entry evicted (registry full)");
            }
        }
        debug!(
            x = point.x,
            y = point.y,
            expires_at_ms = entry.expires_at_ms,
            live = self.entries.len(),
            "Bust entry registered"
        );
    }

    /// Decide whether a native click is the echo of a handled tap.
    ///
    /// Purges expired entries, then consumes the oldest entry within match
    /// tolerance. Returns `true` if the click must be swallowed.
    pub fn intercept(&mut self, click_point: Point, click_time_ms: u64) -> bool {
        self.sweep(click_time_ms);

        if self.ignore_origin_clicks && click_point.is_origin() {
            return false;
        }

        let tolerance = self.match_tolerance_px;
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.point.is_within(click_point, tolerance))
        else {
            return false;
        };

        self.entries.remove(index);
        debug!(
            x = click_point.x,
            y = click_point.y,
            time_ms = click_time_ms,
            "Ghost click busted"
        );
        true
    }

    /// Drop every entry whose window has passed. Returns how many were removed.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is_expired(now_ms));
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, now_ms, "Expired bust entries purged");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &BustEntry> {
        self.entries.iter()
    }
}

/// Shared handle to the one suppressor every recognizer registers with.
///
/// Each operation holds the lock for its whole purge/match/remove sequence.
#[derive(Debug, Clone)]
pub struct SuppressorHandle {
    inner: Arc<Mutex<GhostClickSuppressor>>,
}

impl SuppressorHandle {
    pub fn new(suppressor: GhostClickSuppressor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(suppressor)),
        }
    }

    pub fn from_config(config: &TapConfig) -> Self {
        Self::new(GhostClickSuppressor::new(config))
    }

    // Every operation leaves the registry consistent, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, GhostClickSuppressor> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, point: Point, confirmed_at_ms: u64) {
        self.lock().register(point, confirmed_at_ms);
    }

    pub fn intercept(&self, click_point: Point, click_time_ms: u64) -> bool {
        self.lock().intercept(click_point, click_time_ms)
    }

    pub fn sweep(&self, now_ms: u64) -> usize {
        self.lock().sweep(now_ms)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the live entries, oldest first.
    pub fn snapshot(&self) -> Vec<BustEntry> {
        self.lock().entries().copied().collect()
    }
}

impl Default for SuppressorHandle {
    fn default() -> Self {
        Self::new(GhostClickSuppressor::with_defaults())
    }
}
