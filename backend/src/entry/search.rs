//! Debounced product search with last-query-wins semantics
//!
//! Every query bumps a generation counter for its slot (one slot per line
//! of a bill being edited). A query that is no longer the newest for its
//! slot after the debounce, or after the catalog replies, is discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use shared::{rank_products, LineId, ProductMatch};

use super::store::ProductCatalog;

/// Candidates fetched from the catalog per suggestion shown
const CANDIDATE_FACTOR: usize = 3;

/// Identifies the input a query was typed into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchSlot {
    pub session: String,
    pub line: LineId,
}

impl SearchSlot {
    pub fn new(session: impl Into<String>, line: LineId) -> Self {
        Self {
            session: session.into(),
            line,
        }
    }
}

/// Result of a search request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "matches", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Suggestions for the newest query of the slot; may be empty
    Ready(Vec<ProductMatch>),
    /// A newer query was issued for the same slot
    Superseded,
}

impl SearchOutcome {
    pub fn matches(&self) -> Option<&[ProductMatch]> {
        match self {
            SearchOutcome::Ready(matches) => Some(matches),
            SearchOutcome::Superseded => None,
        }
    }
}

/// Latest generation per slot with a search still pending
///
/// Generations come from one counter so a slot that was removed and reused
/// never hands out a number an older search still holds.
#[derive(Debug, Default)]
struct Generations {
    next: u64,
    slots: HashMap<SearchSlot, u64>,
}

/// Product search coordinator
pub struct ProductSearch<C: ?Sized> {
    catalog: Arc<C>,
    debounce: Duration,
    limit: usize,
    generations: Mutex<Generations>,
}

impl<C: ProductCatalog + ?Sized> ProductSearch<C> {
    pub fn new(catalog: Arc<C>, debounce: Duration, limit: usize) -> Self {
        Self {
            catalog,
            debounce,
            limit: limit.max(1),
            generations: Mutex::new(Generations::default()),
        }
    }

    fn generations(&self) -> MutexGuard<'_, Generations> {
        self.generations.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self, slot: &SearchSlot) -> u64 {
        let mut generations = self.generations();
        generations.next += 1;
        let generation = generations.next;
        generations.slots.insert(slot.clone(), generation);
        generation
    }

    fn is_current(&self, slot: &SearchSlot, generation: u64) -> bool {
        self.generations().slots.get(slot).copied() == Some(generation)
    }

    /// Release the slot if `generation` is still its newest search
    fn finish(&self, slot: &SearchSlot, generation: u64) -> bool {
        let mut generations = self.generations();
        if generations.slots.get(slot).copied() != Some(generation) {
            return false;
        }
        generations.slots.remove(slot);
        true
    }

    /// Invalidate any in-flight search for a slot
    pub fn cancel(&self, slot: &SearchSlot) {
        self.generations().slots.remove(slot);
    }

    /// Number of slots with a search still pending
    pub fn pending_slots(&self) -> usize {
        self.generations().slots.len()
    }

    /// Run a query for a slot
    ///
    /// Catalog failures are logged and reported as no suggestions.
    pub async fn search(&self, slot: &SearchSlot, query: &str) -> SearchOutcome {
        let generation = self.bump(slot);
        let query = query.trim();
        if query.is_empty() {
            self.finish(slot, generation);
            return SearchOutcome::Ready(Vec::new());
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(slot, generation) {
            return SearchOutcome::Superseded;
        }

        let reply = self
            .catalog
            .search_products(query, self.limit.saturating_mul(CANDIDATE_FACTOR))
            .await;

        if !self.finish(slot, generation) {
            tracing::debug!("Discarding stale product search '{}' for {}", query, slot.line);
            return SearchOutcome::Superseded;
        }

        match reply {
            Ok(candidates) => SearchOutcome::Ready(rank_products(query, candidates, self.limit)),
            Err(err) => {
                tracing::warn!("Product search '{}' failed: {}", query, err);
                SearchOutcome::Ready(Vec::new())
            }
        }
    }
}
