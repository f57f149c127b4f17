//! Cache invalidation signals.
//!
//! Mutations bump per-tag generation counters; the listing handler caches a
//! composed page per generation, and the fresh single-pitch read bypasses
//! caching entirely.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use pitchboard_types::api::ListingPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTag<'a> {
    Home,
    PitchList,
    Pitch(&'a str),
}

#[derive(Default)]
struct Inner {
    home: AtomicU64,
    pitch_list: AtomicU64,
    pitches: Mutex<HashMap<String, u64>>,
}

#[derive(Clone, Default)]
pub struct Revalidator {
    inner: Arc<Inner>,
}

impl Revalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self, tag: CacheTag<'_>) {
        match tag {
            CacheTag::Home => {
                self.inner.home.fetch_add(1, Ordering::SeqCst);
            }
            CacheTag::PitchList => {
                self.inner.pitch_list.fetch_add(1, Ordering::SeqCst);
            }
            CacheTag::Pitch(id) => {
                let mut map = self.inner.pitches.lock().unwrap_or_else(|e| e.into_inner());
                *map.entry(id.to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn generation(&self, tag: CacheTag<'_>) -> u64 {
        match tag {
            CacheTag::Home => self.inner.home.load(Ordering::SeqCst),
            CacheTag::PitchList => self.inner.pitch_list.load(Ordering::SeqCst),
            CacheTag::Pitch(id) => {
                let map = self.inner.pitches.lock().unwrap_or_else(|e| e.into_inner());
                map.get(id).copied().unwrap_or(0)
            }
        }
    }
}

/// Composed listing pages keyed by (page, page_size), valid for a single
/// pitch-list generation.
#[derive(Default)]
pub struct ListingCache {
    entries: Mutex<HashMap<(u32, u32), (u64, ListingPage)>>,
}

impl ListingCache {
    pub fn get(&self, generation: u64, page: u32, page_size: u32) -> Option<ListingPage> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&(page, page_size))
            .filter(|(cached_gen, _)| *cached_gen == generation)
            .map(|(_, cached)| cached.clone())
    }

    pub fn put(&self, generation: u64, page: u32, page_size: u32, listing: ListingPage) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((page, page_size), (generation, listing));
    }
}
