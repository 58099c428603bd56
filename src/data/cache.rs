use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Keys and fingerprints
// ---------------------------------------------------------------------------

/// Process-local 64-bit fingerprint of any hashable value.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Composite memoization key: a call is served from the cache only when the
/// function's logic, the data it reads and its arguments are all unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub function: &'static str,
    pub logic: u64,
    pub source: u64,
    pub args: u64,
}

impl CacheKey {
    pub fn new<L: Hash + ?Sized, A: Hash + ?Sized>(
        function: &'static str,
        logic: &L,
        source: u64,
        args: &A,
    ) -> Self {
        CacheKey {
            function,
            logic: fingerprint(logic),
            source,
            args: fingerprint(args),
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup results
// ---------------------------------------------------------------------------

/// How a [`Memo`] lookup was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Stored result returned, function not executed.
    Hit,
    /// No stored result; function executed.
    Miss,
    /// Stored result had been mutated; function re-executed.
    Recomputed,
}

/// Advisory diagnostics raised by the cache. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheWarning {
    #[error(
        "the cached result of `{function}` was mutated after it was returned; \
         it has been discarded and recomputed"
    )]
    OutputMutated { function: &'static str },
}

/// Shared handle to a memoized value.
///
/// Reads go through `Deref`. [`Cached::make_mut`] clones the value before the
/// first write while the cache still holds it, so the stored copy is never
/// changed through a handle.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Arc<T>,
    outcome: CacheOutcome,
    warning: Option<CacheWarning>,
}

impl<T> Cached<T> {
    pub fn outcome(&self) -> CacheOutcome {
        self.outcome
    }

    pub fn warning(&self) -> Option<&CacheWarning> {
        self.warning.as_ref()
    }

    /// The shared allocation, for callers that keep the value around.
    pub fn shared(&self) -> Arc<T> {
        Arc::clone(&self.value)
    }
}

impl<T: Clone> Cached<T> {
    /// Copy-on-write access to the value.
    pub fn make_mut(&mut self) -> &mut T {
        if Arc::strong_count(&self.value) > 1 {
            log::debug!("copying shared cached value before mutation");
        }
        Arc::make_mut(&mut self.value)
    }
}

impl<T> Deref for Cached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Lookup counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub mutations: u64,
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

struct Entry<T> {
    value: Arc<T>,
    /// Content fingerprint taken when the value was stored.
    fingerprint: u64,
}

/// Unbounded memoization cache mapping a [`CacheKey`] to an owned, shared
/// result. Entries live until [`Memo::clear`]. Errors are never stored.
pub struct Memo<T> {
    entries: HashMap<CacheKey, Entry<T>>,
    stats: CacheStats,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<T: Hash> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored result for `key`, or run `compute` and store it.
    ///
    /// A stored value whose fingerprint no longer matches is reported as
    /// [`CacheWarning::OutputMutated`], dropped, and recomputed.
    pub fn get_or_try_insert_with<E, F>(
        &mut self,
        key: CacheKey,
        compute: F,
    ) -> Result<Cached<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut warning = None;

        if let Some(entry) = self.entries.get(&key) {
            if fingerprint(&*entry.value) == entry.fingerprint {
                self.stats.hits += 1;
                log::debug!("cache hit for `{}`", key.function);
                return Ok(Cached {
                    value: Arc::clone(&entry.value),
                    outcome: CacheOutcome::Hit,
                    warning: None,
                });
            }
            let mutated = CacheWarning::OutputMutated {
                function: key.function,
            };
            log::warn!("{mutated}");
            self.stats.mutations += 1;
            self.entries.remove(&key);
            warning = Some(mutated);
        }

        self.stats.misses += 1;
        log::info!("cache miss for `{}`, executing", key.function);
        let value = Arc::new(compute()?);
        self.entries.insert(
            key,
            Entry {
                value: Arc::clone(&value),
                fingerprint: fingerprint(&*value),
            },
        );

        let outcome = if warning.is_some() {
            CacheOutcome::Recomputed
        } else {
            CacheOutcome::Miss
        };
        Ok(Cached {
            value,
            outcome,
            warning,
        })
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every stored result. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
