//! The ordered tag store.
//!
//! Maps second offsets to annotation text. The store never overwrites:
//! an insertion targeting an occupied offset relocates forward to the
//! nearest free second, and every mutation goes through that same probe.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::key::TagKey;

/// Exclusive upper bound of the stored offset domain (seconds in a day).
pub const MAX_OFFSET_SECONDS: i64 = 86_400;

/// Tag store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The forward probe exhausted the offset domain.
    #[error("no free slot at or after {key} within the session day")]
    NoSlotAvailable { key: TagKey },

    /// The index-from-end did not resolve to a stored tag.
    #[error("index {index} out of range for {count} tags")]
    IndexOutOfRange { index: i64, count: usize },
}

/// Outcome of a point adjustment, for caller reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    /// Where the tag was before the mutation.
    pub old_key: TagKey,
    /// Where the tag ended up (equal to `old_key` for text edits).
    pub new_key: TagKey,
}

/// Ordered mapping from tag keys to annotation text.
///
/// Invariant: no two entries ever share an offset. Collisions are
/// resolved by relocation, never replacement.
#[derive(Debug, Default, Clone)]
pub struct TagStore {
    tags: BTreeMap<TagKey, String>,
}

impl TagStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// Number of stored tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the store holds no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Ascending iteration over `(key, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (TagKey, &str)> {
        self.tags.iter().map(|(key, text)| (*key, text.as_str()))
    }

    /// Inserts `text` at `key`, probing forward on collision.
    ///
    /// If the offset is occupied, the probe advances one second at a
    /// time until a free offset below [`MAX_OFFSET_SECONDS`] is found.
    /// New tags arrive in increasing time order, so probing forward
    /// keeps approximate chronological placement. Returns the key the
    /// text was actually stored under.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSlotAvailable`] when the probe exhausts
    /// the domain (including a starting offset already past it); the
    /// store is unchanged in that case.
    pub fn insert(&mut self, key: TagKey, text: impl Into<String>) -> Result<TagKey, StoreError> {
        let slot = self.free_slot_from(key)?;
        self.tags.insert(slot, text.into());
        Ok(slot)
    }

    /// Resolves a 1-based index counting back from the latest tag.
    ///
    /// `1` is the greatest stored offset, `len()` the smallest. The
    /// rank is re-derived from the sorted view on every call since
    /// offsets change between calls.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfRange`] (carrying the requested
    /// index and the current count) for anything outside `1..=len()`,
    /// including an empty store.
    pub fn resolve_index(&self, index_from_end: i64) -> Result<TagKey, StoreError> {
        let count = self.tags.len();
        if index_from_end >= 1 {
            if let Ok(back) = usize::try_from(index_from_end - 1) {
                if let Some(key) = self.tags.keys().rev().nth(back) {
                    return Ok(*key);
                }
            }
        }
        Err(StoreError::IndexOutOfRange {
            index: index_from_end,
            count,
        })
    }

    /// Moves or re-texts the tag at `index_from_end`.
    ///
    /// With `delta != 0` the tag keeps its text and relocates to
    /// `old offset + delta` through the probing insert. With
    /// `delta == 0` the tag keeps its key and its text is replaced by
    /// `new_text`. The operation is transactional: if the relocation
    /// finds no free slot the tag is restored at its old key.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError::IndexOutOfRange`] from resolution and
    /// [`StoreError::NoSlotAvailable`] from a failed relocation.
    pub fn adjust_by_index(
        &mut self,
        index_from_end: i64,
        delta: i64,
        new_text: &str,
    ) -> Result<Adjustment, StoreError> {
        let (old_key, old_text) = self.delete_by_index(index_from_end)?;
        let target = old_key.shifted_by(delta);
        let text = if delta == 0 {
            new_text.to_string()
        } else {
            old_text.clone()
        };
        match self.free_slot_from(target) {
            Ok(new_key) => {
                self.tags.insert(new_key, text);
                Ok(Adjustment { old_key, new_key })
            }
            Err(err) => {
                // Old slot is still free after the pop.
                self.tags.insert(old_key, old_text);
                Err(err)
            }
        }
    }

    /// Shifts every tag with offset in `[lower, upper)` by `delta`
    /// seconds, returning how many were relocated.
    ///
    /// Processing order is part of the contract: descending for
    /// `delta > 0` and ascending for `delta < 0`, so tags move out of
    /// each other's way before being displaced into. The candidate set
    /// is snapshotted before any mutation, so relocations during the
    /// pass never change which tags are selected. A tag whose probe
    /// exhausts the domain is restored at its old offset and not
    /// counted.
    pub fn offset_range(&mut self, lower: i64, delta: i64, upper: i64) -> usize {
        if delta == 0 || lower >= upper {
            return 0;
        }
        let mut selected: Vec<TagKey> = self
            .tags
            .range(TagKey::from_seconds(lower)..TagKey::from_seconds(upper))
            .map(|(key, _)| *key)
            .collect();
        if delta > 0 {
            selected.reverse();
        }

        let mut moved = 0;
        for key in selected {
            let Some(text) = self.tags.remove(&key) else {
                continue;
            };
            match self.free_slot_from(key.shifted_by(delta)) {
                Ok(slot) => {
                    self.tags.insert(slot, text);
                    moved += 1;
                }
                Err(err) => {
                    tracing::warn!(%key, %err, "tag not relocated");
                    self.tags.insert(key, text);
                }
            }
        }
        moved
    }

    /// Removes the tag at `index_from_end`, returning its key and text.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError::IndexOutOfRange`] from resolution.
    pub fn delete_by_index(&mut self, index_from_end: i64) -> Result<(TagKey, String), StoreError> {
        let key = self.resolve_index(index_from_end)?;
        let Some(text) = self.tags.remove(&key) else {
            return Err(StoreError::IndexOutOfRange {
                index: index_from_end,
                count: self.tags.len(),
            });
        };
        Ok((key, text))
    }

    /// Finds the first free offset at or after `key`, without mutating.
    fn free_slot_from(&self, key: TagKey) -> Result<TagKey, StoreError> {
        let mut candidate = key;
        while candidate.offset_seconds() < MAX_OFFSET_SECONDS {
            if !self.tags.contains_key(&candidate) {
                return Ok(candidate);
            }
            candidate = candidate.shifted_by(1);
        }
        Err(StoreError::NoSlotAvailable { key })
    }
}
