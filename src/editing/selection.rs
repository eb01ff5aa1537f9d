// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Immutable selection set for tracking which sources are selected.
//!
//! `Selection` wraps an `Arc<BTreeSet<SourceId>>` so it can be cheaply cloned
//! into gesture snapshots. Mutations produce a new set. The `BTreeSet` gives
//! deterministic iteration order, which matters when a grab moves every
//! selected source at once.

use crate::model::SourceId;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A set of selected sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    inner: Arc<BTreeSet<SourceId>>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BTreeSet::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.inner.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceId> {
        self.inner.iter()
    }

    /// Add a source to the selection
    pub fn insert(&mut self, id: SourceId) {
        let mut set = (*self.inner).clone();
        set.insert(id);
        self.inner = Arc::new(set);
    }

    /// Remove a source from the selection
    pub fn remove(&mut self, id: &SourceId) {
        let mut set = (*self.inner).clone();
        set.remove(id);
        self.inner = Arc::new(set);
    }

    /// Replace the whole selection
    pub fn set(&mut self, ids: impl IntoIterator<Item = SourceId>) {
        self.inner = Arc::new(ids.into_iter().collect());
    }

    pub fn clear(&mut self) {
        self.inner = Arc::new(BTreeSet::new());
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}
