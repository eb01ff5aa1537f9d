// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Unique identities for sources and sessions.
//!
//! Each `EntityId` is a monotonically increasing `u64` taken from a global
//! atomic counter. Identities outlive store slots: a source keeps its identity
//! for the whole process, so action history and depth tie-breaking can refer
//! to it after the slot holding it has been recycled.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identity for a source or session
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

impl EntityId {
    /// Create a new unique entity ID
    pub fn next() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identity value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::next()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
