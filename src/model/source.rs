// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Sources and the generational store that owns them.
//!
//! Views never own sources. They keep [`SourceId`] handles, which carry the
//! slot generation so that a handle captured before a source was deleted
//! resolves to nothing rather than to a source that reused the slot.

use super::EntityId;
use crate::scene::Transform;
use kurbo::{Point, Vec2};
use std::fmt;

/// Ordered sequence of source handles (z-order or playlist order)
pub type SourceList = Vec<SourceId>;

/// A handle to a source in a [`SourceStore`]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId {
    idx: u32,
    generation: u32,
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({}@gen{})", self.idx, self.generation)
    }
}

/// Texture placement inside a source's frame, edited in the appearance view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub translation: Vec2,
    pub rotation: f64,
    pub scale: Vec2,
    /// Visible fraction of the texture along each axis, in `(0, 1]`
    pub crop: Vec2,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            crop: Vec2::new(1.0, 1.0),
        }
    }
}

/// A video source being mixed
///
/// Holds the per-view state each view edits: the mixing position and the alpha
/// derived from it, the geometry transform, the stacking depth and the texture
/// appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub uid: EntityId,
    pub name: String,
    /// Width over height of the source frame
    pub aspect_ratio: f64,
    /// Position on the mixing disk
    pub mixing: Point,
    pub alpha: f64,
    /// Outside the mix (dropped into limbo)
    pub excluded: bool,
    pub geometry: Transform,
    pub depth: f64,
    pub texture: Appearance,
    /// Locked sources refuse every grab
    pub locked: bool,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uid: EntityId::next(),
            name: name.into(),
            aspect_ratio: 16.0 / 9.0,
            mixing: Point::ZERO,
            alpha: 1.0,
            excluded: false,
            geometry: Transform::IDENTITY,
            depth: 0.0,
            texture: Appearance::default(),
            locked: false,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_mixing(mut self, mixing: Point) -> Self {
        self.mixing = mixing;
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    source: Option<Source>,
}

/// Slot storage for sources with a free list and generation counters
#[derive(Debug, Default)]
pub struct SourceStore {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source) -> SourceId {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.source = Some(source);
            SourceId {
                idx,
                generation: slot.generation,
            }
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                source: Some(source),
            });
            SourceId { idx, generation: 0 }
        }
    }

    /// Remove a source, invalidating every handle to it
    pub fn remove(&mut self, id: SourceId) -> Option<Source> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let source = slot.source.take()?;
        slot.generation += 1;
        self.free_list.push(id.idx);
        Some(source)
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.slots
            .get(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.source.as_ref())
    }

    pub fn get_mut(&mut self, id: SourceId) -> Option<&mut Source> {
        self.slots
            .get_mut(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.source.as_mut())
    }

    /// Live sources in slot order
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &Source)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.source.as_ref().map(|source| {
                (
                    SourceId {
                        idx: idx as u32,
                        generation: slot.generation,
                    },
                    source,
                )
            })
        })
    }

    pub fn ids(&self) -> SourceList {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Find a live source by name
    pub fn find(&self, name: &str) -> Option<SourceId> {
        self.iter().find(|(_, s)| s.name == name).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.source.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
