// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Shared mixing state handed to every view.
//!
//! The `Mixer` owns the sources, the selection, the current source, the output
//! fading and the draw order. Views mutate it through gestures; anything that
//! changes stacking raises the [`DeepUpdate`] token, and the compositor takes
//! that token once per frame to recompute the draw order before drawing.

use crate::editing::Selection;
use crate::model::{EntityId, Source, SourceId, SourceList, SourceStore};
use crate::settings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Invalidation token: the draw order must be recomputed before next draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeepUpdate {
    pending: bool,
}

impl DeepUpdate {
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clear the token, returning whether it was set
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Color the output fades toward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeColor {
    #[default]
    Black,
    White,
}

/// A committed gesture, for the action history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub label: String,
    pub source: Option<EntityId>,
}

#[derive(Debug, Default)]
pub struct Mixer {
    pub sources: SourceStore,
    pub selection: Selection,
    current: Option<SourceId>,
    fading: f64,
    fade_color: FadeColor,
    deep_update: DeepUpdate,
    draw_order: SourceList,
    history: Vec<ActionRecord>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Sources =====

    pub fn add_source(&mut self, source: Source) -> SourceId {
        tracing::info!("Adding source '{}' at depth {}", source.name, source.depth);
        let id = self.sources.insert(source);
        self.deep_update.request();
        id
    }

    /// Add a source stacked above every existing one
    pub fn add_source_on_top(&mut self, mut source: Source) -> SourceId {
        let top = self
            .sources
            .iter()
            .map(|(_, s)| s.depth)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))));
        source.depth = top
            .map_or(settings::layer::MIN_DEPTH, |d| d + settings::layer::DEPTH_STEP)
            .min(settings::layer::MAX_DEPTH);
        self.add_source(source)
    }

    pub fn remove_source(&mut self, id: SourceId) -> Option<Source> {
        let source = self.sources.remove(id)?;
        tracing::info!("Removed source '{}'", source.name);
        self.selection.remove(&id);
        if self.current == Some(id) {
            self.current = None;
        }
        self.draw_order.retain(|s| *s != id);
        self.deep_update.request();
        Some(source)
    }

    /// The current source, if it is still alive
    pub fn current(&self) -> Option<SourceId> {
        self.current.filter(|id| self.sources.contains(*id))
    }

    /// Make a source current; stale handles clear it
    pub fn set_current(&mut self, id: Option<SourceId>) {
        self.current = id.filter(|id| self.sources.contains(*id));
    }

    pub fn current_source(&self) -> Option<&Source> {
        self.current().and_then(|id| self.sources.get(id))
    }

    /// Selected sources that are still alive, in handle order
    pub fn selected(&self) -> SourceList {
        self.selection
            .iter()
            .copied()
            .filter(|id| self.sources.contains(*id))
            .collect()
    }

    // ===== Output =====

    pub fn fading(&self) -> f64 {
        self.fading
    }

    pub fn set_fading(&mut self, fading: f64) {
        self.fading = fading.clamp(0.0, 1.0);
    }

    pub fn fade_color(&self) -> FadeColor {
        self.fade_color
    }

    pub fn set_fade_color(&mut self, color: FadeColor) {
        self.fade_color = color;
    }

    // ===== Ordering =====

    pub fn request_deep_update(&mut self) {
        self.deep_update.request();
    }

    pub fn needs_deep_update(&self) -> bool {
        self.deep_update.is_pending()
    }

    /// Recompute the draw order if a deep update was requested.
    ///
    /// Sources are ordered by depth. Equal depths keep their previous relative
    /// order, and sources new to the order fall back to their identity.
    pub fn reorder(&mut self) -> bool {
        if !self.deep_update.take() {
            return false;
        }
        let previous: HashMap<SourceId, usize> = self
            .draw_order
            .iter()
            .enumerate()
            .map(|(rank, id)| (*id, rank))
            .collect();
        let mut order: Vec<(SourceId, f64, usize, EntityId)> = self
            .sources
            .iter()
            .map(|(id, s)| (id, s.depth, previous.get(&id).copied().unwrap_or(usize::MAX), s.uid))
            .collect();
        order.sort_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then(a.2.cmp(&b.2))
                .then(a.3.cmp(&b.3))
        });
        self.draw_order = order.into_iter().map(|(id, ..)| id).collect();
        tracing::debug!("Reordered {} sources", self.draw_order.len());
        true
    }

    /// Sources from bottom to top as of the last reorder
    pub fn draw_order(&self) -> &[SourceId] {
        &self.draw_order
    }

    // ===== History =====

    pub fn record_action(&mut self, label: impl Into<String>, source: Option<EntityId>) {
        let record = ActionRecord {
            label: label.into(),
            source,
        };
        tracing::info!("Action: {} ({:?})", record.label, record.source);
        self.history.push(record);
    }

    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_sources_requests_deep_update() {
        let mut mixer = Mixer::new();
        assert!(!mixer.needs_deep_update());
        mixer.add_source(Source::new("a"));
        assert!(mixer.needs_deep_update());
        assert!(mixer.reorder());
        assert!(!mixer.needs_deep_update());
        assert!(!mixer.reorder());
    }

    #[test]
    fn reorder_sorts_by_depth() {
        let mut mixer = Mixer::new();
        let top = mixer.add_source(Source::new("top").with_depth(5.0));
        let bottom = mixer.add_source(Source::new("bottom").with_depth(1.0));
        mixer.reorder();
        assert_eq!(mixer.draw_order(), &[bottom, top]);
    }

    #[test]
    fn equal_depths_keep_previous_order() {
        let mut mixer = Mixer::new();
        let a = mixer.add_source(Source::new("a").with_depth(1.0));
        let b = mixer.add_source(Source::new("b").with_depth(2.0));
        mixer.reorder();
        assert_eq!(mixer.draw_order(), &[a, b]);

        // b drops to a's depth: it was above a, so it stays above
        if let Some(s) = mixer.sources.get_mut(b) {
            s.depth = 1.0;
        }
        mixer.request_deep_update();
        mixer.reorder();
        assert_eq!(mixer.draw_order(), &[a, b]);

        // a rises to 1.0 again from below: no change either
        if let Some(s) = mixer.sources.get_mut(a) {
            s.depth = 1.0;
        }
        mixer.request_deep_update();
        mixer.reorder();
        assert_eq!(mixer.draw_order(), &[a, b]);
    }

    #[test]
    fn new_sources_at_equal_depth_order_by_identity() {
        let mut mixer = Mixer::new();
        let first = mixer.add_source(Source::new("first"));
        let second = mixer.add_source(Source::new("second"));
        mixer.reorder();
        assert_eq!(mixer.draw_order(), &[first, second]);
    }

    #[test]
    fn selected_follows_handle_order() {
        let mut mixer = Mixer::new();
        let a = mixer.add_source(Source::new("a"));
        let b = mixer.add_source(Source::new("b"));
        let c = mixer.add_source(Source::new("c"));
        mixer.selection.insert(c);
        mixer.selection.insert(a);
        mixer.selection.insert(b);
        assert_eq!(mixer.selected(), vec![a, b, c]);

        mixer.remove_source(b);
        assert_eq!(mixer.selected(), vec![a, c]);
    }

    #[test]
    fn add_on_top_stacks_above() {
        let mut mixer = Mixer::new();
        let a = mixer.add_source_on_top(Source::new("a"));
        let b = mixer.add_source_on_top(Source::new("b"));
        let da = mixer.sources.get(a).map(|s| s.depth).unwrap_or_default();
        let db = mixer.sources.get(b).map(|s| s.depth).unwrap_or_default();
        assert!(db > da);
    }

    #[test]
    fn removing_current_clears_it() {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("a"));
        mixer.set_current(Some(id));
        mixer.selection.insert(id);
        assert_eq!(mixer.current(), Some(id));
        mixer.remove_source(id);
        assert_eq!(mixer.current(), None);
        assert!(mixer.selection.is_empty());
        mixer.set_current(Some(id));
        assert_eq!(mixer.current(), None);
    }

    #[test]
    fn fading_is_clamped() {
        let mut mixer = Mixer::new();
        mixer.set_fading(2.0);
        assert_eq!(mixer.fading(), 1.0);
        mixer.set_fading(-1.0);
        assert_eq!(mixer.fading(), 0.0);
    }
}
