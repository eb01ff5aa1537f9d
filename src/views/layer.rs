// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Layer view: sources spread along a depth axis

use super::{Mode, View, ViewCore};
use crate::editing::{Cursor, CursorType};
use crate::mixer::Mixer;
use crate::model::{Source, SourceId};
use crate::scene::{Node, NodeId, Pick, Scene, Transform};
use crate::{settings, theme};
use kurbo::{BezPath, Point, Vec2};

pub struct LayerView {
    core: ViewCore,
}

impl Default for LayerView {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerView {
    pub fn new() -> Self {
        let mut core = ViewCore::new(
            Mode::Layer,
            Some(settings::layer::ZOOM),
            settings::layer::DEFAULT_ZOOM,
        );
        let mut axis = BezPath::new();
        axis.move_to((settings::layer::MIN_DEPTH * settings::layer::SPACING, 0.0));
        axis.line_to((settings::layer::MAX_DEPTH * settings::layer::SPACING, 0.0));
        let background = core.scene.background();
        core.scene.insert(
            background,
            Node::mesh(axis).with_color(theme::layer::AXIS).unpickable(),
        );
        Self { core }
    }

    /// Set a source's depth, or read it back when `depth` is negative.
    ///
    /// The depth is clamped to the layer range and a deep update is requested
    /// when it changed. Returns the resulting depth, or `None` for a stale
    /// handle.
    pub fn set_depth(&mut self, mixer: &mut Mixer, id: SourceId, depth: f64) -> Option<f64> {
        let source = mixer.sources.get_mut(id)?;
        if depth < 0.0 {
            return Some(source.depth);
        }
        let depth = depth.clamp(settings::layer::MIN_DEPTH, settings::layer::MAX_DEPTH);
        if depth != source.depth {
            tracing::debug!("Depth of '{}': {} -> {}", source.name, source.depth, depth);
            source.depth = depth;
            mixer.request_deep_update();
        }
        Some(depth)
    }
}

fn build_card(scene: &mut Scene, id: SourceId, _source: &Source) -> NodeId {
    let workspace = scene.workspace();
    let group = scene.insert(workspace, Node::group().with_owner(id));
    scene.insert(group, Node::surface().with_color(theme::source::FILL));
    scene.insert(
        group,
        Node::frame().with_color(theme::source::OUTLINE).unpickable(),
    );
    group
}

impl View for LayerView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn update(&mut self, mixer: &mut Mixer, _dt: f64) {
        let current = mixer.current();
        self.core.sync_sources(mixer, build_card, |scene, node, id, source| {
            let x = source.depth * settings::layer::SPACING;
            scene.set_transform(node, Transform::from_translation(Vec2::new(x, 0.0)));
            scene.set_alpha(node, if source.excluded { 0.3 } else { 1.0 });
            let size = settings::layer::CARD_SIZE;
            let card = Transform::IDENTITY.with_scale(size * source.aspect_ratio, size);
            let children = scene.children(node).to_vec();
            for child in &children {
                scene.set_transform(*child, card);
            }
            if let Some(&frame) = children.get(1)
                && let Some(f) = scene.get_mut(frame)
            {
                f.color = if current == Some(id) {
                    theme::source::CURRENT
                } else {
                    theme::source::OUTLINE
                };
            }
        });
    }

    fn center_source(&mut self, mixer: &Mixer, source: SourceId) {
        if let Some(s) = mixer.sources.get(source) {
            self.core.viewport.translation = Vec2::new(-s.depth * settings::layer::SPACING, 0.0);
        }
    }

    fn grab(&mut self, mixer: &mut Mixer, source: Option<SourceId>, from: Point, to: Point, _pick: Pick) -> Cursor {
        let start = self.core.gesture_start();
        let Some(id) = source else {
            return Cursor::default();
        };
        let Some(initial) = start.source(id) else {
            return Cursor::default();
        };
        if initial.locked {
            return Cursor::new(CursorType::NotAllowed, "Locked");
        }
        let (uid, name) = (initial.uid, initial.name.clone());
        let target = initial.depth + start.viewport.scene_delta(from, to).x / settings::layer::SPACING;
        let Some(depth) = self.set_depth(mixer, id, target.max(0.0)) else {
            return Cursor::default();
        };
        self.core.current_action = format!("{name}: Depth {depth:.2}");
        self.core.current_id = Some(uid);
        Cursor::new(CursorType::ResizeEW, format!("Depth {depth:.2}"))
    }
}
