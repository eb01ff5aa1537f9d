// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Geometry view: place, rotate and scale sources on the output frame.
//!
//! The current source carries an overlay of handles. The overlay follows the
//! source's translation and rotation but not its scale, so handles keep their
//! screen size. Transient guides (clock, grid, crosses) show only while a
//! grab is in progress.

use super::{Mode, View, ViewCore};
use crate::editing::{Cursor, CursorType};
use crate::mixer::Mixer;
use crate::model::{Source, SourceId};
use crate::preferences::Preferences;
use crate::scene::{Node, NodeId, Pick, Scene, SymbolKind, Transform};
use crate::{settings, theme};
use kurbo::{Point, Vec2};

/// Nodes of the handle overlay
#[derive(Debug, Clone, Copy)]
struct Overlay {
    root: NodeId,
    position: NodeId,
    rotation: NodeId,
    scaling: NodeId,
    rotation_clock: NodeId,
    rotation_hand: NodeId,
    scaling_grid: NodeId,
    scaling_cross: NodeId,
    position_cross: NodeId,
}

impl Overlay {
    fn build(scene: &mut Scene) -> Self {
        let foreground = scene.foreground();
        let root = scene.insert(foreground, Node::group().hidden());
        let handle = |kind| Node::symbol(kind).with_color(theme::geometry::HANDLE);
        let guide = |node: Node| node.with_color(theme::geometry::GUIDE).unpickable().hidden();

        let rotation_clock = scene.insert(root, guide(Node::symbol(SymbolKind::Rotate)));
        let rotation_hand = scene.insert(root, guide(Node::symbol(SymbolKind::Hand)));
        let scaling_grid = scene.insert(root, guide(Node::frame()));
        let scaling_cross = scene.insert(root, guide(Node::symbol(SymbolKind::Cross)));
        let position_cross = scene.insert(root, guide(Node::symbol(SymbolKind::Cross)));
        let position = scene.insert(root, handle(SymbolKind::Cross));
        let rotation = scene.insert(root, handle(SymbolKind::Rotate));
        let scaling = scene.insert(root, handle(SymbolKind::Square));
        Self {
            root,
            position,
            rotation,
            scaling,
            rotation_clock,
            rotation_hand,
            scaling_grid,
            scaling_cross,
            position_cross,
        }
    }

    fn transients(&self) -> [NodeId; 5] {
        [
            self.rotation_clock,
            self.rotation_hand,
            self.scaling_grid,
            self.scaling_cross,
            self.position_cross,
        ]
    }
}

pub struct GeometryView {
    core: ViewCore,
    output_aspect: f64,
    output_frame: NodeId,
    overlay: Overlay,
}

impl Default for GeometryView {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryView {
    pub fn new() -> Self {
        let mut core = ViewCore::new(
            Mode::Geometry,
            Some(settings::geometry::ZOOM),
            settings::geometry::DEFAULT_ZOOM,
        );
        let background = core.scene.background();
        let output_frame = core.scene.insert(
            background,
            Node::frame()
                .with_color(theme::geometry::OUTPUT_FRAME)
                .unpickable(),
        );
        let overlay = Overlay::build(&mut core.scene);
        let mut view = Self {
            core,
            output_aspect: 1.0,
            output_frame,
            overlay,
        };
        let resolution = settings::render::DEFAULT_RESOLUTION;
        view.set_output_aspect(resolution.width / resolution.height);
        view
    }

    /// Width over height of the output frame drawn behind the sources
    pub fn set_output_aspect(&mut self, aspect: f64) {
        self.output_aspect = aspect;
        self.core
            .scene
            .set_transform(self.output_frame, Transform::IDENTITY.with_scale(aspect, 1.0));
    }

    fn show_transients(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            self.core.scene.set_visible(*node, true);
        }
    }

    fn hide_transients(&mut self) {
        for node in self.overlay.transients() {
            self.core.scene.set_visible(node, false);
        }
    }

    /// Follow the current source with the handle overlay
    fn place_overlay(&mut self, mixer: &Mixer) {
        let current = mixer.current().and_then(|id| Some((id, mixer.sources.get(id)?)));
        let overlay = self.overlay;
        let handle_size = self.core.viewport.pixels_to_scene(settings::editor::HANDLE_SIZE);
        let scene = &mut self.core.scene;
        let Some((id, source)) = current else {
            scene.set_visible(overlay.root, false);
            return;
        };
        if let Some(root) = scene.get_mut(overlay.root) {
            root.owner = Some(id);
            root.visible = true;
            root.transform = Transform::from_translation(source.geometry.translation)
                .with_rotation(source.geometry.rotation);
        }
        let corner = Vec2::new(
            source.geometry.scale.x * source.aspect_ratio,
            source.geometry.scale.y,
        );
        let at = |x: f64, y: f64, size: f64| {
            Transform::from_translation(Vec2::new(x, y)).with_uniform_scale(size)
        };
        scene.set_transform(overlay.position, at(0.0, 0.0, handle_size));
        scene.set_transform(overlay.rotation, at(corner.x, corner.y, handle_size));
        scene.set_transform(overlay.scaling, at(corner.x, -corner.y, handle_size));
        scene.set_transform(overlay.scaling_cross, at(corner.x, -corner.y, handle_size * 2.0));
        scene.set_transform(overlay.position_cross, at(0.0, 0.0, handle_size * 3.0));
        scene.set_transform(overlay.rotation_clock, at(0.0, 0.0, corner.hypot()));
        scene.set_transform(
            overlay.rotation_hand,
            at(0.0, 0.0, corner.hypot()).with_rotation(-source.geometry.rotation),
        );
        scene.set_transform(
            overlay.scaling_grid,
            Transform::IDENTITY.with_scale(corner.x.abs(), corner.y.abs()),
        );
    }
}

fn build_source(scene: &mut Scene, id: SourceId, _source: &Source) -> NodeId {
    let workspace = scene.workspace();
    let group = scene.insert(workspace, Node::group().with_owner(id));
    scene.insert(group, Node::surface().with_color(theme::source::FILL));
    scene.insert(
        group,
        Node::frame().with_color(theme::source::OUTLINE).unpickable(),
    );
    group
}

impl View for GeometryView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn update(&mut self, mixer: &mut Mixer, _dt: f64) {
        let current = mixer.current();
        let selection = mixer.selection.clone();
        self.core.sync_sources(mixer, build_source, |scene, node, id, source| {
            scene.set_transform(node, source.geometry);
            scene.set_alpha(node, if source.excluded { 0.3 } else { 1.0 });
            let quad = Transform::IDENTITY.with_scale(source.aspect_ratio, 1.0);
            let children = scene.children(node).to_vec();
            for child in &children {
                scene.set_transform(*child, quad);
            }
            if let Some(&frame) = children.get(1)
                && let Some(f) = scene.get_mut(frame)
            {
                f.color = if current == Some(id) {
                    theme::source::CURRENT
                } else if selection.contains(&id) {
                    theme::source::SELECTED
                } else {
                    theme::source::OUTLINE
                };
            }
        });
        self.place_overlay(mixer);
    }

    fn center_source(&mut self, mixer: &Mixer, source: SourceId) {
        if let Some(s) = mixer.sources.get(source) {
            self.core.viewport.translation = -s.geometry.translation;
        }
    }

    fn terminate(&mut self, mixer: &mut Mixer) {
        self.hide_transients();
        self.core.terminate(mixer);
    }

    fn cancel(&mut self, mixer: &mut Mixer) {
        self.hide_transients();
        self.core.cancel(mixer);
    }

    fn grab(&mut self, mixer: &mut Mixer, source: Option<SourceId>, from: Point, to: Point, pick: Pick) -> Cursor {
        let start = self.core.gesture_start();
        let Some(id) = source else {
            return Cursor::default();
        };
        let Some(initial) = start.source(id).cloned() else {
            return Cursor::default();
        };
        if initial.locked {
            return Cursor::new(CursorType::NotAllowed, "Locked");
        }
        let p0 = start.viewport.to_scene(from);
        let p1 = start.viewport.to_scene(to);
        let Some(target) = mixer.sources.get_mut(id) else {
            return Cursor::default();
        };

        let center = initial.geometry.translation.to_point();
        let v0 = p0 - center;
        let v1 = p1 - center;
        let (cursor, transients) = if pick.node == self.overlay.rotation {
            let angle = v0.cross(v1).atan2(v0.dot(v1));
            target.geometry.rotation = initial.geometry.rotation + angle;
            let degrees = target.geometry.rotation.to_degrees();
            self.core.current_action = format!("{}: Rotate {:.1}°", target.name, degrees);
            (
                Cursor::new(CursorType::Hand, format!("Angle {degrees:.1}°")),
                vec![self.overlay.rotation_clock, self.overlay.rotation_hand],
            )
        } else if pick.node == self.overlay.scaling {
            let ratio = if v0.hypot() > f64::EPSILON {
                v1.hypot() / v0.hypot()
            } else {
                1.0
            };
            let clamp = |s: f64| {
                let magnitude = (s.abs() * ratio).clamp(settings::geometry::MIN_SCALE, settings::geometry::MAX_SCALE);
                magnitude.copysign(s)
            };
            let scale = Vec2::new(clamp(initial.geometry.scale.x), clamp(initial.geometry.scale.y));
            target.geometry.scale = scale;
            self.core.current_action = format!("{}: Scale {:.2} x {:.2}", target.name, scale.x, scale.y);
            (
                Cursor::new(CursorType::ResizeNWSE, format!("Size {:.2} x {:.2}", scale.x, scale.y)),
                vec![self.overlay.scaling_grid, self.overlay.scaling_cross],
            )
        } else {
            let translation = initial.geometry.translation + (p1 - p0);
            target.geometry.translation = translation;
            self.core.current_action = format!(
                "{}: Position {:.2}, {:.2}",
                target.name, translation.x, translation.y
            );
            (
                Cursor::new(
                    CursorType::ResizeAll,
                    format!("Position {:.2}, {:.2}", translation.x, translation.y),
                ),
                vec![self.overlay.position_cross],
            )
        };
        self.core.current_id = Some(initial.uid);
        self.show_transients(&transients);
        self.place_overlay(mixer);
        cursor
    }

    fn restore_settings(&mut self, prefs: &Preferences) {
        self.core.restore_settings(prefs);
        self.set_output_aspect(prefs.render.width / prefs.render.height.max(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_6;

    fn setup() -> (Mixer, GeometryView, SourceId) {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("cam").with_aspect_ratio(1.0));
        mixer.set_current(Some(id));
        let mut view = GeometryView::new();
        view.update(&mut mixer, 0.0);
        (mixer, view, id)
    }

    fn screen(view: &GeometryView, x: f64, y: f64) -> Point {
        view.core.viewport.to_screen(Point::new(x, y))
    }

    fn grab(view: &mut GeometryView, mixer: &mut Mixer, from: Point, to: Point) -> Cursor {
        let pick = view.pick(from).unwrap();
        let source = view.source_at(mixer, &pick);
        view.initiate(mixer);
        let cursor = view.grab(mixer, source, from, to, pick);
        view.terminate(mixer);
        cursor
    }

    #[test]
    fn rotation_handle_rotates_counter_clockwise() {
        let (mut mixer, mut view, id) = setup();
        let from = screen(&view, 1.0, 1.0);
        let angle = std::f64::consts::FRAC_PI_4 + FRAC_PI_6;
        let r = std::f64::consts::SQRT_2;
        let to = screen(&view, r * angle.cos(), r * angle.sin());
        let cursor = grab(&mut view, &mut mixer, from, to);
        let rotation = mixer.sources.get(id).unwrap().geometry.rotation;
        assert!((rotation - FRAC_PI_6).abs() < 1e-9);
        assert_eq!(cursor.kind, CursorType::Hand);
    }

    #[test]
    fn scaling_handle_scales_by_distance_ratio() {
        let (mut mixer, mut view, id) = setup();
        let from = screen(&view, 1.0, -1.0);
        let to = screen(&view, 2.0, -2.0);
        let cursor = grab(&mut view, &mut mixer, from, to);
        let scale = mixer.sources.get(id).unwrap().geometry.scale;
        assert!((scale.x - 2.0).abs() < 1e-9);
        assert!((scale.y - 2.0).abs() < 1e-9);
        assert_eq!(cursor.kind, CursorType::ResizeNWSE);
    }

    #[test]
    fn surface_grab_translates() {
        let (mut mixer, mut view, id) = setup();
        let from = screen(&view, 0.5, 0.3);
        let to = screen(&view, 0.8, 0.1);
        let cursor = grab(&mut view, &mut mixer, from, to);
        let t = mixer.sources.get(id).unwrap().geometry.translation;
        assert!((t.x - 0.3).abs() < 1e-9);
        assert!((t.y + 0.2).abs() < 1e-9);
        assert_eq!(cursor.kind, CursorType::ResizeAll);
        assert_eq!(mixer.history().len(), 1);
    }

    #[test]
    fn transients_hidden_after_terminate() {
        let (mut mixer, mut view, _) = setup();
        let from = screen(&view, 1.0, 1.0);
        let pick = view.pick(from).unwrap();
        let source = view.source_at(&mixer, &pick);
        view.initiate(&mixer);
        view.grab(&mut mixer, source, from, screen(&view, 0.0, 1.4), pick);
        assert!(view.core.scene.is_visible(view.overlay.rotation_clock));
        view.terminate(&mut mixer);
        assert!(!view.core.scene.is_visible(view.overlay.rotation_clock));
    }

    #[test]
    fn cancel_restores_geometry() {
        let (mut mixer, mut view, id) = setup();
        let from = screen(&view, 0.5, 0.3);
        let pick = view.pick(from).unwrap();
        view.initiate(&mixer);
        view.grab(&mut mixer, Some(id), from, screen(&view, 0.9, 0.9), pick);
        view.cancel(&mut mixer);
        assert_eq!(mixer.sources.get(id).unwrap().geometry, Transform::IDENTITY);
        assert!(mixer.history().is_empty());
    }

    #[test]
    fn overlay_hidden_without_current_source() {
        let (mut mixer, mut view, _) = setup();
        assert!(view.core.scene.is_visible(view.overlay.root));
        mixer.set_current(None);
        view.update(&mut mixer, 0.0);
        assert!(!view.core.scene.is_visible(view.overlay.root));
    }

    #[test]
    fn initiate_terminate_leaves_scene_unchanged() {
        let (mut mixer, mut view, _) = setup();
        let before = format!("{:?}", view.core.scene);
        view.initiate(&mixer);
        view.terminate(&mut mixer);
        assert_eq!(format!("{:?}", view.core.scene), before);
    }
}
