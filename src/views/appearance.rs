// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Appearance view: edit how a source's texture sits inside its frame.
//!
//! One source is edited at a time. It follows the mixer's current source, and
//! its texture and handle overlay are rebuilt only when the edited source
//! changes. The checkerboard, frame and crop scales behind it track the edited
//! source's aspect ratio.

use super::{Mode, View, ViewCore};
use crate::editing::{Cursor, CursorType};
use crate::mixer::Mixer;
use crate::model::{Appearance, SourceId};
use crate::scene::{Node, NodeId, Pick, SymbolKind, Transform};
use crate::{settings, theme};
use kurbo::{BezPath, Point, Vec2};
use std::f64::consts::FRAC_PI_2;

/// Offset of the crop scales outside the frame
const SCALE_OFFSET: f64 = 1.1;

#[derive(Debug, Clone, Copy)]
struct Handles {
    scaling: NodeId,
    rotation: NodeId,
    crop_horizontal: NodeId,
    crop_vertical: NodeId,
}

pub struct AppearanceView {
    core: ViewCore,
    edit_source: Option<SourceId>,
    need_edit_update: bool,
    background_aspect: f64,
    checker: NodeId,
    frame: NodeId,
    horizontal_scale: NodeId,
    vertical_scale: NodeId,
    overlay_root: NodeId,
    texture: Option<NodeId>,
    handles: Option<Handles>,
    overlay_builds: usize,
}

impl Default for AppearanceView {
    fn default() -> Self {
        Self::new()
    }
}

impl AppearanceView {
    pub fn new() -> Self {
        let mut core = ViewCore::new(
            Mode::Appearance,
            Some(settings::appearance::ZOOM),
            settings::appearance::DEFAULT_ZOOM,
        );
        let scene = &mut core.scene;
        let background = scene.background();
        let checker = scene.insert(
            background,
            Node::surface().with_color(theme::appearance::CHECKER).unpickable(),
        );
        let frame = scene.insert(
            background,
            Node::frame().with_color(theme::appearance::FRAME).unpickable(),
        );

        let mut line = BezPath::new();
        line.move_to((-1.0, 0.0));
        line.line_to((1.0, 0.0));
        let horizontal_scale = scene.insert(
            background,
            Node::mesh(line.clone())
                .with_color(theme::appearance::SCALE_LINE)
                .unpickable()
                .hidden(),
        );
        let vertical_scale = scene.insert(
            background,
            Node::mesh(line)
                .with_color(theme::appearance::SCALE_LINE)
                .unpickable()
                .hidden(),
        );
        let foreground = scene.foreground();
        let overlay_root = scene.insert(foreground, Node::group());

        let mut view = Self {
            core,
            edit_source: None,
            need_edit_update: true,
            background_aspect: 0.0,
            checker,
            frame,
            horizontal_scale,
            vertical_scale,
            overlay_root,
            texture: None,
            handles: None,
            overlay_builds: 0,
        };
        view.adjust_background(16.0 / 9.0);
        view
    }

    /// The edited source, switching to the mixer's current source whenever
    /// that changes. A removed source stops being edited.
    pub fn edit_or_current_source(&mut self, mixer: &Mixer) -> Option<SourceId> {
        if let Some(current) = mixer.current()
            && self.edit_source != Some(current)
        {
            tracing::debug!("Appearance: editing {:?}", current);
            self.edit_source = Some(current);
            self.need_edit_update = true;
        }
        if let Some(edit) = self.edit_source
            && !mixer.sources.contains(edit)
        {
            self.edit_source = None;
            self.need_edit_update = true;
        }
        self.edit_source
    }

    /// Fit the checkerboard, frame and crop scales to an aspect ratio.
    ///
    /// Returns whether anything changed.
    pub fn adjust_background(&mut self, aspect: f64) -> bool {
        if (aspect - self.background_aspect).abs() < f64::EPSILON {
            return false;
        }
        self.background_aspect = aspect;
        let scene = &mut self.core.scene;
        let quad = Transform::IDENTITY.with_scale(aspect, 1.0);
        scene.set_transform(self.checker, quad);
        scene.set_transform(self.frame, quad);
        scene.set_transform(
            self.horizontal_scale,
            Transform::from_translation(Vec2::new(0.0, -SCALE_OFFSET)).with_scale(aspect, 1.0),
        );
        scene.set_transform(
            self.vertical_scale,
            Transform::from_translation(Vec2::new(-aspect * SCALE_OFFSET, 0.0)).with_rotation(FRAC_PI_2),
        );
        true
    }

    /// How many times the handle overlay has been built
    pub fn overlay_builds(&self) -> usize {
        self.overlay_builds
    }

    fn rebuild(&mut self) {
        let scene = &mut self.core.scene;
        let workspace = scene.workspace();
        scene.clear_children(workspace);
        scene.clear_children(self.overlay_root);
        self.texture = None;
        self.handles = None;
        self.need_edit_update = false;
        let Some(edit) = self.edit_source else {
            return;
        };

        self.texture = Some(scene.insert(
            workspace,
            Node::surface().with_color(theme::source::FILL).with_owner(edit),
        ));
        if let Some(root) = scene.get_mut(self.overlay_root) {
            root.owner = Some(edit);
        }
        let handle = |kind| Node::symbol(kind).with_color(theme::appearance::HANDLE);
        self.handles = Some(Handles {
            scaling: scene.insert(self.overlay_root, handle(SymbolKind::Square)),
            rotation: scene.insert(self.overlay_root, handle(SymbolKind::Rotate)),
            crop_horizontal: scene.insert(self.overlay_root, handle(SymbolKind::Arrows)),
            crop_vertical: scene.insert(self.overlay_root, handle(SymbolKind::Arrows)),
        });
        self.overlay_builds += 1;
    }

    fn place(&mut self, aspect: f64, texture: &Appearance) {
        let half = Vec2::new(
            aspect * texture.scale.x * texture.crop.x,
            texture.scale.y * texture.crop.y,
        );
        let size = self.core.viewport.pixels_to_scene(settings::editor::HANDLE_SIZE);
        let scene = &mut self.core.scene;
        if let Some(node) = self.texture {
            scene.set_transform(
                node,
                Transform::from_translation(texture.translation)
                    .with_rotation(texture.rotation)
                    .with_scale(half.x, half.y),
            );
        }
        scene.set_transform(
            self.overlay_root,
            Transform::from_translation(texture.translation).with_rotation(texture.rotation),
        );
        if let Some(h) = self.handles {
            let at = |x: f64, y: f64| Transform::from_translation(Vec2::new(x, y)).with_uniform_scale(size);
            scene.set_transform(h.scaling, at(half.x, -half.y));
            scene.set_transform(h.rotation, at(half.x, half.y));
            scene.set_transform(h.crop_horizontal, at(half.x, 0.0));
            scene.set_transform(h.crop_vertical, at(0.0, half.y).with_rotation(FRAC_PI_2));
        }
    }

    fn show_scales(&mut self, horizontal: bool, vertical: bool) {
        self.core.scene.set_visible(self.horizontal_scale, horizontal);
        self.core.scene.set_visible(self.vertical_scale, vertical);
    }
}

/// `v` expressed in a frame rotated by `angle`
fn unrotate(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos)
}

/// Ratio of `to` over `from`, or 1 when `from` is degenerate
fn ratio(from: f64, to: f64) -> f64 {
    if from.abs() > f64::EPSILON { to / from } else { 1.0 }
}

/// Snap to the nearest quarter turn when within the snap angle
fn snap_rotation(angle: f64) -> f64 {
    let quarter = (angle / FRAC_PI_2).round() * FRAC_PI_2;
    if (angle - quarter).abs() < settings::appearance::ROTATION_SNAP {
        quarter
    } else {
        angle
    }
}

impl View for AppearanceView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn update(&mut self, mixer: &mut Mixer, _dt: f64) {
        let edit = self.edit_or_current_source(mixer);
        if self.need_edit_update {
            self.rebuild();
        }
        let Some(source) = edit.and_then(|id| mixer.sources.get(id)) else {
            self.adjust_background(16.0 / 9.0);
            return;
        };
        let (aspect, texture) = (source.aspect_ratio, source.texture);
        self.adjust_background(aspect);
        self.place(aspect, &texture);
    }

    /// Only the edited texture and its handles answer picks
    fn pick(&self, point: Point) -> Option<Pick> {
        let pick = self.core.pick(point)?;
        let scene = &self.core.scene;
        let own = self.texture == Some(pick.node) || scene.is_ancestor(self.overlay_root, pick.node);
        own.then_some(pick)
    }

    fn select(&mut self, _mixer: &mut Mixer, _from: Point, _to: Point) {}

    fn select_all(&mut self, mixer: &mut Mixer) {
        let edit = self.edit_or_current_source(mixer);
        mixer.selection.set(edit);
    }

    fn center_source(&mut self, mixer: &Mixer, source: SourceId) {
        if self.edit_source == Some(source)
            && let Some(s) = mixer.sources.get(source)
        {
            self.core.viewport.translation = -s.texture.translation;
        }
    }

    fn terminate(&mut self, mixer: &mut Mixer) {
        self.show_scales(false, false);
        self.core.terminate(mixer);
    }

    fn cancel(&mut self, mixer: &mut Mixer) {
        self.show_scales(false, false);
        self.core.cancel(mixer);
    }

    fn grab(&mut self, mixer: &mut Mixer, source: Option<SourceId>, from: Point, to: Point, pick: Pick) -> Cursor {
        let start = self.core.gesture_start();
        let Some(id) = self.edit_source.filter(|e| source.is_none_or(|s| s == *e)) else {
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

        let before = initial.texture;
        let center = before.translation.to_point();
        let v0 = p0 - center;
        let v1 = p1 - center;
        let handles = self.handles;
        let is = |node: Option<NodeId>| node == Some(pick.node);
        let mut scales = (false, false);

        let cursor = if is(handles.map(|h| h.crop_horizontal)) {
            let r = ratio(unrotate(v0, before.rotation).x, unrotate(v1, before.rotation).x);
            target.texture.crop.x = (before.crop.x * r).clamp(settings::appearance::MIN_CROP, 1.0);
            scales.0 = true;
            let crop = target.texture.crop.x * 100.0;
            self.core.current_action = format!("{}: Crop width {crop:.0}%", target.name);
            Cursor::new(CursorType::ResizeEW, format!("Crop {crop:.0}%"))
        } else if is(handles.map(|h| h.crop_vertical)) {
            let r = ratio(unrotate(v0, before.rotation).y, unrotate(v1, before.rotation).y);
            target.texture.crop.y = (before.crop.y * r).clamp(settings::appearance::MIN_CROP, 1.0);
            scales.1 = true;
            let crop = target.texture.crop.y * 100.0;
            self.core.current_action = format!("{}: Crop height {crop:.0}%", target.name);
            Cursor::new(CursorType::ResizeNS, format!("Crop {crop:.0}%"))
        } else if is(handles.map(|h| h.scaling)) {
            let r = ratio(v0.hypot(), v1.hypot());
            let clamp = |s: f64| (s * r).clamp(settings::geometry::MIN_SCALE, settings::geometry::MAX_SCALE);
            target.texture.scale = Vec2::new(clamp(before.scale.x), clamp(before.scale.y));
            let scale = target.texture.scale;
            self.core.current_action = format!("{}: Texture scale {:.2} x {:.2}", target.name, scale.x, scale.y);
            Cursor::new(CursorType::ResizeNWSE, format!("Scale {:.2} x {:.2}", scale.x, scale.y))
        } else if is(handles.map(|h| h.rotation)) {
            let angle = before.rotation + v0.cross(v1).atan2(v0.dot(v1));
            target.texture.rotation = snap_rotation(angle);
            let degrees = target.texture.rotation.to_degrees();
            self.core.current_action = format!("{}: Texture angle {degrees:.1}°", target.name);
            Cursor::new(CursorType::Hand, format!("Angle {degrees:.1}°"))
        } else if self.texture == Some(pick.node) {
            target.texture.translation = before.translation + (p1 - p0);
            let t = target.texture.translation;
            self.core.current_action = format!("{}: Texture position {:.2}, {:.2}", target.name, t.x, t.y);
            Cursor::new(CursorType::ResizeAll, format!("Position {:.2}, {:.2}", t.x, t.y))
        } else {
            return Cursor::default();
        };

        let (aspect, texture) = (target.aspect_ratio, target.texture);
        self.core.current_id = Some(initial.uid);
        self.show_scales(scales.0, scales.1);
        self.place(aspect, &texture);
        cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn setup() -> (Mixer, AppearanceView, SourceId) {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("cam").with_aspect_ratio(1.0));
        mixer.set_current(Some(id));
        let mut view = AppearanceView::new();
        view.update(&mut mixer, 0.0);
        (mixer, view, id)
    }

    fn screen(view: &AppearanceView, x: f64, y: f64) -> Point {
        view.core.viewport.to_screen(Point::new(x, y))
    }

    fn grab(view: &mut AppearanceView, mixer: &mut Mixer, from: Point, to: Point) -> Cursor {
        let pick = view.pick(from).unwrap();
        let source = view.source_at(mixer, &pick);
        view.initiate(mixer);
        let cursor = view.grab(mixer, source, from, to, pick);
        view.terminate(mixer);
        cursor
    }

    #[test]
    fn follows_current_source() {
        let (mut mixer, mut view, id) = setup();
        assert_eq!(view.edit_or_current_source(&mixer), Some(id));
        let other = mixer.add_source(Source::new("other"));
        mixer.set_current(Some(other));
        assert_eq!(view.edit_or_current_source(&mixer), Some(other));
        // clearing the current source keeps editing the last one
        mixer.set_current(None);
        assert_eq!(view.edit_or_current_source(&mixer), Some(other));
        mixer.remove_source(other);
        assert_eq!(view.edit_or_current_source(&mixer), None);
    }

    #[test]
    fn overlay_rebuilt_only_on_edit_change() {
        let (mut mixer, mut view, _) = setup();
        assert_eq!(view.overlay_builds(), 1);
        view.update(&mut mixer, 0.0);
        view.update(&mut mixer, 0.0);
        assert_eq!(view.overlay_builds(), 1);
        let other = mixer.add_source(Source::new("other"));
        mixer.set_current(Some(other));
        view.update(&mut mixer, 0.0);
        assert_eq!(view.overlay_builds(), 2);
    }

    #[test]
    fn background_tracks_aspect_ratio() {
        let (mut mixer, mut view, _) = setup();
        assert!(!view.adjust_background(1.0));
        let wide = mixer.add_source(Source::new("wide").with_aspect_ratio(2.0));
        mixer.set_current(Some(wide));
        view.update(&mut mixer, 0.0);
        let checker = view.core.scene.get(view.checker).unwrap();
        assert_eq!(checker.transform.scale, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn texture_translates() {
        let (mut mixer, mut view, id) = setup();
        let (from, to) = (screen(&view, 0.2, 0.2), screen(&view, 0.5, 0.0));
        let cursor = grab(&mut view, &mut mixer, from, to);
        let t = mixer.sources.get(id).unwrap().texture.translation;
        assert!((t.x - 0.3).abs() < 1e-9);
        assert!((t.y + 0.2).abs() < 1e-9);
        assert_eq!(cursor.kind, CursorType::ResizeAll);
    }

    #[test]
    fn horizontal_crop_shows_scale() {
        let (mut mixer, mut view, id) = setup();
        let from = screen(&view, 1.0, 0.0);
        let pick = view.pick(from).unwrap();
        view.initiate(&mixer);
        let to = screen(&view, 0.5, 0.0);
        let cursor = view.grab(&mut mixer, Some(id), from, to, pick);
        assert!(view.core.scene.is_visible(view.horizontal_scale));
        assert!(!view.core.scene.is_visible(view.vertical_scale));
        view.terminate(&mut mixer);
        assert!(!view.core.scene.is_visible(view.horizontal_scale));
        assert!((mixer.sources.get(id).unwrap().texture.crop.x - 0.5).abs() < 1e-9);
        assert_eq!(cursor.kind, CursorType::ResizeEW);
    }

    #[test]
    fn crop_never_drops_below_minimum() {
        let (mut mixer, mut view, id) = setup();
        let (from, to) = (screen(&view, 1.0, 0.0), screen(&view, 0.0, 0.0));
        grab(&mut view, &mut mixer, from, to);
        let crop = mixer.sources.get(id).unwrap().texture.crop.x;
        assert_eq!(crop, settings::appearance::MIN_CROP);
    }

    #[test]
    fn rotation_snaps_to_quarter_turns() {
        assert_eq!(snap_rotation(FRAC_PI_2 + 0.01), FRAC_PI_2);
        assert_eq!(snap_rotation(0.2), 0.2);
        assert_eq!(snap_rotation(-0.01), 0.0);
    }

    #[test]
    fn rotation_handle_snaps() {
        let (mut mixer, mut view, id) = setup();
        let from = screen(&view, 1.0, 1.0);
        // a quarter turn plus one degree lands on the quarter turn
        let angle = std::f64::consts::FRAC_PI_4 + FRAC_PI_2 + 1f64.to_radians();
        let r = std::f64::consts::SQRT_2;
        let to = screen(&view, r * angle.cos(), r * angle.sin());
        grab(&mut view, &mut mixer, from, to);
        let rotation = mixer.sources.get(id).unwrap().texture.rotation;
        assert_eq!(rotation, FRAC_PI_2);
    }

    #[test]
    fn select_all_selects_edited_source() {
        let (mut mixer, mut view, id) = setup();
        mixer.add_source(Source::new("other"));
        view.select_all(&mut mixer);
        assert_eq!(mixer.selected(), vec![id]);
    }

    #[test]
    fn background_is_not_pickable() {
        let (_, view, _) = setup();
        assert!(view.pick(screen(&view, 5.0, 5.0)).is_none());
    }
}
