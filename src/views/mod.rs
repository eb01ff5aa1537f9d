// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! The editing views and the contract they share.
//!
//! Every view owns a [`Scene`] showing the same sources from a different angle
//! and interprets the pointer for its own editing mode. Shared behaviour lives
//! in [`ViewCore`] and is exposed through the default methods of [`View`];
//! each concrete view overrides only what its mode changes.

mod appearance;
mod geometry;
mod layer;
mod mixing;
mod render;
mod transition;

pub use appearance::AppearanceView;
pub use geometry::GeometryView;
pub use layer::LayerView;
pub use mixing::MixingView;
pub use render::RenderView;
pub use transition::TransitionView;

use crate::editing::{Cursor, CursorType, Gesture, GestureStart, ViewPort, ZoomRange};
use crate::mixer::Mixer;
use crate::model::{EntityId, Source, SourceId};
use crate::preferences::{Preferences, ViewSettings};
use crate::scene::{NodeId, Pick, Scene};
use crate::{settings, theme};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use masonry::vello::Scene as Canvas;
use masonry::vello::peniko::Fill;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Editing mode of a view, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Rendering = 0,
    Mixing = 1,
    Geometry = 2,
    Layer = 3,
    Appearance = 4,
    Transition = 5,
    Invalid = 6,
}

impl Mode {
    /// Every mode that has a view
    pub const ALL: [Mode; 6] = [
        Mode::Rendering,
        Mode::Mixing,
        Mode::Geometry,
        Mode::Layer,
        Mode::Appearance,
        Mode::Transition,
    ];

    /// Name used as the preferences key
    pub fn name(self) -> &'static str {
        match self {
            Mode::Rendering => "Rendering",
            Mode::Mixing => "Mixing",
            Mode::Geometry => "Geometry",
            Mode::Layer => "Layer",
            Mode::Appearance => "Appearance",
            Mode::Transition => "Transition",
            Mode::Invalid => "Invalid",
        }
    }
}

/// State and behaviour shared by every view
#[derive(Debug)]
pub struct ViewCore {
    mode: Mode,
    pub scene: Scene,
    pub viewport: ViewPort,
    /// `None` for views that never zoom
    zoom_range: Option<ZoomRange>,
    default_zoom: f64,
    /// Label of the gesture in progress, recorded on terminate
    pub current_action: String,
    /// Source manipulated by the gesture in progress
    pub current_id: Option<EntityId>,
    gesture: Gesture,
    /// Workspace node standing for each source
    nodes: HashMap<SourceId, NodeId>,
}

impl ViewCore {
    pub fn new(mode: Mode, zoom_range: Option<ZoomRange>, default_zoom: f64) -> Self {
        Self {
            mode,
            scene: Scene::new(),
            viewport: ViewPort::new(default_zoom),
            zoom_range,
            default_zoom,
            current_action: String::new(),
            current_id: None,
            gesture: Gesture::default(),
            nodes: HashMap::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_active()
    }

    /// Workspace node of a source, if this view has built one
    pub fn node_of(&self, source: SourceId) -> Option<NodeId> {
        self.nodes.get(&source).copied()
    }

    pub fn to_scene(&self, point: Point) -> Point {
        self.viewport.to_scene(point)
    }

    // ===== Sources =====

    /// Bring the workspace in line with the mixer's sources.
    ///
    /// Nodes of removed sources are dropped, `build` creates the subtree of
    /// sources seen for the first time and `place` refreshes every node.
    pub fn sync_sources(
        &mut self,
        mixer: &Mixer,
        mut build: impl FnMut(&mut Scene, SourceId, &Source) -> NodeId,
        mut place: impl FnMut(&mut Scene, NodeId, SourceId, &Source),
    ) {
        let stale: Vec<SourceId> = self
            .nodes
            .keys()
            .filter(|id| !mixer.sources.contains(**id))
            .copied()
            .collect();
        for id in stale {
            if let Some(node) = self.nodes.remove(&id) {
                tracing::debug!("{}: dropping node of {:?}", self.mode.name(), id);
                self.scene.remove(node);
            }
        }

        for (id, source) in mixer.sources.iter() {
            let node = match self.nodes.get(&id).copied() {
                Some(node) => node,
                None => {
                    let node = build(&mut self.scene, id, source);
                    self.nodes.insert(id, node);
                    node
                }
            };
            place(&mut self.scene, node, id, source);
        }
    }

    /// Restack the workspace to follow `order` (bottom to top)
    pub fn apply_order(&mut self, order: &[SourceId]) {
        let rank: HashMap<SourceId, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let workspace = self.scene.workspace();
        self.scene.reorder_children(workspace, |_, node| {
            node.owner.and_then(|o| rank.get(&o).copied()).unwrap_or(usize::MAX)
        });
    }

    // ===== Camera =====

    pub fn zoom_by(&mut self, factor: f64) {
        if let Some(range) = self.zoom_range {
            self.viewport.zoom = range.step(self.viewport.zoom, factor);
        }
    }

    pub fn set_level(&mut self, level: i32) {
        if let Some(range) = self.zoom_range {
            self.viewport.zoom = range.from_level(level);
        }
    }

    pub fn level(&self) -> i32 {
        self.zoom_range.map_or(0, |range| range.to_level(self.viewport.zoom))
    }

    pub fn set_canvas(&mut self, canvas: Size) {
        self.viewport.canvas = canvas;
    }

    /// Frame the workspace, or return to the default camera when it is empty
    pub fn recenter(&mut self) {
        let Some(range) = self.zoom_range else {
            self.viewport.translation = Vec2::ZERO;
            return;
        };
        let workspace = self.scene.workspace();
        let bounds = self.scene.bounds(workspace).filter(|b| b.width() > 0.0 && b.height() > 0.0);
        match bounds {
            Some(bounds) => {
                let canvas = self.viewport.canvas;
                let half_height = (canvas.height * 0.5).max(1.0);
                let margin = 1.0 + settings::editor::RECENTER_MARGIN;
                let fit_w = canvas.width / (half_height * bounds.width() * margin);
                let fit_h = canvas.height / (half_height * bounds.height() * margin);
                self.viewport.zoom = range.clamp(fit_w.min(fit_h));
                self.viewport.translation = -bounds.center().to_vec2();
            }
            None => {
                self.viewport.zoom = self.default_zoom;
                self.viewport.translation = Vec2::ZERO;
            }
        }
    }

    /// Pan so that the scene point under `from` at gesture start sits under `to`
    pub fn pan(&mut self, from: Point, to: Point) {
        let start = self.gesture.start().viewport;
        self.viewport.translation = start.translation + start.scene_delta(from, to);
    }

    // ===== Picking and selection =====

    pub fn pick(&self, point: Point) -> Option<Pick> {
        let pick = self.scene.pick(self.to_scene(point));
        tracing::debug!("{}: pick at {:?} -> {:?}", self.mode.name(), point, pick);
        pick
    }

    pub fn source_at(&self, mixer: &Mixer, pick: &Pick) -> Option<SourceId> {
        self.scene
            .owner(pick.node)
            .filter(|id| mixer.sources.contains(*id))
    }

    /// Scene rectangle spanned by two screen points
    pub fn scene_rect(&self, from: Point, to: Point) -> Rect {
        Rect::from_points(self.to_scene(from), self.to_scene(to))
    }

    pub fn select(&self, mixer: &mut Mixer, from: Point, to: Point) {
        let owners: Vec<SourceId> = self
            .scene
            .owners_in(self.scene_rect(from, to))
            .into_iter()
            .filter(|id| mixer.sources.contains(*id))
            .collect();
        tracing::debug!("{}: selected {} sources", self.mode.name(), owners.len());
        mixer.selection.set(owners);
    }

    // ===== Gestures =====

    /// Snapshot taken at `initiate`.
    ///
    /// # Panics
    ///
    /// Panics outside of an `initiate`/`terminate` bracket.
    pub fn gesture_start(&self) -> &GestureStart {
        self.gesture.start()
    }

    pub fn initiate(&mut self, mixer: &Mixer) {
        self.gesture.begin(GestureStart::capture(self.viewport, mixer));
        self.current_action.clear();
        self.current_id = None;
    }

    pub fn terminate(&mut self, mixer: &mut Mixer) {
        self.gesture.end();
        if !self.current_action.is_empty() {
            mixer.record_action(std::mem::take(&mut self.current_action), self.current_id.take());
        }
        self.current_id = None;
    }

    /// Restore the snapshot of the gesture in progress; does nothing when idle
    pub fn cancel(&mut self, mixer: &mut Mixer) {
        if !self.gesture.is_active() {
            return;
        }
        let start = self.gesture.end();
        for (id, source) in start.sources {
            if let Some(current) = mixer.sources.get_mut(id) {
                *current = source;
            }
        }
        mixer.set_fading(start.fading);
        mixer.request_deep_update();
        self.viewport = start.viewport;
        tracing::debug!("{}: cancelled '{}'", self.mode.name(), self.current_action);
        self.current_action.clear();
        self.current_id = None;
    }

    pub fn drag(&mut self, from: Point, to: Point) -> Cursor {
        self.pan(from, to);
        Cursor::of(CursorType::ResizeAll)
    }

    // ===== Settings =====

    pub fn restore_settings(&mut self, prefs: &Preferences) {
        match prefs.view(self.mode.name()) {
            Some(saved) => {
                let zoom = self.zoom_range.map_or(saved.zoom, |r| r.clamp(saved.zoom));
                self.viewport.zoom = zoom;
                self.viewport.translation = Vec2::new(saved.translation[0], saved.translation[1]);
            }
            None => {
                self.viewport.zoom = self.default_zoom;
                self.viewport.translation = Vec2::ZERO;
            }
        }
    }

    pub fn save_settings(&self, prefs: &mut Preferences) {
        prefs.set_view(
            self.mode.name(),
            ViewSettings {
                zoom: self.viewport.zoom,
                translation: [self.viewport.translation.x, self.viewport.translation.y],
            },
        );
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let size = self.viewport.canvas;
        canvas.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            theme::app::BACKGROUND,
            None,
            &Rect::from_origin_size(Point::ZERO, size),
        );
        self.scene.draw(canvas, self.viewport.affine());
    }
}

/// The interaction contract every view implements.
///
/// Points are screen points in pixels. Gestures are bracketed:
/// `initiate`, then any number of `drag` or `grab` steps, then `terminate`
/// (or `cancel`). Every step of a gesture is computed from the snapshot taken
/// at `initiate`.
pub trait View {
    fn core(&self) -> &ViewCore;
    fn core_mut(&mut self) -> &mut ViewCore;

    fn mode(&self) -> Mode {
        self.core().mode()
    }

    /// Advance animations and bring the scene in line with the mixer
    fn update(&mut self, _mixer: &mut Mixer, _dt: f64) {}

    fn draw(&self, canvas: &mut Canvas) {
        self.core().draw(canvas);
    }

    /// Zoom by steps; positive zooms in
    fn zoom(&mut self, factor: f64) {
        self.core_mut().zoom_by(factor);
    }

    /// Set the zoom from a level in `[0, 100]`
    fn resize(&mut self, level: i32) {
        self.core_mut().set_level(level);
    }

    /// Current zoom level in `[0, 100]`
    fn size(&self) -> i32 {
        self.core().level()
    }

    fn recenter(&mut self) {
        self.core_mut().recenter();
    }

    fn center_source(&mut self, _mixer: &Mixer, _source: SourceId) {}

    fn pick(&self, point: Point) -> Option<Pick> {
        self.core().pick(point)
    }

    /// The live source a pick stands for
    fn source_at(&self, mixer: &Mixer, pick: &Pick) -> Option<SourceId> {
        self.core().source_at(mixer, pick)
    }

    fn select(&mut self, mixer: &mut Mixer, from: Point, to: Point) {
        self.core().select(mixer, from, to);
    }

    fn select_all(&mut self, mixer: &mut Mixer) {
        mixer.selection.set(mixer.sources.ids());
    }

    /// Start a gesture.
    ///
    /// # Panics
    ///
    /// Panics if a gesture is already in progress.
    fn initiate(&mut self, mixer: &Mixer) {
        self.core_mut().initiate(mixer);
    }

    /// Commit the gesture in progress.
    ///
    /// # Panics
    ///
    /// Panics if no gesture is in progress.
    fn terminate(&mut self, mixer: &mut Mixer) {
        self.core_mut().terminate(mixer);
    }

    /// Abandon the gesture in progress, restoring its snapshot
    fn cancel(&mut self, mixer: &mut Mixer) {
        self.core_mut().cancel(mixer);
    }

    /// Pan the camera.
    ///
    /// # Panics
    ///
    /// Panics outside of a gesture.
    fn drag(&mut self, from: Point, to: Point) -> Cursor {
        self.core_mut().drag(from, to)
    }

    /// Manipulate whatever `pick` hit. The default cursor means nothing was
    /// grabbed.
    ///
    /// # Panics
    ///
    /// Panics outside of a gesture.
    fn grab(&mut self, _mixer: &mut Mixer, _source: Option<SourceId>, _from: Point, _to: Point, _pick: Pick) -> Cursor {
        self.core().gesture_start();
        Cursor::default()
    }

    /// Restack sources after the mixer recomputed its draw order
    fn reorder(&mut self, order: &[SourceId]) {
        self.core_mut().apply_order(order);
    }

    fn restore_settings(&mut self, prefs: &Preferences) {
        self.core_mut().restore_settings(prefs);
    }

    fn save_settings(&self, prefs: &mut Preferences) {
        self.core().save_settings(prefs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, Transform};

    struct Plain {
        core: ViewCore,
    }

    impl View for Plain {
        fn core(&self) -> &ViewCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ViewCore {
            &mut self.core
        }

        fn update(&mut self, mixer: &mut Mixer, _dt: f64) {
            self.core.sync_sources(
                mixer,
                |scene, id, _| {
                    let ws = scene.workspace();
                    scene.insert(ws, Node::surface().with_owner(id))
                },
                |scene, node, _, source| {
                    scene.set_transform(node, Transform::from_translation(source.mixing.to_vec2()).with_uniform_scale(0.1));
                },
            );
        }
    }

    fn plain() -> Plain {
        Plain {
            core: ViewCore::new(Mode::Mixing, Some(ZoomRange::new(0.5, 4.0)), 1.0),
        }
    }

    #[test]
    fn sync_builds_and_drops_nodes() {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("a"));
        let mut view = plain();
        view.update(&mut mixer, 0.0);
        let node = view.core.node_of(id).unwrap();
        assert!(view.core.scene.contains(node));

        mixer.remove_source(id);
        view.update(&mut mixer, 0.0);
        assert!(view.core.node_of(id).is_none());
        assert!(!view.core.scene.contains(node));
    }

    #[test]
    fn pick_outside_everything_is_none() {
        let mut mixer = Mixer::new();
        mixer.add_source(Source::new("a"));
        let mut view = plain();
        view.update(&mut mixer, 0.0);
        assert!(view.pick(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn pick_resolves_source_with_local_coordinates() {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("a"));
        let mut view = plain();
        view.update(&mut mixer, 0.0);
        let screen = view.core.viewport.to_screen(Point::new(0.05, 0.02));
        let pick = view.pick(screen).unwrap();
        assert_eq!(view.source_at(&mixer, &pick), Some(id));
        assert!(pick.local.x.abs() <= 1.0 && pick.local.y.abs() <= 1.0);
    }

    #[test]
    fn drag_pans_from_gesture_start() {
        let mixer = Mixer::new();
        let mut view = plain();
        let anchor = Point::new(0.2, 0.1);
        let from = view.core.viewport.to_screen(anchor);
        let to = from + Vec2::new(40.0, 0.0);
        view.initiate(&mixer);
        view.drag(from, from + Vec2::new(10.0, 0.0));
        let cursor = view.drag(from, to);
        assert_eq!(cursor.kind, CursorType::ResizeAll);
        let moved = view.core.viewport.to_screen(anchor);
        assert!((moved - to).hypot() < 1e-9);
    }

    #[test]
    fn terminate_records_labelled_actions_only() {
        let mut mixer = Mixer::new();
        let mut view = plain();
        view.initiate(&mixer);
        view.terminate(&mut mixer);
        assert!(mixer.history().is_empty());

        view.initiate(&mixer);
        view.core.current_action = "moved".into();
        view.terminate(&mut mixer);
        assert_eq!(mixer.history().len(), 1);
        assert_eq!(mixer.history()[0].label, "moved");
    }

    #[test]
    fn cancel_restores_sources_and_camera() {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("a"));
        let mut view = plain();
        view.initiate(&mixer);
        if let Some(s) = mixer.sources.get_mut(id) {
            s.mixing = Point::new(0.5, 0.5);
        }
        view.drag(Point::ZERO, Point::new(30.0, 30.0));
        view.cancel(&mut mixer);
        assert_eq!(mixer.sources.get(id).unwrap().mixing, Point::ZERO);
        assert_eq!(view.core.viewport.translation, Vec2::ZERO);
        assert!(!view.core.is_active());
    }

    #[test]
    #[should_panic(expected = "outside of an initiate/terminate bracket")]
    fn grab_outside_gesture_panics() {
        let mut mixer = Mixer::new();
        let mut view = plain();
        let pick = Pick {
            node: view.core.scene.root(),
            local: Point::ZERO,
        };
        view.grab(&mut mixer, None, Point::ZERO, Point::ZERO, pick);
    }

    #[test]
    fn zoom_levels_follow_range() {
        let mut view = plain();
        view.resize(100);
        assert_eq!(view.core.viewport.zoom, 4.0);
        assert_eq!(view.size(), 100);
        view.zoom(50.0);
        assert_eq!(view.core.viewport.zoom, 4.0);
    }

    #[test]
    fn settings_round_trip() {
        let mut view = plain();
        view.core.viewport.zoom = 2.0;
        view.core.viewport.translation = Vec2::new(0.3, 0.4);
        let mut prefs = Preferences::default();
        view.save_settings(&mut prefs);

        let mut other = plain();
        other.restore_settings(&prefs);
        assert_eq!(other.core.viewport.zoom, 2.0);
        assert_eq!(other.core.viewport.translation, Vec2::new(0.3, 0.4));
    }

    #[test]
    fn recenter_frames_workspace() {
        let mut mixer = Mixer::new();
        mixer.add_source(Source::new("a").with_mixing(Point::new(0.5, 0.5)));
        let mut view = plain();
        view.update(&mut mixer, 0.0);
        view.recenter();
        let center = view.core.viewport.to_screen(Point::new(0.5, 0.5));
        let canvas = view.core.viewport.canvas;
        assert!((center.x - canvas.width * 0.5).abs() < 1e-6);
        assert!((center.y - canvas.height * 0.5).abs() < 1e-6);
    }
}
