// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! The compositor: shared mixer state, every view, and the frame sequence.
//!
//! Input is routed to the active view through the pointer protocol: a press
//! picks once and starts a gesture, every move grabs what the press hit (or
//! pans when nothing was grabbed), and release commits. Each frame updates
//! every view, then restacks them all when the mixer's draw order changed.

use crate::editing::{Cursor, PointerGesture};
use crate::frame_buffer::FrameBuffer;
use crate::mixer::Mixer;
use crate::model::{Source, SourceId};
use crate::preferences::Preferences;
use crate::views::{AppearanceView, GeometryView, LayerView, MixingView, Mode, RenderView, TransitionView, View};
use kurbo::{Point, Size};
use masonry::vello::Scene as Canvas;

pub struct Compositor {
    pub mixer: Mixer,
    rendering: RenderView,
    mixing: MixingView,
    geometry: GeometryView,
    layer: LayerView,
    appearance: AppearanceView,
    transition: TransitionView,
    active: Mode,
    pointer: Option<PointerGesture>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(&Preferences::default())
    }
}

impl Compositor {
    pub fn new(prefs: &Preferences) -> Self {
        let mut compositor = Self {
            mixer: Mixer::new(),
            rendering: RenderView::new(),
            mixing: MixingView::new(),
            geometry: GeometryView::new(),
            layer: LayerView::new(),
            appearance: AppearanceView::new(),
            transition: TransitionView::new(),
            active: Mode::Mixing,
            pointer: None,
        };
        compositor.restore_settings(prefs);
        compositor
    }

    pub fn restore_settings(&mut self, prefs: &Preferences) {
        let (_, views) = self.views_mut();
        for view in views {
            view.restore_settings(prefs);
        }
    }

    pub fn save_settings(&self, prefs: &mut Preferences) {
        for mode in Mode::ALL {
            if let Some(view) = self.view(mode) {
                view.save_settings(prefs);
            }
        }
    }

    // ===== Views =====

    pub fn mode(&self) -> Mode {
        self.active
    }

    /// Switch the active view. A gesture in progress is cancelled first.
    ///
    /// Returns `false` for [`Mode::Invalid`], leaving the active view as is.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == Mode::Invalid {
            tracing::warn!("Ignoring switch to invalid mode");
            return false;
        }
        if mode != self.active {
            self.pointer_cancel();
            tracing::info!("{} view", mode.name());
            self.active = mode;
        }
        true
    }

    pub fn view(&self, mode: Mode) -> Option<&dyn View> {
        let view: &dyn View = match mode {
            Mode::Rendering => &self.rendering,
            Mode::Mixing => &self.mixing,
            Mode::Geometry => &self.geometry,
            Mode::Layer => &self.layer,
            Mode::Appearance => &self.appearance,
            Mode::Transition => &self.transition,
            Mode::Invalid => return None,
        };
        Some(view)
    }

    pub fn active_view(&self) -> Option<&dyn View> {
        self.view(self.active)
    }

    /// The mixer alongside one view, borrowed together
    fn parts(&mut self, mode: Mode) -> Option<(&mut Mixer, &mut dyn View)> {
        let view: &mut dyn View = match mode {
            Mode::Rendering => &mut self.rendering,
            Mode::Mixing => &mut self.mixing,
            Mode::Geometry => &mut self.geometry,
            Mode::Layer => &mut self.layer,
            Mode::Appearance => &mut self.appearance,
            Mode::Transition => &mut self.transition,
            Mode::Invalid => return None,
        };
        Some((&mut self.mixer, view))
    }

    /// Every view in update order. The output comes last so that it sees the
    /// fading set by the others in the same frame.
    fn views_mut(&mut self) -> (&mut Mixer, [&mut dyn View; 6]) {
        (
            &mut self.mixer,
            [
                &mut self.mixing,
                &mut self.geometry,
                &mut self.layer,
                &mut self.appearance,
                &mut self.transition,
                &mut self.rendering,
            ],
        )
    }

    pub fn rendering(&self) -> &RenderView {
        &self.rendering
    }

    pub fn rendering_mut(&mut self) -> &mut RenderView {
        &mut self.rendering
    }

    pub fn mixing(&self) -> &MixingView {
        &self.mixing
    }

    pub fn geometry(&self) -> &GeometryView {
        &self.geometry
    }

    pub fn layer(&self) -> &LayerView {
        &self.layer
    }

    pub fn appearance(&self) -> &AppearanceView {
        &self.appearance
    }

    pub fn transition(&self) -> &TransitionView {
        &self.transition
    }

    pub fn transition_mut(&mut self) -> &mut TransitionView {
        &mut self.transition
    }

    // ===== Sources =====

    /// Add a source, deriving its alpha from its mixing position
    pub fn add_source(&mut self, source: Source) -> SourceId {
        let id = self.mixer.add_source(source);
        self.mixing.set_alpha(&mut self.mixer, id);
        id
    }

    /// Add a source stacked above every existing one
    pub fn add_source_on_top(&mut self, source: Source) -> SourceId {
        let id = self.mixer.add_source_on_top(source);
        self.mixing.set_alpha(&mut self.mixer, id);
        id
    }

    pub fn remove_source(&mut self, id: SourceId) -> Option<Source> {
        self.mixer.remove_source(id)
    }

    /// Fade the output; see [`RenderView::set_fading`]
    pub fn set_fading(&mut self, fading: f64) {
        self.rendering.set_fading(&mut self.mixer, fading);
    }

    /// See [`LayerView::set_depth`]
    pub fn set_depth(&mut self, id: SourceId, depth: f64) -> Option<f64> {
        self.layer.set_depth(&mut self.mixer, id, depth)
    }

    // ===== Frame =====

    pub fn set_canvas(&mut self, canvas: Size) {
        let (_, views) = self.views_mut();
        for view in views {
            view.core_mut().set_canvas(canvas);
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.rendering.frame()
    }

    /// Advance one frame: update every view, then restack them all if the
    /// draw order changed.
    pub fn update(&mut self, dt: f64) {
        let aspect = self.rendering.frame().aspect_ratio();
        self.geometry.set_output_aspect(aspect);

        let (mixer, views) = self.views_mut();
        for view in views {
            view.update(mixer, dt);
        }
        if self.mixer.reorder() {
            let order = self.mixer.draw_order().to_vec();
            let (_, views) = self.views_mut();
            for view in views {
                view.reorder(&order);
            }
        }
    }

    /// Draw the active view
    pub fn draw(&self, canvas: &mut Canvas) {
        if let Some(view) = self.active_view() {
            view.draw(canvas);
        }
    }

    // ===== Pointer =====

    /// Press: pick once, make the hit source current and start a gesture.
    ///
    /// A press while another is held is ignored.
    pub fn pointer_down(&mut self, point: Point) -> Option<SourceId> {
        if self.pointer.is_some() {
            tracing::warn!("Pointer already down, ignoring press at {:?}", point);
            return None;
        }
        let mode = self.active;
        let (mixer, view) = self.parts(mode)?;
        let pick = view.pick(point);
        let source = match &pick {
            Some(pick) => view.source_at(mixer, pick),
            None => None,
        };
        if source.is_some() {
            mixer.set_current(source);
        }
        view.initiate(mixer);
        self.pointer = Some(PointerGesture::new(point, pick, source));
        source
    }

    /// Move while pressed: grab what the press hit, or pan if nothing was
    /// grabbed
    pub fn pointer_move(&mut self, point: Point) -> Cursor {
        let Some(pointer) = self.pointer.as_mut() else {
            return Cursor::default();
        };
        pointer.last = point;
        let gesture = *pointer;
        let mode = self.active;
        let Some((mixer, view)) = self.parts(mode) else {
            return Cursor::default();
        };
        let cursor = match gesture.pick {
            Some(pick) => view.grab(mixer, gesture.source, gesture.origin, point, pick),
            None => Cursor::default(),
        };
        if cursor.is_default() {
            view.drag(gesture.origin, point)
        } else {
            cursor
        }
    }

    /// Release: commit the gesture. Returns whether one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        if self.pointer.take().is_none() {
            return false;
        }
        let mode = self.active;
        if let Some((mixer, view)) = self.parts(mode) {
            view.terminate(mixer);
        }
        true
    }

    /// Abandon the gesture in progress, restoring what it changed
    pub fn pointer_cancel(&mut self) {
        if self.pointer.take().is_none() {
            return;
        }
        let mode = self.active;
        if let Some((mixer, view)) = self.parts(mode) {
            view.cancel(mixer);
        }
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer.is_some()
    }

    // ===== Selection and camera =====

    pub fn select_region(&mut self, from: Point, to: Point) {
        let mode = self.active;
        if let Some((mixer, view)) = self.parts(mode) {
            view.select(mixer, from, to);
        }
    }

    pub fn select_all(&mut self) {
        let mode = self.active;
        if let Some((mixer, view)) = self.parts(mode) {
            view.select_all(mixer);
        }
    }

    pub fn zoom(&mut self, factor: f64) {
        let mode = self.active;
        if let Some((_, view)) = self.parts(mode) {
            view.zoom(factor);
        }
    }

    pub fn resize(&mut self, level: i32) {
        let mode = self.active;
        if let Some((_, view)) = self.parts(mode) {
            view.resize(level);
        }
    }

    pub fn size(&self) -> i32 {
        self.active_view().map_or(0, |view| view.size())
    }

    pub fn recenter(&mut self) {
        let mode = self.active;
        if let Some((_, view)) = self.parts(mode) {
            view.recenter();
        }
    }

    /// Center the active view on the current source
    pub fn center_current(&mut self) {
        let mode = self.active;
        let Some(current) = self.mixer.current() else {
            return;
        };
        if let Some((mixer, view)) = self.parts(mode) {
            view.center_source(mixer, current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::CursorType;
    use kurbo::{Affine, Vec2};

    fn count_outlines(view: &dyn View) -> usize {
        let mut count = 0;
        view.core().scene.visit_drawables(Affine::IDENTITY, |node, _, _| {
            if node.outline().is_some() {
                count += 1;
            }
        });
        count
    }

    fn screen(compositor: &Compositor, x: f64, y: f64) -> Point {
        compositor
            .active_view()
            .unwrap()
            .core()
            .viewport
            .to_screen(Point::new(x, y))
    }

    fn with_source(x: f64) -> (Compositor, SourceId) {
        let mut compositor = Compositor::default();
        let id = compositor.add_source(Source::new("cam").with_mixing(Point::new(x, 0.0)));
        compositor.update(0.0);
        (compositor, id)
    }

    #[test]
    fn invalid_mode_is_refused() {
        let mut compositor = Compositor::default();
        assert!(!compositor.set_mode(Mode::Invalid));
        assert_eq!(compositor.mode(), Mode::Mixing);
        assert!(compositor.set_mode(Mode::Layer));
        assert_eq!(compositor.mode(), Mode::Layer);
    }

    #[test]
    fn add_source_derives_alpha() {
        let (compositor, id) = with_source(0.5);
        let alpha = compositor.mixer.sources.get(id).unwrap().alpha;
        assert!((alpha - 0.5).abs() < 1e-9);
    }

    #[test]
    fn press_move_release_commits() {
        let (mut compositor, id) = with_source(0.5);
        let down = screen(&compositor, 0.5, 0.0);
        assert_eq!(compositor.pointer_down(down), Some(id));
        assert_eq!(compositor.mixer.current(), Some(id));

        let cursor = compositor.pointer_move(screen(&compositor, 0.2, 0.0));
        assert_eq!(cursor.kind, CursorType::ResizeAll);
        assert!(compositor.pointer_up());

        let source = compositor.mixer.sources.get(id).unwrap();
        assert!((source.mixing.x - 0.2).abs() < 1e-9);
        assert!((source.alpha - 0.8).abs() < 1e-9);
        assert_eq!(compositor.mixer.history().len(), 1);
        assert!(!compositor.pointer_up());
    }

    #[test]
    fn press_on_nothing_pans() {
        let (mut compositor, _) = with_source(0.5);
        let corner = Point::new(5.0, 5.0);
        assert_eq!(compositor.pointer_down(corner), None);
        let cursor = compositor.pointer_move(Point::new(25.0, 5.0));
        assert_eq!(cursor.kind, CursorType::ResizeAll);
        compositor.pointer_up();
        let translation = compositor.active_view().unwrap().core().viewport.translation;
        assert!(translation.x > 0.0);
        assert!(compositor.mixer.history().is_empty());
    }

    #[test]
    fn cancel_restores_source() {
        let (mut compositor, id) = with_source(0.5);
        compositor.pointer_down(screen(&compositor, 0.5, 0.0));
        compositor.pointer_move(screen(&compositor, 0.0, 0.0));
        compositor.pointer_cancel();
        let source = compositor.mixer.sources.get(id).unwrap();
        assert_eq!(source.mixing, Point::new(0.5, 0.0));
        assert!(compositor.mixer.history().is_empty());
        assert!(!compositor.is_pointer_down());
    }

    #[test]
    fn switching_mode_cancels_gesture() {
        let (mut compositor, id) = with_source(0.5);
        compositor.pointer_down(screen(&compositor, 0.5, 0.0));
        compositor.pointer_move(screen(&compositor, 0.1, 0.0));
        compositor.set_mode(Mode::Geometry);
        assert!(!compositor.is_pointer_down());
        assert_eq!(compositor.mixer.sources.get(id).unwrap().mixing.x, 0.5);
        // the mixing view is idle again and accepts a new gesture
        compositor.set_mode(Mode::Mixing);
        compositor.pointer_down(screen(&compositor, 0.5, 0.0));
        assert!(compositor.pointer_up());
    }

    #[test]
    fn second_press_is_ignored() {
        let (mut compositor, _) = with_source(0.5);
        let down = screen(&compositor, 0.5, 0.0);
        compositor.pointer_down(down);
        assert_eq!(compositor.pointer_down(down), None);
        assert!(compositor.pointer_up());
    }

    #[test]
    fn depth_change_restacks_every_view() {
        let mut compositor = Compositor::default();
        let a = compositor.add_source(Source::new("a").with_depth(1.0));
        let b = compositor.add_source(Source::new("b").with_depth(2.0));
        compositor.update(0.0);
        assert_eq!(compositor.mixer.draw_order(), &[a, b]);

        compositor.set_depth(a, 5.0);
        compositor.update(0.0);
        assert_eq!(compositor.mixer.draw_order(), &[b, a]);
        for mode in Mode::ALL {
            let scene = &compositor.view(mode).unwrap().core().scene;
            let top = scene
                .children(scene.workspace())
                .iter()
                .filter_map(|n| scene.get(*n).and_then(|n| n.owner))
                .last();
            if mode != Mode::Appearance && mode != Mode::Transition {
                assert_eq!(top, Some(a), "{}", mode.name());
            }
        }
    }

    #[test]
    fn output_fading_persists_across_frames() {
        let mut compositor = Compositor::default();
        compositor.set_fading(0.7);
        compositor.update(0.0);
        compositor.update(0.0);
        assert_eq!(compositor.rendering().fading(), 0.7);
        assert_eq!(compositor.mixer.fading(), 0.7);
    }

    #[test]
    fn every_mode_draws() {
        let (mut compositor, _) = with_source(0.5);
        for mode in Mode::ALL {
            assert!(compositor.set_mode(mode));
            compositor.update(0.0);
            compositor.draw(&mut Canvas::new());
            assert!(count_outlines(compositor.view(mode).unwrap()) > 0, "{}", mode.name());
        }
        compositor.rendering().draw(&mut Canvas::new());
    }

    #[test]
    fn fade_overlay_is_drawn_with_fading() {
        let mut compositor = Compositor::default();
        compositor.set_fading(0.25);
        compositor.update(0.0);
        compositor.draw(&mut Canvas::new());

        let scene = &compositor.rendering().core().scene;
        let overlay = scene.get(scene.children(scene.foreground())[0]).unwrap();
        let mut drawn = None;
        scene.visit_drawables(Affine::IDENTITY, |node, _, alpha| {
            if std::ptr::eq(node, overlay) {
                drawn = Some(alpha);
            }
        });
        assert_eq!(drawn, Some(0.25));
    }

    #[test]
    fn hidden_overlays_are_not_drawn() {
        let (mut compositor, id) = with_source(0.5);
        let idle = count_outlines(compositor.mixing());

        compositor.mixer.set_current(Some(id));
        compositor.update(0.0);
        let highlighted = count_outlines(compositor.mixing());
        assert_eq!(highlighted, idle + 1);

        if let Some(source) = compositor.mixer.sources.get_mut(id) {
            source.locked = true;
        }
        compositor.update(0.0);
        assert_eq!(count_outlines(compositor.mixing()), highlighted + 1);

        compositor.mixer.set_current(None);
        if let Some(source) = compositor.mixer.sources.get_mut(id) {
            source.locked = false;
        }
        compositor.update(0.0);
        assert_eq!(count_outlines(compositor.mixing()), idle);
    }

    #[test]
    fn output_fading_reaches_render_view() {
        let mut compositor = Compositor::default();
        compositor.mixer.set_fading(0.4);
        compositor.update(0.0);
        assert_eq!(compositor.rendering().fading(), 0.4);
    }

    #[test]
    fn select_all_in_mixing_skips_limbo() {
        let mut compositor = Compositor::default();
        let inside = compositor.add_source(Source::new("in").with_mixing(Point::new(0.3, 0.0)));
        compositor.add_source(Source::new("out").with_mixing(Point::new(2.0, 0.0)));
        compositor.select_all();
        assert_eq!(compositor.mixer.selected(), vec![inside]);
    }

    #[test]
    fn center_current_moves_camera() {
        let (mut compositor, id) = with_source(0.5);
        compositor.mixer.set_current(Some(id));
        compositor.center_current();
        let translation = compositor.active_view().unwrap().core().viewport.translation;
        assert_eq!(translation, Vec2::new(-0.5, 0.0));
    }

    #[test]
    fn settings_survive_a_round_trip() {
        let mut compositor = Compositor::default();
        compositor.set_mode(Mode::Geometry);
        compositor.resize(80);
        let level = compositor.size();
        let mut prefs = Preferences::default();
        compositor.save_settings(&mut prefs);

        let mut restored = Compositor::new(&prefs);
        restored.set_mode(Mode::Geometry);
        assert_eq!(restored.size(), level);
    }
}
