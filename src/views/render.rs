// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Render view: the composited output, not interactive

use super::{Mode, View, ViewCore};
use crate::editing::Cursor;
use crate::frame_buffer::FrameBuffer;
use crate::mixer::{FadeColor, Mixer};
use crate::model::{Source, SourceId};
use crate::preferences::Preferences;
use crate::scene::{Node, NodeId, Pick, Scene, Transform};
use crate::theme;
use kurbo::{Point, Size};

pub struct RenderView {
    core: ViewCore,
    frame: FrameBuffer,
    fading: f64,
    overlay: NodeId,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderView {
    pub fn new() -> Self {
        let mut core = ViewCore::new(Mode::Rendering, None, 1.0);
        let foreground = core.scene.foreground();
        let overlay = core.scene.insert(
            foreground,
            Node::surface()
                .with_color(theme::render::FADE_BLACK)
                .unpickable(),
        );
        let mut view = Self {
            core,
            frame: FrameBuffer::default(),
            fading: 0.0,
            overlay,
        };
        view.place_overlay();
        view
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn resolution(&self) -> Size {
        self.frame.resolution()
    }

    /// A zero size restores the default resolution
    pub fn set_resolution(&mut self, resolution: Size) {
        self.frame = FrameBuffer::new(resolution);
        tracing::info!(
            "Output resolution {}x{}",
            self.frame.resolution().width,
            self.frame.resolution().height
        );
        self.place_overlay();
    }

    pub fn fading(&self) -> f64 {
        self.fading
    }

    /// Fade the output toward the mixer's fade color.
    ///
    /// The mixer holds the output fading, so the value written here is the one
    /// every later frame shows.
    pub fn set_fading(&mut self, mixer: &mut Mixer, fading: f64) {
        mixer.set_fading(fading);
        self.show_fading(mixer.fading());
    }

    fn show_fading(&mut self, fading: f64) {
        self.fading = fading.clamp(0.0, 1.0);
        self.core.scene.set_alpha(self.overlay, self.fading as f32);
    }

    fn place_overlay(&mut self) {
        let ar = self.frame.aspect_ratio();
        self.core
            .scene
            .set_transform(self.overlay, Transform::IDENTITY.with_scale(ar, 1.0));
        self.core.scene.set_alpha(self.overlay, self.fading as f32);
    }
}

fn build_surface(scene: &mut Scene, id: SourceId, _source: &Source) -> NodeId {
    let workspace = scene.workspace();
    let group = scene.insert(workspace, Node::group().with_owner(id));
    scene.insert(group, Node::surface().with_color(theme::source::FILL));
    group
}

impl View for RenderView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn update(&mut self, mixer: &mut Mixer, _dt: f64) {
        self.core.sync_sources(mixer, build_surface, |scene, node, _, source| {
            scene.set_transform(node, source.geometry);
            scene.set_visible(node, !source.excluded);
            scene.set_alpha(node, source.alpha as f32);
            if let Some(&surface) = scene.children(node).first() {
                scene.set_transform(surface, Transform::IDENTITY.with_scale(source.aspect_ratio, 1.0));
            }
        });
        let color = match mixer.fade_color() {
            FadeColor::Black => theme::render::FADE_BLACK,
            FadeColor::White => theme::render::FADE_WHITE,
        };
        if let Some(overlay) = self.core.scene.get_mut(self.overlay) {
            overlay.color = color;
        }
        self.show_fading(mixer.fading());
    }

    fn pick(&self, _point: Point) -> Option<Pick> {
        None
    }

    fn drag(&mut self, _from: Point, _to: Point) -> Cursor {
        self.core.gesture_start();
        Cursor::default()
    }

    fn select(&mut self, _mixer: &mut Mixer, _from: Point, _to: Point) {}

    fn restore_settings(&mut self, prefs: &Preferences) {
        self.core.restore_settings(prefs);
        self.set_resolution(Size::new(prefs.render.width, prefs.render.height));
    }

    fn save_settings(&self, prefs: &mut Preferences) {
        self.core.save_settings(prefs);
        let resolution = self.resolution();
        prefs.render.width = resolution.width;
        prefs.render.height = resolution.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings;

    #[test]
    fn fading_is_clamped() {
        let mut mixer = Mixer::new();
        let mut view = RenderView::new();
        view.set_fading(&mut mixer, 1.5);
        assert_eq!(view.fading(), 1.0);
        assert_eq!(mixer.fading(), 1.0);
        view.set_fading(&mut mixer, -0.5);
        assert_eq!(view.fading(), 0.0);
    }

    #[test]
    fn fading_survives_update() {
        let mut mixer = Mixer::new();
        let mut view = RenderView::new();
        view.set_fading(&mut mixer, 0.7);
        view.update(&mut mixer, 0.0);
        assert_eq!(view.fading(), 0.7);
        let overlay = view.core.scene.get(view.overlay).unwrap();
        assert_eq!(overlay.alpha, 0.7_f64 as f32);
    }

    #[test]
    fn zero_resolution_restores_default() {
        let mut view = RenderView::new();
        view.set_resolution(Size::new(1920.0, 1080.0));
        assert_eq!(view.resolution(), Size::new(1920.0, 1080.0));
        view.set_resolution(Size::ZERO);
        assert_eq!(view.resolution(), settings::render::DEFAULT_RESOLUTION);
    }

    #[test]
    fn never_picks() {
        let mut mixer = Mixer::new();
        mixer.add_source(Source::new("a"));
        let mut view = RenderView::new();
        view.update(&mut mixer, 0.0);
        let center = view.core.viewport.to_screen(Point::ZERO);
        assert!(view.pick(center).is_none());
    }

    #[test]
    fn update_follows_mixer() {
        let mut mixer = Mixer::new();
        let id = mixer.add_source(Source::new("a"));
        if let Some(s) = mixer.sources.get_mut(id) {
            s.excluded = true;
        }
        mixer.set_fading(0.25);
        let mut view = RenderView::new();
        view.update(&mut mixer, 0.0);
        assert_eq!(view.fading(), 0.25);
        let node = view.core.node_of(id).unwrap();
        assert!(!view.core.scene.is_visible(node));
    }

    #[test]
    fn drag_does_not_move_camera() {
        let mixer = Mixer::new();
        let mut view = RenderView::new();
        view.initiate(&mixer);
        let cursor = view.drag(Point::ZERO, Point::new(50.0, 50.0));
        assert!(cursor.is_default());
        assert_eq!(view.core.viewport.translation, kurbo::Vec2::ZERO);
    }

    #[test]
    fn zoom_is_a_no_op() {
        let mut view = RenderView::new();
        view.zoom(3.0);
        view.resize(80);
        assert_eq!(view.core.viewport.zoom, 1.0);
        assert_eq!(view.size(), 0);
    }

    #[test]
    fn resolution_persists() {
        let mut view = RenderView::new();
        view.set_resolution(Size::new(800.0, 600.0));
        let mut prefs = Preferences::default();
        view.save_settings(&mut prefs);
        let mut other = RenderView::new();
        other.restore_settings(&prefs);
        assert_eq!(other.resolution(), Size::new(800.0, 600.0));
    }
}
