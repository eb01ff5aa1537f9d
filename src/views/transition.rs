// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Transition view: slide a session toward the output to switch to it.
//!
//! The timeline runs from -1 (transition not started) to 0 (new session fully
//! shown). The attached session source sits at `progress - 1` and is dragged
//! along the timeline or played toward either end.

use super::{Mode, View, ViewCore};
use crate::editing::{Cursor, CursorType};
use crate::mixer::Mixer;
use crate::model::{Session, SessionSource, SourceId};
use crate::preferences::Preferences;
use crate::scene::{Node, NodeId, Pick, Transform};
use crate::{settings, theme};
use kurbo::{BezPath, Point, Rect, Shape, Vec2};

/// Horizontal position of the output preview, right of the timeline end
const OUTPUT_X: f64 = 0.4;

/// Half height of the timeline gradient band
const BAND: f64 = 0.05;

pub struct TransitionView {
    core: ViewCore,
    source: Option<SessionSource>,
    duration: f64,
    cross_fade: bool,
    /// Direction of the running animation, `true` toward the new session
    playing: Option<bool>,
    /// Progress when the gesture in progress started
    progress_at_initiate: f64,
    gradient: NodeId,
    transition_node: NodeId,
    output_surface: NodeId,
}

impl Default for TransitionView {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionView {
    pub fn new() -> Self {
        let mut core = ViewCore::new(
            Mode::Transition,
            Some(settings::transition::ZOOM),
            settings::transition::DEFAULT_ZOOM,
        );
        let scene = &mut core.scene;
        let background = scene.background();

        let band = Rect::new(-1.0, -BAND, 0.0, BAND).to_path(0.01);
        let gradient = scene.insert(background, Node::switch().unpickable());
        scene.insert(
            gradient,
            Node::mesh(band.clone()).with_color(theme::transition::CROSS_FADE).unpickable(),
        );
        scene.insert(
            gradient,
            Node::mesh(band).with_color(theme::transition::FADE).unpickable(),
        );
        // ticks every 100 ms and every second of a one-second timeline
        scene.insert(
            background,
            Node::mesh(ticks(0.1, BAND * 1.5)).with_color(theme::transition::MARK).unpickable(),
        );
        scene.insert(
            background,
            Node::mesh(ticks(1.0, BAND * 3.0)).with_color(theme::transition::MARK).unpickable(),
        );

        let card = settings::transition::CARD_SIZE;
        let output_surface = scene.insert(
            background,
            Node::surface()
                .with_transform(Transform::from_translation(Vec2::new(OUTPUT_X, 0.0)).with_scale(card * 16.0 / 9.0, card))
                .with_color(theme::transition::OUTPUT),
        );

        let workspace = scene.workspace();
        let transition_node = scene.insert(workspace, Node::group().hidden());
        scene.insert(transition_node, Node::surface().with_color(theme::source::FILL));
        scene.insert(transition_node, Node::frame().with_color(theme::source::CURRENT).unpickable());

        Self {
            core,
            source: None,
            duration: settings::transition::DURATION,
            cross_fade: true,
            playing: None,
            progress_at_initiate: 0.0,
            gradient,
            transition_node,
            output_surface,
        }
    }

    /// Adopt a session source for the transition, handing back the session
    /// previously attached
    pub fn attach(&mut self, source: SessionSource) -> Option<Session> {
        tracing::info!("Attached session '{}' for transition", source.session().name);
        let previous = self.source.replace(source).map(SessionSource::into_session);
        self.playing = None;
        self.place();
        previous
    }

    /// Drop the transition source, returning its session
    pub fn detach(&mut self) -> Option<Session> {
        let source = self.source.take()?;
        tracing::info!("Detached session '{}'", source.session().name);
        self.playing = None;
        self.place();
        Some(source.into_session())
    }

    pub fn attached(&self) -> Option<&SessionSource> {
        self.source.as_ref()
    }

    /// Animate toward the new session (`open`) or back
    pub fn play(&mut self, open: bool) {
        if self.source.is_some() {
            self.playing = Some(open);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(f64::EPSILON);
    }

    pub fn cross_fade(&self) -> bool {
        self.cross_fade
    }

    pub fn set_cross_fade(&mut self, cross_fade: bool) {
        self.cross_fade = cross_fade;
        self.core.scene.set_active(self.gradient, if cross_fade { 0 } else { 1 });
    }

    fn set_progress(&mut self, mixer: &mut Mixer, progress: f64) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        source.set_progress(progress);
        let progress = source.progress();
        if !self.cross_fade {
            // fade through the fade color, darkest halfway
            mixer.set_fading(1.0 - (2.0 * progress - 1.0).abs());
        }
        self.place();
    }

    fn place(&mut self) {
        let scene = &mut self.core.scene;
        match &self.source {
            Some(source) => {
                let card = settings::transition::CARD_SIZE;
                scene.set_visible(self.transition_node, true);
                scene.set_transform(
                    self.transition_node,
                    Transform::from_translation(Vec2::new(source.progress() - 1.0, 0.0)),
                );
                let quad = Transform::IDENTITY.with_scale(card * source.aspect_ratio, card);
                for child in scene.children(self.transition_node).to_vec() {
                    scene.set_transform(child, quad);
                }
                scene.set_alpha(self.transition_node, (0.5 + 0.5 * source.alpha()) as f32);
            }
            None => scene.set_visible(self.transition_node, false),
        }
    }
}

/// Vertical tick marks every `step` along `[-1, 0]`
fn ticks(step: f64, height: f64) -> BezPath {
    let mut path = BezPath::new();
    let count = (1.0 / step).round() as i32;
    for i in 0..=count {
        let x = -1.0 + f64::from(i) * step;
        path.move_to((x, -height));
        path.line_to((x, height));
    }
    path
}

impl View for TransitionView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn update(&mut self, mixer: &mut Mixer, dt: f64) {
        if let Some(open) = self.playing
            && let Some(progress) = self.source.as_ref().map(SessionSource::progress)
        {
            let step = dt / self.duration;
            let (next, done) = if open {
                ((progress + step).min(1.0), progress + step >= 1.0)
            } else {
                ((progress - step).max(0.0), progress - step <= 0.0)
            };
            self.set_progress(mixer, next);
            if done {
                tracing::info!("Transition {}", if open { "complete" } else { "reverted" });
                self.playing = None;
            }
        }
    }

    /// Only the transition source and the output preview answer picks
    fn pick(&self, point: Point) -> Option<Pick> {
        let pick = self.core.pick(point)?;
        let scene = &self.core.scene;
        (scene.is_ancestor(self.transition_node, pick.node) || pick.node == self.output_surface).then_some(pick)
    }

    fn select(&mut self, _mixer: &mut Mixer, _from: Point, _to: Point) {}

    fn select_all(&mut self, _mixer: &mut Mixer) {}

    fn initiate(&mut self, mixer: &Mixer) {
        self.core.initiate(mixer);
        self.progress_at_initiate = self.source.as_ref().map_or(0.0, SessionSource::progress);
    }

    fn cancel(&mut self, mixer: &mut Mixer) {
        if self.core.is_active() {
            let progress = self.progress_at_initiate;
            self.set_progress(mixer, progress);
        }
        self.core.cancel(mixer);
    }

    fn grab(&mut self, mixer: &mut Mixer, _source: Option<SourceId>, from: Point, to: Point, pick: Pick) -> Cursor {
        let viewport = self.core.gesture_start().viewport;
        if pick.node == self.output_surface {
            self.play(true);
            self.core.current_action = "Play transition".to_string();
            return Cursor::new(CursorType::Hand, "Play");
        }
        if self.source.is_none() || !self.core.scene.is_ancestor(self.transition_node, pick.node) {
            return Cursor::default();
        }
        let dx = viewport.scene_delta(from, to).x;
        self.playing = None;
        let target = self.progress_at_initiate + dx;
        self.set_progress(mixer, target);
        let progress = self.source.as_ref().map_or(0.0, SessionSource::progress);
        self.core.current_action = format!("Transition {:.0}%", progress * 100.0);
        Cursor::new(CursorType::ResizeEW, format!("{:.0} %", progress * 100.0))
    }

    fn restore_settings(&mut self, prefs: &Preferences) {
        self.core.restore_settings(prefs);
        self.set_duration(prefs.transition.duration);
        self.set_cross_fade(prefs.transition.cross_fade);
    }

    fn save_settings(&self, prefs: &mut Preferences) {
        self.core.save_settings(prefs);
        prefs.transition.duration = self.duration;
        prefs.transition.cross_fade = self.cross_fade;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(view: &TransitionView, x: f64, y: f64) -> Point {
        view.core.viewport.to_screen(Point::new(x, y))
    }

    #[test]
    fn detach_returns_attached_session() {
        let mut view = TransitionView::new();
        let session = Session::new("next");
        let uid = session.uid();
        assert!(view.attach(SessionSource::new(session)).is_none());

        let at = screen(&view, -1.0, 0.0);
        assert!(view.pick(at).is_some());

        let back = view.detach().unwrap();
        assert_eq!(back.uid(), uid);
        assert!(view.pick(at).is_none());
        assert!(view.detach().is_none());
    }

    #[test]
    fn attach_replaces_previous() {
        let mut view = TransitionView::new();
        let first = Session::new("first");
        let uid = first.uid();
        view.attach(SessionSource::new(first));
        let previous = view.attach(SessionSource::new(Session::new("second"))).unwrap();
        assert_eq!(previous.uid(), uid);
    }

    #[test]
    fn play_animates_to_the_end() {
        let mut mixer = Mixer::new();
        let mut view = TransitionView::new();
        view.set_duration(1.0);
        view.attach(SessionSource::new(Session::new("next")));
        view.play(true);
        view.update(&mut mixer, 0.5);
        assert!((view.attached().unwrap().progress() - 0.5).abs() < 1e-9);
        assert!(view.is_playing());
        view.update(&mut mixer, 0.6);
        assert_eq!(view.attached().unwrap().progress(), 1.0);
        assert!(!view.is_playing());
    }

    #[test]
    fn play_without_source_does_nothing() {
        let mut view = TransitionView::new();
        view.play(true);
        assert!(!view.is_playing());
    }

    #[test]
    fn grab_slides_along_timeline() {
        let mut mixer = Mixer::new();
        let mut view = TransitionView::new();
        view.attach(SessionSource::new(Session::new("next")));
        let from = screen(&view, -1.0, 0.0);
        let pick = view.pick(from).unwrap();
        view.initiate(&mixer);
        let cursor = view.grab(&mut mixer, None, from, screen(&view, -0.75, 0.0), pick);
        view.terminate(&mut mixer);
        assert!((view.attached().unwrap().progress() - 0.25).abs() < 1e-9);
        assert_eq!(cursor.kind, CursorType::ResizeEW);
    }

    #[test]
    fn fade_mode_darkens_halfway() {
        let mut mixer = Mixer::new();
        let mut view = TransitionView::new();
        view.set_cross_fade(false);
        view.attach(SessionSource::new(Session::new("next")));
        view.play(true);
        view.update(&mut mixer, 0.5);
        assert!((mixer.fading() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn output_surface_starts_playback() {
        let mut mixer = Mixer::new();
        let mut view = TransitionView::new();
        view.attach(SessionSource::new(Session::new("next")));
        let at = screen(&view, OUTPUT_X, 0.0);
        let pick = view.pick(at).unwrap();
        view.initiate(&mixer);
        let cursor = view.grab(&mut mixer, None, at, at, pick);
        view.terminate(&mut mixer);
        assert_eq!(cursor.kind, CursorType::Hand);
        assert!(view.is_playing());
    }

    #[test]
    fn timeline_marks_are_not_pickable() {
        let view = TransitionView::new();
        assert!(view.pick(screen(&view, -0.5, 0.0)).is_none());
    }

    #[test]
    fn settings_persist() {
        let mut view = TransitionView::new();
        view.set_duration(2.5);
        view.set_cross_fade(false);
        let mut prefs = Preferences::default();
        view.save_settings(&mut prefs);
        let mut other = TransitionView::new();
        other.restore_settings(&prefs);
        assert_eq!(other.duration(), 2.5);
        assert!(!other.cross_fade());
    }
}
