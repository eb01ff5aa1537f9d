// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Mixing view: sources as tokens on a disk, distance to centre sets alpha.
//!
//! The mixing circle has radius 1. A source at the centre is fully opaque and
//! fades out toward the rim; past the limbo circle it leaves the mix
//! altogether. The rim carries the output fading slider and the two fade
//! buttons.

use super::{Mode, View, ViewCore};
use crate::editing::{Cursor, CursorType};
use crate::mixer::Mixer;
use crate::model::{Source, SourceId};
use crate::preferences::Preferences;
use crate::scene::{Node, NodeId, Pick, Scene, SymbolKind, Transform};
use crate::{settings, theme};
use kurbo::{Point, Vec2};
use std::f64::consts::{FRAC_PI_2, PI};

/// Angle between a fade button and the top or bottom of the rim
const BUTTON_OFFSET: f64 = 0.15;

/// Scene radius of the slider knob and the fade buttons
const KNOB_SIZE: f64 = 0.05;

pub struct MixingView {
    core: ViewCore,
    limbo_scale: f64,
    circle: NodeId,
    limbo: NodeId,
    slider_root: NodeId,
    slider: NodeId,
    button_white: NodeId,
    button_black: NodeId,
}

impl Default for MixingView {
    fn default() -> Self {
        Self::new()
    }
}

impl MixingView {
    pub fn new() -> Self {
        let mut core = ViewCore::new(
            Mode::Mixing,
            Some(settings::mixing::ZOOM),
            settings::mixing::DEFAULT_ZOOM,
        );
        let limbo_scale = settings::mixing::LIMBO_SCALE;
        let scene = &mut core.scene;
        let background = scene.background();
        let limbo = scene.insert(
            background,
            Node::disk()
                .with_transform(Transform::IDENTITY.with_uniform_scale(limbo_scale))
                .with_color(theme::mixing::LIMBO)
                .unpickable(),
        );
        scene.insert(
            background,
            Node::disk()
                .with_transform(
                    Transform::from_translation(settings::mixing::STASH_CENTER.to_vec2())
                        .with_uniform_scale(settings::mixing::STASH_RADIUS),
                )
                .with_color(theme::mixing::STASH)
                .unpickable(),
        );
        let circle = scene.insert(background, Node::disk().with_color(theme::mixing::CIRCLE));

        let foreground = scene.foreground();
        let slider_root = scene.insert(foreground, Node::group());
        let slider = scene.insert(
            slider_root,
            Node::disk()
                .with_transform(Transform::from_translation(Vec2::new(0.0, 1.0)).with_uniform_scale(KNOB_SIZE))
                .with_color(theme::mixing::SLIDER),
        );
        let button_white = scene.insert(
            foreground,
            Node::disk()
                .with_transform(rim_transform(FRAC_PI_2 + BUTTON_OFFSET))
                .with_color(theme::mixing::BUTTON_WHITE),
        );
        let button_black = scene.insert(
            foreground,
            Node::disk()
                .with_transform(rim_transform(-FRAC_PI_2 - BUTTON_OFFSET))
                .with_color(theme::mixing::BUTTON_BLACK),
        );

        Self {
            core,
            limbo_scale,
            circle,
            limbo,
            slider_root,
            slider,
            button_white,
            button_black,
        }
    }

    pub fn limbo_scale(&self) -> f64 {
        self.limbo_scale
    }

    pub fn set_limbo_scale(&mut self, scale: f64) {
        self.limbo_scale = scale.max(1.0);
        self.core
            .scene
            .set_transform(self.limbo, Transform::IDENTITY.with_uniform_scale(self.limbo_scale));
    }

    /// Recompute a source's alpha and limbo state from its mixing position.
    ///
    /// Returns the new alpha, or `None` for a stale handle.
    pub fn set_alpha(&self, mixer: &mut Mixer, id: SourceId) -> Option<f64> {
        let source = mixer.sources.get_mut(id)?;
        let r = source.mixing.to_vec2().hypot();
        source.alpha = (1.0 - r).clamp(0.0, 1.0);
        let excluded = r >= self.limbo_scale;
        if excluded != source.excluded {
            tracing::info!(
                "Source '{}' {} the mix",
                source.name,
                if excluded { "left" } else { "joined" }
            );
            source.excluded = excluded;
        }
        Some(source.alpha)
    }

    fn grab_slider(&mut self, mixer: &mut Mixer, to: Point) -> Cursor {
        let p = self.core.gesture_start().viewport.to_scene(to);
        let theta = p.y.atan2(p.x);
        let fading = ((FRAC_PI_2 - theta) / PI).clamp(0.0, 1.0);
        mixer.set_fading(fading);
        self.place_slider(fading);
        self.core.current_action = format!("Output fading {:.0}%", fading * 100.0);
        Cursor::new(CursorType::Hand, format!("Fading {:.0}%", fading * 100.0))
    }

    fn press_button(&mut self, mixer: &mut Mixer, fading: f64) -> Cursor {
        mixer.set_fading(fading);
        self.place_slider(fading);
        let label = if fading > 0.0 { "Fade to black" } else { "Fade to clear" };
        self.core.current_action = label.to_string();
        Cursor::new(CursorType::Hand, label)
    }

    fn grab_source(&mut self, mixer: &mut Mixer, id: SourceId, from: Point, to: Point) -> Cursor {
        let Some(source) = mixer.sources.get(id) else {
            return Cursor::default();
        };
        if source.locked {
            return Cursor::new(CursorType::NotAllowed, "Locked");
        }
        let uid = source.uid;
        let name = source.name.clone();

        let start = self.core.gesture_start();
        let delta = start.viewport.scene_delta(from, to);
        let targets: Vec<(SourceId, Point)> = if mixer.selection.contains(&id) {
            mixer.selected()
        } else {
            vec![id]
        }
        .into_iter()
        .filter_map(|target| start.source(target).map(|s| (target, s.mixing)))
        .collect();

        for (target, origin) in targets {
            match mixer.sources.get_mut(target) {
                Some(s) if !s.locked => s.mixing = origin + delta,
                _ => continue,
            }
            self.set_alpha(mixer, target);
        }

        let alpha = mixer.sources.get(id).map_or(0.0, |s| s.alpha);
        self.core.current_action = format!("{name}: Alpha {alpha:.2}");
        self.core.current_id = Some(uid);
        Cursor::new(CursorType::ResizeAll, format!("Alpha {alpha:.2}"))
    }

    fn place_slider(&mut self, fading: f64) {
        self.core
            .scene
            .set_transform(self.slider_root, Transform::IDENTITY.with_rotation(-fading * PI));
    }
}

/// A knob sitting on the rim of the unit circle at `angle`
fn rim_transform(angle: f64) -> Transform {
    Transform::from_translation(Vec2::new(angle.cos(), angle.sin())).with_uniform_scale(KNOB_SIZE)
}

fn build_token(scene: &mut Scene, id: SourceId, _source: &Source) -> NodeId {
    let workspace = scene.workspace();
    let group = scene.insert(workspace, Node::group().with_owner(id));
    scene.insert(
        group,
        Node::disk()
            .with_transform(Transform::IDENTITY.with_uniform_scale(settings::mixing::TOKEN_SIZE))
            .with_color(theme::source::FILL),
    );
    scene.insert(
        group,
        Node::frame()
            .with_transform(Transform::IDENTITY.with_uniform_scale(settings::mixing::TOKEN_SIZE * 1.3))
            .with_color(theme::source::SELECTED)
            .unpickable()
            .hidden(),
    );
    scene.insert(
        group,
        Node::symbol(SymbolKind::Lock)
            .with_transform(Transform::IDENTITY.with_uniform_scale(settings::mixing::TOKEN_SIZE * 0.5))
            .with_color(theme::source::LOCKED)
            .unpickable()
            .hidden(),
    );
    group
}

impl View for MixingView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn update(&mut self, mixer: &mut Mixer, _dt: f64) {
        // the limbo scale may have changed since positions were last checked
        for id in mixer.sources.ids() {
            self.set_alpha(mixer, id);
        }
        let current = mixer.current();
        let selection = mixer.selection.clone();
        self.core.sync_sources(mixer, build_token, |scene, node, id, source| {
            scene.set_transform(node, Transform::from_translation(source.mixing.to_vec2()));
            let children = scene.children(node).to_vec();
            if let &[token, frame, lock] = children.as_slice() {
                scene.set_alpha(token, source.alpha.max(0.2) as f32);
                let highlighted = current == Some(id) || selection.contains(&id);
                scene.set_visible(frame, highlighted);
                if let Some(f) = scene.get_mut(frame) {
                    f.color = if current == Some(id) {
                        theme::source::CURRENT
                    } else {
                        theme::source::SELECTED
                    };
                }
                scene.set_visible(lock, source.locked);
            }
        });
        self.place_slider(mixer.fading());
    }

    fn center_source(&mut self, mixer: &Mixer, source: SourceId) {
        if let Some(s) = mixer.sources.get(source) {
            self.core.viewport.translation = -s.mixing.to_vec2();
        }
    }

    /// Hits on the rim of the mixing circle resolve to the fading slider
    fn pick(&self, point: Point) -> Option<Pick> {
        let pick = self.core.pick(point);
        if let Some(hit) = pick
            && hit.node != self.circle
        {
            return Some(hit);
        }
        let p = self.core.to_scene(point);
        let r = p.to_vec2().hypot();
        if (r - 1.0).abs() < settings::mixing::RIM_TOLERANCE {
            let local = self.core.scene.world_transform(self.slider).inverse() * p;
            return Some(Pick {
                node: self.slider,
                local,
            });
        }
        pick
    }

    /// Sources still in the mix
    fn select_all(&mut self, mixer: &mut Mixer) {
        let ids: Vec<SourceId> = mixer
            .sources
            .iter()
            .filter(|(_, s)| !s.excluded)
            .map(|(id, _)| id)
            .collect();
        mixer.selection.set(ids);
    }

    fn grab(&mut self, mixer: &mut Mixer, source: Option<SourceId>, from: Point, to: Point, pick: Pick) -> Cursor {
        self.core.gesture_start();
        if pick.node == self.slider {
            return self.grab_slider(mixer, to);
        }
        if pick.node == self.button_white {
            return self.press_button(mixer, 0.0);
        }
        if pick.node == self.button_black {
            return self.press_button(mixer, 1.0);
        }
        match source {
            Some(id) => self.grab_source(mixer, id, from, to),
            None => Cursor::default(),
        }
    }

    fn restore_settings(&mut self, prefs: &Preferences) {
        self.core.restore_settings(prefs);
        self.set_limbo_scale(prefs.mixing.limbo_scale);
    }

    fn save_settings(&self, prefs: &mut Preferences) {
        self.core.save_settings(prefs);
        prefs.mixing.limbo_scale = self.limbo_scale;
    }
}
