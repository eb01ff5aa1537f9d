// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Scripted replay of editing sessions.
//!
//! A script lists the sources to start from and a sequence of steps (view
//! switches, frames, pointer events, camera and mixer operations). Points are
//! given in scene units of the active view and converted to screen pixels with
//! the camera in place when the pointer went down, so a gesture that pans the
//! view still replays against the camera it started with.
//!
//! ```json
//! {
//!   "sources": [{ "name": "cam", "mixing": [0.5, 0.0] }],
//!   "steps": [
//!     { "op": "down", "at": [0.5, 0.0] },
//!     { "op": "move", "to": [0.2, 0.0] },
//!     { "op": "up" }
//!   ]
//! }
//! ```

use crate::compositor::Compositor;
use crate::editing::{Cursor, ViewPort};
use crate::mixer::FadeColor;
use crate::model::{Session, SessionSource, Source, SourceId};
use crate::views::Mode;
use anyhow::{Context, Result, bail};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame time used by `update` steps that do not give one
const FRAME_TIME: f64 = 1.0 / 60.0;

fn frame_time() -> f64 {
    FRAME_TIME
}

fn default_aspect_ratio() -> f64 {
    16.0 / 9.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Canvas size in pixels
    #[serde(default)]
    pub canvas: Option<[f64; 2]>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A source present when the replay starts
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,
    #[serde(default)]
    pub mixing: [f64; 2],
    /// Stacked above the sources before it when absent
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Mode { mode: Mode },
    Update {
        #[serde(default = "frame_time")]
        dt: f64,
    },
    Down { at: [f64; 2] },
    Move { to: [f64; 2] },
    Up,
    Cancel,
    Select { from: [f64; 2], to: [f64; 2] },
    SelectAll,
    Zoom { factor: f64 },
    Resize { level: i32 },
    Recenter,
    CenterCurrent,
    Current { source: Option<String> },
    SetDepth { source: String, depth: f64 },
    Attach { session: String },
    Detach,
    Play {
        #[serde(default = "open_by_default")]
        open: bool,
    },
    FadeColor { color: FadeColor },
    Resolution { width: f64, height: f64 },
}

fn open_by_default() -> bool {
    true
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In {}", path.display()))
    }
}

/// Outcome of a replay, printed as JSON by the binary
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub mode: Mode,
    /// Cursor answered by every `move` step
    pub cursors: Vec<Cursor>,
    pub sources: Vec<SourceState>,
    pub selection: Vec<String>,
    pub current: Option<String>,
    pub fading: f64,
    pub fade_color: FadeColor,
    pub transition: Option<f64>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceState {
    pub name: String,
    pub mixing: [f64; 2],
    pub alpha: f64,
    pub excluded: bool,
    pub depth: f64,
    pub translation: [f64; 2],
    pub rotation: f64,
    pub scale: [f64; 2],
    pub crop: [f64; 2],
    pub locked: bool,
}

impl From<&Source> for SourceState {
    fn from(source: &Source) -> Self {
        Self {
            name: source.name.clone(),
            mixing: [source.mixing.x, source.mixing.y],
            alpha: source.alpha,
            excluded: source.excluded,
            depth: source.depth,
            translation: [source.geometry.translation.x, source.geometry.translation.y],
            rotation: source.geometry.rotation,
            scale: [source.geometry.scale.x, source.geometry.scale.y],
            crop: [source.texture.crop.x, source.texture.crop.y],
            locked: source.locked,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub source: Option<String>,
}

/// Drives a compositor through a script
struct Replay<'a> {
    compositor: &'a mut Compositor,
    /// Camera of the active view when the pointer went down
    press: Option<ViewPort>,
    cursors: Vec<Cursor>,
}

impl Replay<'_> {
    fn camera(&self) -> ViewPort {
        self.press
            .or_else(|| self.compositor.active_view().map(|v| v.core().viewport))
            .unwrap_or_default()
    }

    fn screen(&self, at: [f64; 2]) -> Point {
        self.camera().to_screen(Point::new(at[0], at[1]))
    }

    fn source(&self, name: &str) -> Result<SourceId> {
        self.compositor
            .mixer
            .sources
            .find(name)
            .with_context(|| format!("No source named '{name}'"))
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Mode { mode } => {
                if !self.compositor.set_mode(*mode) {
                    bail!("Cannot switch to mode {mode:?}");
                }
                self.press = None;
            }
            Step::Update { dt } => self.compositor.update(*dt),
            Step::Down { at } => {
                let camera = self.camera();
                self.compositor.pointer_down(self.screen(*at));
                self.press = Some(camera);
            }
            Step::Move { to } => {
                let cursor = self.compositor.pointer_move(self.screen(*to));
                tracing::debug!("Cursor {:?} '{}'", cursor.kind, cursor.info);
                self.cursors.push(cursor);
            }
            Step::Up => {
                self.compositor.pointer_up();
                self.press = None;
            }
            Step::Cancel => {
                self.compositor.pointer_cancel();
                self.press = None;
            }
            Step::Select { from, to } => {
                let (from, to) = (self.screen(*from), self.screen(*to));
                self.compositor.select_region(from, to);
            }
            Step::SelectAll => self.compositor.select_all(),
            Step::Zoom { factor } => self.compositor.zoom(*factor),
            Step::Resize { level } => self.compositor.resize(*level),
            Step::Recenter => self.compositor.recenter(),
            Step::CenterCurrent => self.compositor.center_current(),
            Step::Current { source } => {
                let id = source.as_deref().map(|name| self.source(name)).transpose()?;
                self.compositor.mixer.set_current(id);
            }
            Step::SetDepth { source, depth } => {
                let id = self.source(source)?;
                self.compositor.set_depth(id, *depth);
            }
            Step::Attach { session } => {
                let source = SessionSource::new(Session::new(session.as_str()));
                self.compositor.transition_mut().attach(source);
            }
            Step::Detach => {
                self.compositor.transition_mut().detach();
            }
            Step::Play { open } => self.compositor.transition_mut().play(*open),
            Step::FadeColor { color } => self.compositor.mixer.set_fade_color(*color),
            Step::Resolution { width, height } => {
                self.compositor.rendering_mut().set_resolution(Size::new(*width, *height));
            }
        }
        Ok(())
    }
}

/// Replay a script against a compositor and report the resulting state
pub fn replay(script: &Script, compositor: &mut Compositor) -> Result<Report> {
    if let Some([width, height]) = script.canvas {
        compositor.set_canvas(Size::new(width, height));
    }
    for spec in &script.sources {
        let source = Source::new(spec.name.as_str())
            .with_aspect_ratio(spec.aspect_ratio)
            .with_mixing(Point::new(spec.mixing[0], spec.mixing[1]))
            .locked(spec.locked);
        match spec.depth {
            Some(depth) => compositor.add_source(source.with_depth(depth)),
            None => compositor.add_source_on_top(source),
        };
    }
    compositor.update(0.0);
    tracing::info!(
        "Replaying {} steps over {} sources",
        script.steps.len(),
        script.sources.len()
    );

    let mut replay = Replay {
        compositor,
        press: None,
        cursors: Vec::new(),
    };
    for (index, step) in script.steps.iter().enumerate() {
        replay
            .step(step)
            .with_context(|| format!("Step {} ({step:?})", index + 1))?;
    }
    let Replay {
        compositor,
        cursors,
        ..
    } = replay;
    if compositor.is_pointer_down() {
        tracing::warn!("Script ended with the pointer down, releasing");
        compositor.pointer_up();
    }
    compositor.update(0.0);
    Ok(report(compositor, cursors))
}

fn report(compositor: &Compositor, cursors: Vec<Cursor>) -> Report {
    let mixer = &compositor.mixer;
    let name = |id: SourceId| mixer.sources.get(id).map(|s| s.name.clone());
    let history = mixer
        .history()
        .iter()
        .map(|record| HistoryEntry {
            label: record.label.clone(),
            source: record.source.and_then(|uid| {
                mixer
                    .sources
                    .iter()
                    .find(|(_, s)| s.uid == uid)
                    .map(|(_, s)| s.name.clone())
            }),
        })
        .collect();
    Report {
        mode: compositor.mode(),
        cursors,
        sources: mixer.sources.iter().map(|(_, s)| SourceState::from(s)).collect(),
        selection: mixer.selected().into_iter().filter_map(name).collect(),
        current: mixer.current().and_then(name),
        fading: mixer.fading(),
        fade_color: mixer.fade_color(),
        transition: compositor.transition().attached().map(SessionSource::progress),
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::CursorType;

    fn run(json: &str) -> Report {
        let script = Script::from_json(json).unwrap();
        let mut compositor = Compositor::default();
        replay(&script, &mut compositor).unwrap()
    }

    #[test]
    fn mixing_drag_is_reported() {
        let report = run(r#"{
            "sources": [{ "name": "cam", "mixing": [0.5, 0.0] }],
            "steps": [
                { "op": "down", "at": [0.5, 0.0] },
                { "op": "move", "to": [0.2, 0.0] },
                { "op": "up" }
            ]
        }"#);
        assert_eq!(report.cursors.len(), 1);
        assert_eq!(report.cursors[0].kind, CursorType::ResizeAll);
        assert_eq!(report.current.as_deref(), Some("cam"));
        let cam = &report.sources[0];
        assert!((cam.mixing[0] - 0.2).abs() < 1e-9);
        assert!((cam.alpha - 0.8).abs() < 1e-9);
        assert_eq!(report.history.len(), 1);
        assert_eq!(report.history[0].source.as_deref(), Some("cam"));
    }

    #[test]
    fn locked_source_refuses_grab() {
        let report = run(r#"{
            "sources": [{ "name": "cam", "mixing": [0.5, 0.0], "locked": true }],
            "steps": [
                { "op": "down", "at": [0.5, 0.0] },
                { "op": "move", "to": [0.2, 0.0] },
                { "op": "up" }
            ]
        }"#);
        assert_eq!(report.cursors[0].kind, CursorType::NotAllowed);
        assert_eq!(report.sources[0].mixing, [0.5, 0.0]);
    }

    #[test]
    fn depth_and_modes() {
        let report = run(r#"{
            "sources": [{ "name": "a" }, { "name": "b", "depth": 2.0 }],
            "steps": [
                { "op": "mode", "mode": "layer" },
                { "op": "set_depth", "source": "a", "depth": 4.0 },
                { "op": "update" }
            ]
        }"#);
        assert_eq!(report.mode, Mode::Layer);
        assert_eq!(report.sources[0].depth, 4.0);
    }

    #[test]
    fn sources_without_depth_stack_on_top() {
        let report = run(r#"{
            "sources": [{ "name": "a", "depth": 2.0 }, { "name": "b" }, { "name": "c" }]
        }"#);
        let depths: Vec<f64> = report.sources.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn transition_plays_to_completion() {
        let report = run(r#"{
            "steps": [
                { "op": "mode", "mode": "transition" },
                { "op": "attach", "session": "next" },
                { "op": "play" },
                { "op": "update", "dt": 0.5 },
                { "op": "update", "dt": 0.6 }
            ]
        }"#);
        assert_eq!(report.transition, Some(1.0));
    }

    #[test]
    fn unknown_source_fails_with_step() {
        let script = Script::from_json(
            r#"{ "steps": [{ "op": "current", "source": "ghost" }] }"#,
        )
        .unwrap();
        let mut compositor = Compositor::default();
        let err = replay(&script, &mut compositor).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Step 1"));
        assert!(message.contains("ghost"));
    }

    #[test]
    fn invalid_mode_is_an_error() {
        let script = Script::from_json(r#"{ "steps": [{ "op": "mode", "mode": "invalid" }] }"#).unwrap();
        let mut compositor = Compositor::default();
        assert!(replay(&script, &mut compositor).is_err());
    }

    #[test]
    fn malformed_script_is_rejected() {
        assert!(Script::from_json(r#"{ "steps": [{ "op": "jump" }] }"#).is_err());
    }

    #[test]
    fn dangling_press_is_released() {
        let mut compositor = Compositor::default();
        let script = Script::from_json(r#"{ "steps": [{ "op": "down", "at": [3.0, 3.0] }] }"#).unwrap();
        replay(&script, &mut compositor).unwrap();
        assert!(!compositor.is_pointer_down());
    }
}
