// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! View camera: mapping between screen pixels and scene units.
//!
//! Scene space has y pointing up and one unit equal to half the canvas height
//! at zoom 1. Screen space is in pixels with y pointing down.

use crate::settings;
use kurbo::{Affine, Point, Size, Vec2};

/// Zoom and pan of a view over its scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPort {
    pub zoom: f64,
    /// Scene-space offset applied before zooming
    pub translation: Vec2,
    /// Canvas size in pixels
    pub canvas: Size,
}

impl Default for ViewPort {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ViewPort {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            translation: Vec2::ZERO,
            canvas: settings::editor::DEFAULT_CANVAS,
        }
    }

    /// Pixels per scene unit
    pub fn pixel_scale(&self) -> f64 {
        let half_height = if self.canvas.height > 0.0 {
            self.canvas.height * 0.5
        } else {
            1.0
        };
        self.zoom * half_height
    }

    /// Scene-to-screen transform
    pub fn affine(&self) -> Affine {
        let s = self.pixel_scale();
        let center = Vec2::new(self.canvas.width * 0.5, self.canvas.height * 0.5);
        Affine::translate(center) * Affine::scale_non_uniform(s, -s) * Affine::translate(self.translation)
    }

    pub fn to_screen(&self, scene: Point) -> Point {
        self.affine() * scene
    }

    pub fn to_scene(&self, screen: Point) -> Point {
        self.affine().inverse() * screen
    }

    /// Scene-space displacement between two screen points
    pub fn scene_delta(&self, from: Point, to: Point) -> Vec2 {
        self.to_scene(to) - self.to_scene(from)
    }

    /// Convert a length in pixels to scene units
    pub fn pixels_to_scene(&self, pixels: f64) -> f64 {
        pixels / self.pixel_scale()
    }
}

/// Allowed zoom interval of a view, with the quadratic level mapping used by
/// `resize` and `size`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }

    /// Zoom in (positive factor) or out (negative factor) by steps
    pub fn step(&self, zoom: f64, factor: f64) -> f64 {
        self.clamp(zoom * (1.0 + settings::editor::ZOOM_STEP).powf(factor))
    }

    /// Zoom for a level in `[0, 100]`
    pub fn from_level(&self, level: i32) -> f64 {
        let l = (f64::from(level) * 0.01).clamp(0.0, 1.0);
        self.min + l * l * (self.max - self.min)
    }

    /// Level in `[0, 100]` for a zoom
    pub fn to_level(&self, zoom: f64) -> i32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0;
        }
        let z = ((zoom - self.min) / span).clamp(0.0, 1.0);
        (z.sqrt() * 100.0).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_round_trip() {
        let mut vp = ViewPort::new(2.0);
        vp.translation = Vec2::new(0.3, -0.1);
        let p = Point::new(0.25, 0.5);
        let back = vp.to_scene(vp.to_screen(p));
        assert!((back - p).hypot() < 1e-9);
    }

    #[test]
    fn origin_maps_to_canvas_center_and_y_flips() {
        let vp = ViewPort::new(1.0);
        let c = vp.to_screen(Point::ZERO);
        assert!((c.x - vp.canvas.width * 0.5).abs() < 1e-9);
        assert!((c.y - vp.canvas.height * 0.5).abs() < 1e-9);
        let up = vp.to_screen(Point::new(0.0, 1.0));
        assert!(up.y < c.y);
    }

    #[test]
    fn zoom_levels_round_trip() {
        let range = ZoomRange::new(0.2, 7.0);
        assert_eq!(range.from_level(0), 0.2);
        assert_eq!(range.from_level(100), 7.0);
        assert_eq!(range.to_level(range.from_level(50)), 50);
        assert_eq!(range.from_level(250), 7.0);
    }

    #[test]
    fn step_is_clamped() {
        let range = ZoomRange::new(0.5, 2.0);
        assert_eq!(range.step(1.9, 10.0), 2.0);
        assert_eq!(range.step(0.6, -10.0), 0.5);
        assert!(range.step(1.0, 1.0) > 1.0);
    }
}
