// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Application settings and configuration constants.
//!
//! This module holds non-visual settings that stay stable across sessions.
//! Visual styling (colors, line widths) belongs in `theme.rs`; values the user
//! changes at runtime are persisted by `preferences.rs`.

use kurbo::{Point, Size};

// ============================================================================
// EDITOR SETTINGS
// ============================================================================
/// Canvas size used until the host reports a real one
const DEFAULT_CANVAS: Size = Size::new(1280.0, 800.0);

/// Multiplicative zoom change per zoom step
const ZOOM_STEP: f64 = 0.1;

/// Screen size of grab handles, in pixels
const HANDLE_SIZE: f64 = 12.0;

/// Margin kept around the workspace by `recenter`, as a fraction
const RECENTER_MARGIN: f64 = 0.1;

// ============================================================================
// MIXING VIEW
// ============================================================================
const MIXING_MIN_ZOOM: f64 = 0.2;
const MIXING_MAX_ZOOM: f64 = 7.0;
const MIXING_DEFAULT_ZOOM: f64 = 0.6;

/// Radius beyond which a source leaves the mix
const MIXING_LIMBO_SCALE: f64 = 1.3;

/// Scene-space half size of a source token on the mixing disk
const MIXING_TOKEN_SIZE: f64 = 0.08;

/// Distance from the rim (scene units) still counted as grabbing the slider
const MIXING_RIM_TOLERANCE: f64 = 0.04;

/// Centre of the stash disk, outside the limbo circle
const MIXING_STASH_CENTER: Point = Point::new(1.7, -1.3);
const MIXING_STASH_RADIUS: f64 = 0.3;

// ============================================================================
// GEOMETRY VIEW
// ============================================================================
const GEOMETRY_MIN_ZOOM: f64 = 0.2;
const GEOMETRY_MAX_ZOOM: f64 = 10.0;
const GEOMETRY_DEFAULT_ZOOM: f64 = 0.5;

/// Scale factors never shrink below this
const GEOMETRY_MIN_SCALE: f64 = 0.01;
const GEOMETRY_MAX_SCALE: f64 = 100.0;

// ============================================================================
// LAYER VIEW
// ============================================================================
const LAYER_MIN_ZOOM: f64 = 0.4;
const LAYER_MAX_ZOOM: f64 = 3.0;
const LAYER_DEFAULT_ZOOM: f64 = 0.6;

const LAYER_MIN_DEPTH: f64 = 0.0;
const LAYER_MAX_DEPTH: f64 = 12.0;

/// Depth gap between stacked new sources
const LAYER_DEPTH_STEP: f64 = 1.0;

/// Scene units per depth unit along the layer axis
const LAYER_SPACING: f64 = 0.2;

/// Scene half height of a layer card
const LAYER_CARD_SIZE: f64 = 0.3;

// ============================================================================
// TRANSITION VIEW
// ============================================================================
const TRANSITION_MIN_ZOOM: f64 = 0.5;
const TRANSITION_MAX_ZOOM: f64 = 3.0;
const TRANSITION_DEFAULT_ZOOM: f64 = 1.0;

/// Default duration of a played transition, in seconds
const TRANSITION_DURATION: f64 = 1.0;

/// Scene half height of the transition source card
const TRANSITION_CARD_SIZE: f64 = 0.1;

// ============================================================================
// APPEARANCE VIEW
// ============================================================================
const APPEARANCE_MIN_ZOOM: f64 = 0.4;
const APPEARANCE_MAX_ZOOM: f64 = 7.0;
const APPEARANCE_DEFAULT_ZOOM: f64 = 0.8;

/// Smallest visible fraction left by cropping
const APPEARANCE_MIN_CROP: f64 = 0.1;

/// Rotation snaps to quarter turns within this angle (radians, 2°)
const APPEARANCE_ROTATION_SNAP: f64 = 2.0 * std::f64::consts::PI / 180.0;

// ============================================================================
// RENDER VIEW
// ============================================================================
const RENDER_DEFAULT_RESOLUTION: Size = Size::new(1280.0, 720.0);

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Settings shared by every view
pub mod editor {
    use kurbo::Size;

    pub const DEFAULT_CANVAS: Size = super::DEFAULT_CANVAS;
    pub const ZOOM_STEP: f64 = super::ZOOM_STEP;
    pub const HANDLE_SIZE: f64 = super::HANDLE_SIZE;
    pub const RECENTER_MARGIN: f64 = super::RECENTER_MARGIN;
}

/// Mixing disk layout
pub mod mixing {
    use crate::editing::ZoomRange;
    use kurbo::Point;

    pub const ZOOM: ZoomRange = ZoomRange::new(super::MIXING_MIN_ZOOM, super::MIXING_MAX_ZOOM);
    pub const DEFAULT_ZOOM: f64 = super::MIXING_DEFAULT_ZOOM;
    pub const LIMBO_SCALE: f64 = super::MIXING_LIMBO_SCALE;
    pub const TOKEN_SIZE: f64 = super::MIXING_TOKEN_SIZE;
    pub const RIM_TOLERANCE: f64 = super::MIXING_RIM_TOLERANCE;
    pub const STASH_CENTER: Point = super::MIXING_STASH_CENTER;
    pub const STASH_RADIUS: f64 = super::MIXING_STASH_RADIUS;
}

/// Geometry editing limits
pub mod geometry {
    use crate::editing::ZoomRange;

    pub const ZOOM: ZoomRange = ZoomRange::new(super::GEOMETRY_MIN_ZOOM, super::GEOMETRY_MAX_ZOOM);
    pub const DEFAULT_ZOOM: f64 = super::GEOMETRY_DEFAULT_ZOOM;
    pub const MIN_SCALE: f64 = super::GEOMETRY_MIN_SCALE;
    pub const MAX_SCALE: f64 = super::GEOMETRY_MAX_SCALE;
}

/// Layer stacking
pub mod layer {
    use crate::editing::ZoomRange;

    pub const ZOOM: ZoomRange = ZoomRange::new(super::LAYER_MIN_ZOOM, super::LAYER_MAX_ZOOM);
    pub const DEFAULT_ZOOM: f64 = super::LAYER_DEFAULT_ZOOM;
    pub const MIN_DEPTH: f64 = super::LAYER_MIN_DEPTH;
    pub const MAX_DEPTH: f64 = super::LAYER_MAX_DEPTH;
    pub const DEPTH_STEP: f64 = super::LAYER_DEPTH_STEP;
    pub const SPACING: f64 = super::LAYER_SPACING;
    pub const CARD_SIZE: f64 = super::LAYER_CARD_SIZE;
}

/// Transition timeline
pub mod transition {
    use crate::editing::ZoomRange;

    pub const ZOOM: ZoomRange = ZoomRange::new(super::TRANSITION_MIN_ZOOM, super::TRANSITION_MAX_ZOOM);
    pub const DEFAULT_ZOOM: f64 = super::TRANSITION_DEFAULT_ZOOM;
    pub const DURATION: f64 = super::TRANSITION_DURATION;
    pub const CARD_SIZE: f64 = super::TRANSITION_CARD_SIZE;
}

/// Texture appearance editing
pub mod appearance {
    use crate::editing::ZoomRange;

    pub const ZOOM: ZoomRange = ZoomRange::new(super::APPEARANCE_MIN_ZOOM, super::APPEARANCE_MAX_ZOOM);
    pub const DEFAULT_ZOOM: f64 = super::APPEARANCE_DEFAULT_ZOOM;
    pub const MIN_CROP: f64 = super::APPEARANCE_MIN_CROP;
    pub const ROTATION_SNAP: f64 = super::APPEARANCE_ROTATION_SNAP;
}

/// Output rendering
pub mod render {
    use kurbo::Size;

    pub const DEFAULT_RESOLUTION: Size = super::RENDER_DEFAULT_RESOLUTION;
}
