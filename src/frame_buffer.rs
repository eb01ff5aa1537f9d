// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Output frame buffer description

use crate::settings;
use kurbo::Size;

/// Render target the output is composited into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBuffer {
    resolution: Size,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(settings::render::DEFAULT_RESOLUTION)
    }
}

impl FrameBuffer {
    /// A zero or negative size falls back to the default resolution
    pub fn new(resolution: Size) -> Self {
        let resolution = if resolution.width > 0.0 && resolution.height > 0.0 {
            resolution
        } else {
            settings::render::DEFAULT_RESOLUTION
        };
        Self { resolution }
    }

    pub fn resolution(&self) -> Size {
        self.resolution
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f64 {
        self.resolution.width / self.resolution.height
    }
}
