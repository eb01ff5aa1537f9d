// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Scene node types: kinds, local transforms and local-space hit tests.
//!
//! Every node kind has a fixed local geometry. Quads (`Surface`, `Frame`) span
//! `[-1, 1]²`, discs and symbols have radius 1, and meshes carry their own
//! path. Placement and size come entirely from the node's `Transform`.

use crate::model::SourceId;
use crate::theme;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Vec2};
use masonry::vello::peniko::Color;

/// Half-thickness of the pickable band along a `Frame` border, in local units
const FRAME_PICK_BAND: f64 = 0.08;

/// Tolerance used when flattening curves for hit tests
const PATH_TOLERANCE: f64 = 0.01;

/// Translation, rotation and scale of a node relative to its parent.
///
/// Composition order is scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec2,
    /// Counter-clockwise rotation in radians
    pub rotation: f64,
    pub scale: Vec2,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::new(1.0, 1.0),
    };

    pub fn from_translation(translation: Vec2) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    pub fn with_uniform_scale(self, s: f64) -> Self {
        self.with_scale(s, s)
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Glyph drawn by a `Symbol` node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Four-way cross (position affordances)
    Cross,
    /// Circular arrow (rotation affordances)
    Rotate,
    /// Square corner grip (scaling affordances)
    Square,
    /// Padlock-like closed square (locked sources)
    Lock,
    /// Clock hand pointing up
    Hand,
    /// Double arrow (crop affordances)
    Arrows,
}

/// Node kind with its kind-specific state
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure composition, no own geometry
    Group,
    /// Textured quad spanning `[-1, 1]²`
    Surface,
    /// Arbitrary geometry, hit-tested by winding
    Mesh(BezPath),
    /// Icon-like glyph within the unit circle
    Symbol(SymbolKind),
    /// Bordered rectangle; only the border band is pickable
    Frame,
    /// Renders and picks only its active child
    Switch { active: usize },
    /// Filled unit circle
    Disk,
}

/// A node in the scene arena
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    pub pickable: bool,
    pub color: Color,
    pub alpha: f32,
    /// Source this node (and its subtree) stands for, if any
    pub owner: Option<SourceId>,
    pub(super) parent: Option<super::NodeId>,
    pub(super) children: Vec<super::NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            transform: Transform::IDENTITY,
            visible: true,
            pickable: true,
            color: theme::scene::DEFAULT,
            alpha: 1.0,
            owner: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn surface() -> Self {
        Self::new(NodeKind::Surface)
    }

    pub fn disk() -> Self {
        Self::new(NodeKind::Disk)
    }

    pub fn frame() -> Self {
        Self::new(NodeKind::Frame)
    }

    pub fn symbol(kind: SymbolKind) -> Self {
        Self::new(NodeKind::Symbol(kind))
    }

    pub fn mesh(path: BezPath) -> Self {
        Self::new(NodeKind::Mesh(path))
    }

    pub fn switch() -> Self {
        Self::new(NodeKind::Switch { active: 0 })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_owner(mut self, owner: SourceId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Exclude this node (not its children) from picking
    pub fn unpickable(mut self) -> Self {
        self.pickable = false;
        self
    }

    pub fn parent(&self) -> Option<super::NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[super::NodeId] {
        &self.children
    }

    /// Whether a point in this node's local space hits its own geometry
    pub fn contains_local(&self, p: Point) -> bool {
        match &self.kind {
            NodeKind::Group | NodeKind::Switch { .. } => false,
            NodeKind::Surface => unit_rect().contains(p),
            NodeKind::Frame => {
                let outer = unit_rect().inflate(FRAME_PICK_BAND, FRAME_PICK_BAND);
                let inner = unit_rect().inflate(-FRAME_PICK_BAND, -FRAME_PICK_BAND);
                outer.contains(p) && !inner.contains(p)
            }
            NodeKind::Disk | NodeKind::Symbol(_) => p.to_vec2().hypot2() <= 1.0,
            NodeKind::Mesh(path) => path.winding(p) != 0,
        }
    }

    /// Local-space outline used for drawing and bounds
    pub fn outline(&self) -> Option<BezPath> {
        match &self.kind {
            NodeKind::Group | NodeKind::Switch { .. } => None,
            NodeKind::Surface | NodeKind::Frame => Some(unit_rect().to_path(PATH_TOLERANCE)),
            NodeKind::Disk => Some(Circle::new(Point::ZERO, 1.0).to_path(PATH_TOLERANCE)),
            NodeKind::Symbol(kind) => Some(symbol_path(*kind)),
            NodeKind::Mesh(path) => Some(path.clone()),
        }
    }
}

/// The `[-1, 1]²` quad shared by surfaces and frames
pub fn unit_rect() -> Rect {
    Rect::new(-1.0, -1.0, 1.0, 1.0)
}

fn symbol_path(kind: SymbolKind) -> BezPath {
    let mut path = BezPath::new();
    match kind {
        SymbolKind::Cross => {
            path.move_to((-1.0, 0.0));
            path.line_to((1.0, 0.0));
            path.move_to((0.0, -1.0));
            path.line_to((0.0, 1.0));
        }
        SymbolKind::Rotate => {
            let arc = kurbo::Arc {
                center: Point::ZERO,
                radii: Vec2::new(0.8, 0.8),
                start_angle: 0.0,
                sweep_angle: 1.5 * std::f64::consts::PI,
                x_rotation: 0.0,
            };
            path.extend(arc.path_elements(PATH_TOLERANCE));
            path.move_to((0.8, 0.0));
            path.line_to((1.0, 0.3));
        }
        SymbolKind::Square => {
            path.extend(Rect::new(-0.7, -0.7, 0.7, 0.7).path_elements(PATH_TOLERANCE));
        }
        SymbolKind::Lock => {
            path.extend(Rect::new(-0.6, -0.8, 0.6, 0.2).path_elements(PATH_TOLERANCE));
            path.move_to((-0.4, 0.2));
            path.line_to((-0.4, 0.7));
            path.line_to((0.4, 0.7));
            path.line_to((0.4, 0.2));
        }
        SymbolKind::Hand => {
            path.move_to((0.0, 0.0));
            path.line_to((0.0, 1.0));
        }
        SymbolKind::Arrows => {
            path.move_to((-1.0, 0.0));
            path.line_to((1.0, 0.0));
            path.move_to((-0.6, 0.4));
            path.line_to((-1.0, 0.0));
            path.line_to((-0.6, -0.4));
            path.move_to((0.6, 0.4));
            path.line_to((1.0, 0.0));
            path.line_to((0.6, -0.4));
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn transform_composes_scale_rotation_translation() {
        let t = Transform::from_translation(Vec2::new(2.0, 0.0))
            .with_rotation(FRAC_PI_2)
            .with_scale(2.0, 1.0);
        let p = t.to_affine() * Point::new(1.0, 0.0);
        assert!((p.x - 2.0).abs() < 1e-9);
        assert!((p.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn surface_contains_unit_square() {
        let node = Node::surface();
        assert!(node.contains_local(Point::new(0.5, -0.5)));
        assert!(!node.contains_local(Point::new(1.5, 0.0)));
    }

    #[test]
    fn frame_only_picks_border() {
        let node = Node::frame();
        assert!(node.contains_local(Point::new(1.0, 0.0)));
        assert!(!node.contains_local(Point::ZERO));
    }

    #[test]
    fn groups_have_no_geometry() {
        assert!(!Node::group().contains_local(Point::ZERO));
        assert!(Node::group().outline().is_none());
    }

    #[test]
    fn mesh_picks_by_winding() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((2.0, 0.0));
        path.line_to((2.0, 2.0));
        path.line_to((0.0, 2.0));
        path.close_path();
        let node = Node::mesh(path);
        assert!(node.contains_local(Point::new(1.0, 1.0)));
        assert!(!node.contains_local(Point::new(3.0, 1.0)));
    }
}
