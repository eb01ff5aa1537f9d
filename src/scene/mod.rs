// Copyright 2025 the Mixboard Authors
// SPDX-License-Identifier: Apache-2.0

//! Arena-backed scene graph owned by each view.
//!
//! Nodes live in slots addressed by [`NodeId`] handles carrying a generation
//! counter, so a handle kept across a removal resolves to nothing instead of
//! to whichever node later reuses the slot. The tree has three fixed top-level
//! groups drawn in order: background, workspace (sources) and foreground
//! (affordances). Picking walks them in the opposite order.

mod node;

pub use node::{Node, NodeKind, SymbolKind, Transform, unit_rect};

use crate::model::SourceId;
use crate::theme;
use kurbo::{Affine, Point, Rect, Shape, Stroke};
use masonry::vello::Scene as Canvas;
use masonry::vello::peniko::{Brush, Fill};
use std::fmt;

/// Transforms with a smaller determinant are treated as collapsed
const MIN_DETERMINANT: f64 = 1e-12;

/// A handle to a node in a [`Scene`]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    idx: u32,
    generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Result of a hit test: the node hit and the point in that node's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub node: NodeId,
    pub local: Point,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A tree of drawable, pickable nodes
#[derive(Debug)]
pub struct Scene {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    root: NodeId,
    background: NodeId,
    workspace: NodeId,
    foreground: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let placeholder = NodeId {
            idx: 0,
            generation: 0,
        };
        let mut scene = Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            root: placeholder,
            background: placeholder,
            workspace: placeholder,
            foreground: placeholder,
        };
        scene.root = scene.alloc(Node::group());
        scene.background = scene.insert(scene.root, Node::group());
        scene.workspace = scene.insert(scene.root, Node::group());
        scene.foreground = scene.insert(scene.root, Node::group());
        scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn background(&self) -> NodeId {
        self.background
    }

    pub fn workspace(&self) -> NodeId {
        self.workspace
    }

    pub fn foreground(&self) -> NodeId {
        self.foreground
    }

    // ===== Allocation =====

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            NodeId {
                idx,
                generation: slot.generation,
            }
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId { idx, generation: 0 }
        }
    }

    /// Insert `node` as the last (topmost) child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a live node of this scene.
    pub fn insert(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        assert!(
            self.contains(parent),
            "cannot insert under {parent:?}: not in the scene"
        );
        node.parent = Some(parent);
        node.children.clear();
        let id = self.alloc(node);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Remove a node and its whole subtree. Stale handles are ignored.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.contains(id) {
            return;
        }
        if let Some(parent) = self.get(id).and_then(|n| n.parent)
            && let Some(p) = self.get_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let Some(node) = self.slots[id.idx as usize].node.take() else {
            return;
        };
        self.slots[id.idx as usize].generation += 1;
        self.free_list.push(id.idx);
        for child in node.children {
            self.free_subtree(child);
        }
    }

    /// Remove every child of `parent`, keeping `parent` itself
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    // ===== Access =====

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.node.is_some())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.get_mut(id) {
            node.transform = transform;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.visible)
    }

    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        if let Some(node) = self.get_mut(id) {
            node.alpha = alpha;
        }
    }

    /// Select which child a `Switch` node renders
    pub fn set_active(&mut self, id: NodeId, index: usize) {
        if let Some(node) = self.get_mut(id)
            && let NodeKind::Switch { active } = &mut node.kind
        {
            *active = index;
        }
    }

    /// Stable reorder of `parent`'s children by a key
    pub fn reorder_children<K: Ord>(&mut self, parent: NodeId, mut key: impl FnMut(NodeId, &Node) -> K) {
        let Some(mut children) = self.get_mut(parent).map(|n| std::mem::take(&mut n.children)) else {
            return;
        };
        children.sort_by_cached_key(|id| {
            let node = self.get(*id);
            node.map(|n| key(*id, n))
        });
        if let Some(p) = self.get_mut(parent) {
            p.children = children;
        }
    }

    // ===== Geometry =====

    /// Composed transform from `id`'s local space to scene space
    pub fn world_transform(&self, id: NodeId) -> Affine {
        let mut xf = Affine::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.get(current) else {
                break;
            };
            xf = node.transform.to_affine() * xf;
            cursor = node.parent;
        }
        xf
    }

    /// Whether `node` is `ancestor` or lies in its subtree
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get(current).and_then(|n| n.parent);
        }
        false
    }

    /// The source a node stands for, inherited from the closest tagged ancestor
    pub fn owner(&self, id: NodeId) -> Option<SourceId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current)?;
            if node.owner.is_some() {
                return node.owner;
            }
            cursor = node.parent;
        }
        None
    }

    /// Scene-space bounding box of the visible geometry under `id`
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        let Some(node) = self.get(id) else {
            return None;
        };
        let parent_xf = node
            .parent
            .map(|p| self.world_transform(p))
            .unwrap_or(Affine::IDENTITY);
        let mut bounds: Option<Rect> = None;
        self.visit(id, parent_xf, 1.0, &mut |node, xf, _| {
            if let Some(outline) = node.outline() {
                let b = (xf * outline).bounding_box();
                bounds = Some(bounds.map_or(b, |acc| acc.union(b)));
            }
        });
        bounds
    }

    // ===== Picking =====

    /// Hit test at a scene-space point.
    ///
    /// Affordances in the foreground are tested before sources in the
    /// workspace, which are tested before the background. Within a group the
    /// last drawn (topmost, deepest) hit wins.
    pub fn pick(&self, point: Point) -> Option<Pick> {
        [self.foreground, self.workspace, self.background]
            .into_iter()
            .find_map(|group| self.pick_in(group, point))
    }

    /// Hit test restricted to the subtree under `id`
    pub fn pick_in(&self, id: NodeId, point: Point) -> Option<Pick> {
        let parent_xf = self
            .get(id)?
            .parent
            .map(|p| self.world_transform(p))
            .unwrap_or(Affine::IDENTITY);
        let mut best = None;
        self.pick_subtree(id, parent_xf, point, &mut best);
        best
    }

    fn pick_subtree(&self, id: NodeId, parent_xf: Affine, point: Point, best: &mut Option<Pick>) {
        let Some(node) = self.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let xf = parent_xf * node.transform.to_affine();
        if node.pickable && xf.determinant().abs() > MIN_DETERMINANT {
            let local = xf.inverse() * point;
            if node.contains_local(local) {
                *best = Some(Pick { node: id, local });
            }
        }
        for child in active_children(node) {
            self.pick_subtree(*child, xf, point, best);
        }
    }

    /// Sources whose workspace nodes have their centre inside `rect`
    pub fn owners_in(&self, rect: Rect) -> Vec<SourceId> {
        self.children(self.workspace)
            .iter()
            .filter(|id| self.is_visible(**id))
            .filter_map(|id| {
                let owner = self.get(*id)?.owner?;
                let bounds = self.bounds(*id)?;
                rect.contains(bounds.center()).then_some(owner)
            })
            .collect()
    }

    // ===== Drawing =====

    /// Visit every visible node in draw order with its composed transform and
    /// inherited alpha
    pub fn visit_drawables(&self, view: Affine, mut f: impl FnMut(&Node, Affine, f32)) {
        self.visit(self.root, view, 1.0, &mut f);
    }

    fn visit(&self, id: NodeId, parent_xf: Affine, parent_alpha: f32, f: &mut impl FnMut(&Node, Affine, f32)) {
        let Some(node) = self.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let xf = parent_xf * node.transform.to_affine();
        let alpha = parent_alpha * node.alpha;
        f(node, xf, alpha);
        for child in active_children(node) {
            self.visit(*child, xf, alpha, f);
        }
    }

    /// Encode the scene into the rendering backend under the `view` transform
    pub fn draw(&self, canvas: &mut Canvas, view: Affine) {
        let stroke = Stroke::new(theme::scene::LINE_WIDTH);
        self.visit_drawables(view, |node, xf, alpha| {
            let Some(outline) = node.outline() else {
                return;
            };
            let path = xf * outline;
            let brush = Brush::Solid(node.color.multiply_alpha(alpha));
            match node.kind {
                NodeKind::Surface | NodeKind::Disk => {
                    canvas.fill(Fill::NonZero, Affine::IDENTITY, &brush, None, &path);
                }
                _ => {
                    canvas.stroke(&stroke, Affine::IDENTITY, &brush, None, &path);
                }
            }
        });
    }
}

fn active_children(node: &Node) -> &[NodeId] {
    match node.kind {
        NodeKind::Switch { active } => node.children.get(active..=active).unwrap_or(&[]),
        _ => &node.children,
    }
}
