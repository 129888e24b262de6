use crate::core::geo::Point;
use crate::overlay::sync::Transform;
use crate::traits::{AnimationHandle, NodeId, VectorSurface};
use crate::{OverlayError, Result};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
struct NodeRecord {
    parent: Option<NodeId>,
    attributes: HashMap<String, String>,
    visible: bool,
}

#[derive(Debug)]
struct AnimationRecord {
    #[allow(dead_code)]
    node: NodeId,
    from: Transform,
    to: Transform,
    duration: Duration,
    active: bool,
}

/// Observable animation lifecycle, in the order it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    Created(AnimationHandle),
    Disposed(AnimationHandle),
}

/// In-memory vector surface: records nodes, attributes and animation handles
/// instead of touching a real DOM. Doubles as the test surface and as a
/// reference for wiring a real renderer behind [`VectorSurface`].
#[derive(Debug, Default)]
pub struct MemorySurface {
    nodes: HashMap<NodeId, NodeRecord>,
    animations: HashMap<AnimationHandle, AnimationRecord>,
    animation_log: Vec<AnimationEvent>,
    viewport_box: Option<(Point, Point)>,
    declarative_animation: bool,
    next_id: u64,
}

impl MemorySurface {
    /// Surface with the native declarative animation primitive available
    pub fn new() -> Self {
        Self {
            declarative_animation: true,
            ..Self::default()
        }
    }

    /// Surface without a native animation primitive (legacy rendering engine)
    pub fn without_animation() -> Self {
        Self {
            declarative_animation: false,
            ..Self::default()
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.nodes.get(&node).map(|n| n.visible).unwrap_or(false)
    }

    pub fn viewport_box(&self) -> Option<(Point, Point)> {
        self.viewport_box
    }

    pub fn animations_created(&self) -> usize {
        self.animation_log
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Created(_)))
            .count()
    }

    pub fn animations_disposed(&self) -> usize {
        self.animation_log
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Disposed(_)))
            .count()
    }

    pub fn active_animations(&self) -> usize {
        self.animations.values().filter(|a| a.active).count()
    }

    pub fn animation_log(&self) -> &[AnimationEvent] {
        &self.animation_log
    }

    /// Endpoints of an animation, for asserting transition targets
    pub fn animation_range(&self, handle: AnimationHandle) -> Option<(Transform, Transform)> {
        self.animations.get(&handle).map(|a| (a.from, a.to))
    }

    pub fn animation_duration(&self, handle: AnimationHandle) -> Option<Duration> {
        self.animations.get(&handle).map(|a| a.duration)
    }

    fn descendants_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = vec![node];
        let mut index = 0;
        while index < found.len() {
            let parent = found[index];
            found.extend(
                self.nodes
                    .iter()
                    .filter(|(_, record)| record.parent == Some(parent))
                    .map(|(id, _)| *id),
            );
            index += 1;
        }
        found
    }
}

impl VectorSurface for MemorySurface {
    fn create_group(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(&parent) {
                return Err(OverlayError::Surface(format!(
                    "unknown parent node {parent:?}"
                )));
            }
        }

        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            NodeRecord {
                parent,
                attributes: HashMap::new(),
                visible: true,
            },
        );
        Ok(id)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let record = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| OverlayError::Surface(format!("unknown node {node:?}")))?;
        record.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.visible = visible;
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        for id in self.descendants_of(node) {
            self.nodes.remove(&id);
        }
    }

    fn set_viewport_box(&mut self, origin: Point, size: Point) {
        self.viewport_box = Some((origin, size));
    }

    fn supports_transform_animation(&self) -> bool {
        self.declarative_animation
    }

    fn begin_transform_animation(
        &mut self,
        node: NodeId,
        from: &Transform,
        to: &Transform,
        duration: Duration,
    ) -> Result<AnimationHandle> {
        if !self.declarative_animation {
            return Err(OverlayError::MissingDependency(
                "declarative transform animation".into(),
            ));
        }
        if !self.nodes.contains_key(&node) {
            return Err(OverlayError::Surface(format!("unknown node {node:?}")));
        }

        self.next_id += 1;
        let handle = AnimationHandle(self.next_id);
        self.animations.insert(
            handle,
            AnimationRecord {
                node,
                from: *from,
                to: *to,
                duration,
                active: true,
            },
        );
        self.animation_log.push(AnimationEvent::Created(handle));
        Ok(handle)
    }

    fn cancel_transform_animation(&mut self, handle: AnimationHandle) {
        match self.animations.get_mut(&handle) {
            Some(record) if record.active => {
                record.active = false;
                self.animation_log.push(AnimationEvent::Disposed(handle));
            }
            // Stale or unknown handle: already superseded, nothing to do
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_hierarchy_removal() {
        let mut surface = MemorySurface::new();
        let root = surface.create_group(None).unwrap();
        let child = surface.create_group(Some(root)).unwrap();
        let grandchild = surface.create_group(Some(child)).unwrap();
        assert_eq!(surface.node_count(), 3);

        surface.remove_node(root);
        assert_eq!(surface.node_count(), 0);
        assert!(!surface.contains(grandchild));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut surface = MemorySurface::new();
        assert!(surface.create_group(Some(NodeId(99))).is_err());
    }

    #[test]
    fn test_attributes() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();

        surface
            .set_attribute(node, "transform", "translate(1,2) scale(3,3)")
            .unwrap();
        assert_eq!(
            surface.attribute(node, "transform"),
            Some("translate(1,2) scale(3,3)")
        );
        assert!(surface.set_attribute(NodeId(99), "transform", "x").is_err());
    }

    #[test]
    fn test_animation_bookkeeping() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();
        let from = Transform::identity();
        let to = Transform::new(Point::new(5.0, 5.0), 2.0);

        let handle = surface
            .begin_transform_animation(node, &from, &to, Duration::from_millis(250))
            .unwrap();
        assert_eq!(surface.active_animations(), 1);
        assert_eq!(surface.animation_range(handle), Some((from, to)));

        surface.cancel_transform_animation(handle);
        assert_eq!(surface.active_animations(), 0);

        // Disposing twice logs only one disposal
        surface.cancel_transform_animation(handle);
        assert_eq!(surface.animations_disposed(), 1);
        assert_eq!(
            surface.animation_log(),
            &[
                AnimationEvent::Created(handle),
                AnimationEvent::Disposed(handle)
            ]
        );
    }

    #[test]
    fn test_without_animation_support() {
        let mut surface = MemorySurface::without_animation();
        let node = surface.create_group(None).unwrap();
        assert!(!surface.supports_transform_animation());
        assert!(surface
            .begin_transform_animation(
                node,
                &Transform::identity(),
                &Transform::identity(),
                Duration::from_millis(250)
            )
            .is_err());
    }
}
