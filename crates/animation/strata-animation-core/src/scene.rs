//! Scene-graph seams.
//!
//! The core never owns scene nodes. Hosts implement `SceneLookup` to resolve
//! channel targets and `ChannelSink` to receive blended values. `SceneTree`
//! is a small in-memory implementation for hosts without a scene graph of
//! their own, tools, and tests.

use hashbrown::HashMap;

use crate::data::PropertyKind;

/// Opaque scene node handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// What a channel writes to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TargetRef {
    /// The node's own transform/properties.
    Entity(EntityId),
    /// The blend-weight (skin/morph) component attached to a node.
    BlendWeights(EntityId),
}

impl TargetRef {
    #[inline]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Entity(e) | Self::BlendWeights(e) => *e,
        }
    }
}

/// Read-only lookups the core needs from a scene graph.
pub trait SceneLookup {
    fn entity_name(&self, entity: EntityId) -> Option<&str>;

    /// Depth-first search below `root` (not including it) for a node named `name`.
    fn find_by_name(&self, root: EntityId, name: &str) -> Option<EntityId>;

    /// Whether `entity` carries a blend-weight component.
    fn has_blend_weights(&self, entity: EntityId) -> bool;
}

/// Destination of blended channel values.
pub trait ChannelSink {
    fn write_channel(&mut self, target: TargetRef, property: &PropertyKind, value: &[f32]);
}

#[derive(Clone, Debug, Default)]
struct Node {
    name: String,
    children: Vec<EntityId>,
    blend_weights: bool,
}

/// Minimal named hierarchy that also stores the last value written per
/// (target, property).
#[derive(Clone, Debug, Default)]
pub struct SceneTree {
    nodes: Vec<Node>,
    values: HashMap<(TargetRef, PropertyKind), Vec<f32>>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; `parent = None` creates a root.
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<EntityId>) -> EntityId {
        let id = EntityId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.into(),
            ..Node::default()
        });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p.0 as usize)) {
            p.children.push(id);
        }
        id
    }

    pub fn set_blend_weights(&mut self, entity: EntityId, enabled: bool) {
        if let Some(n) = self.nodes.get_mut(entity.0 as usize) {
            n.blend_weights = enabled;
        }
    }

    /// Last value written for a target property.
    pub fn value(&self, target: TargetRef, property: &PropertyKind) -> Option<&[f32]> {
        self.values
            .get(&(target, property.clone()))
            .map(|v| v.as_slice())
    }
}

impl SceneLookup for SceneTree {
    fn entity_name(&self, entity: EntityId) -> Option<&str> {
        self.nodes.get(entity.0 as usize).map(|n| n.name.as_str())
    }

    fn find_by_name(&self, root: EntityId, name: &str) -> Option<EntityId> {
        let mut stack: Vec<EntityId> = self
            .nodes
            .get(root.0 as usize)?
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(id.0 as usize)?;
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    fn has_blend_weights(&self, entity: EntityId) -> bool {
        self.nodes
            .get(entity.0 as usize)
            .is_some_and(|n| n.blend_weights)
    }
}

impl ChannelSink for SceneTree {
    fn write_channel(&mut self, target: TargetRef, property: &PropertyKind, value: &[f32]) {
        match self.values.get_mut(&(target, property.clone())) {
            Some(slot) => {
                slot.clear();
                slot.extend_from_slice(value);
            }
            None => {
                self.values
                    .insert((target, property.clone()), value.to_vec());
            }
        }
    }
}
