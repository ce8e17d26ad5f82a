//! The scene graph: an arena-backed forest of asset nodes.
//!
//! Nodes are stored in generational slots. Children are owned id lists
//! on their parent; the parent link is a plain back-reference id, never
//! a shared pointer, so the tree invariant (single parent, no cycles)
//! is enforced at mutation time.

use std::collections::HashMap;

use crate::error::SceneError;
use crate::scene::node::{AssetNode, NodeId};
use crate::transform::WorldTransform;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<AssetNode>,
}

/// A scene: a forest of [`AssetNode`] trees plus per-scene bookkeeping.
///
/// All ids handed out by a scene are local to that instance. Removing a
/// node frees its whole subtree and invalidates captured ids (their
/// slot generation is bumped).
#[derive(Debug, Default)]
pub struct Scene {
    name: Option<String>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    /// original node id -> most recent clone of that node.
    last_copies: HashMap<NodeId, NodeId>,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Scene name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root node ids, in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|s| s.generation == id.generation && s.node.is_some())
    }

    /// Borrow a node, or `None` if the id is stale.
    pub fn get(&self, id: NodeId) -> Option<&AssetNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Borrow a node, failing on stale ids.
    pub fn node(&self, id: NodeId) -> Result<&AssetNode, SceneError> {
        self.get(id).ok_or(SceneError::StaleNode)
    }

    /// Mutably borrow a node, failing on stale ids.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut AssetNode, SceneError> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or(SceneError::StaleNode)?;
        if slot.generation != id.generation {
            return Err(SceneError::StaleNode);
        }
        slot.node.as_mut().ok_or(SceneError::StaleNode)
    }

    // ---- Insertion ----

    /// Inserts a detached node as a new root.
    pub fn spawn(&mut self, node: AssetNode) -> Result<NodeId, SceneError> {
        let name = self.unique_sibling_name(&node, None)?;
        let id = self.insert_slot(node, name, None);
        self.roots.push(id);
        Ok(id)
    }

    /// Inserts a detached node as the last child of `parent`.
    ///
    /// Fails if `parent` is stale or an explicitly named sibling
    /// collides; default names are made unique by suffixing.
    pub fn add_child(&mut self, parent: NodeId, node: AssetNode) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::StaleNode);
        }
        let name = self.unique_sibling_name(&node, Some(parent))?;
        let id = self.insert_slot(node, name, Some(parent));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn insert_slot(&mut self, mut node: AssetNode, name: String, parent: Option<NodeId>) -> NodeId {
        node.name = name;
        node.parent = parent;
        node.children.clear();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        log::trace!("inserted node {id}");
        id
    }

    /// Resolves the name a node will carry among the given siblings.
    ///
    /// Explicit names must be unique; default names get an `_N` suffix
    /// until they are.
    fn unique_sibling_name(
        &self,
        node: &AssetNode,
        parent: Option<NodeId>,
    ) -> Result<String, SceneError> {
        let siblings: &[NodeId] = match parent {
            Some(p) => &self.node(p)?.children,
            None => &self.roots,
        };
        let taken = |name: &str| {
            siblings
                .iter()
                .filter_map(|&id| self.get(id))
                .any(|n| n.name == name)
        };
        if !taken(&node.name) {
            return Ok(node.name.clone());
        }
        if node.user_named {
            return Err(SceneError::DuplicateName {
                name: node.name.clone(),
            });
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}_{n}", node.name);
            if !taken(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    // ---- Mutation ----

    /// Moves `child` (with its whole subtree) under `new_parent`.
    ///
    /// Fails eagerly on stale ids, self-parenting, cycles, and sibling
    /// name collisions at the destination.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if !self.contains(child) || !self.contains(new_parent) {
            return Err(SceneError::StaleNode);
        }
        if child == new_parent || self.is_ancestor(child, new_parent) {
            return Err(SceneError::WouldCycle);
        }
        // Destination sibling names must stay unique.
        let moving = self.node(child)?;
        let name_clash = self
            .node(new_parent)?
            .children
            .iter()
            .filter_map(|&id| self.get(id))
            .any(|n| n.name == moving.name);
        if name_clash {
            return Err(SceneError::DuplicateName {
                name: moving.name.clone(),
            });
        }

        self.detach_from_parent(child);
        self.node_mut(new_parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(new_parent);
        Ok(())
    }

    /// Whether `ancestor` is on the parent chain of `node` (or is it).
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn detach_from_parent(&mut self, id: NodeId) {
        let parent = self.get(id).and_then(|n| n.parent);
        match parent {
            Some(p) => {
                if let Ok(parent_node) = self.node_mut(p) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        if let Ok(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Removes a node and its entire subtree.
    ///
    /// Every id in the subtree becomes stale; external references into
    /// the removed subtree stop resolving.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::StaleNode);
        }
        self.detach_from_parent(id);
        let mut removed = Vec::new();
        self.free_subtree(id, &mut removed);
        for dead in removed {
            self.prune_last_copies(dead);
        }
        Ok(())
    }

    fn free_subtree(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let children = match self.get(id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.free_subtree(child, removed);
        }
        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        removed.push(id);
        log::trace!("removed node {id}");
    }

    /// Drops last-copy entries touching a dead id, re-pointing chains
    /// across the gap where possible.
    fn prune_last_copies(&mut self, dead: NodeId) {
        match self.last_copies.remove(&dead) {
            // dead was itself cloned: entries pointing at it can skip
            // ahead to its successor, keeping the chain resolvable.
            Some(next) => {
                for value in self.last_copies.values_mut() {
                    if *value == dead {
                        *value = next;
                    }
                }
            }
            None => self.last_copies.retain(|_, v| *v != dead),
        }
    }

    // ---- Lookup & traversal ----

    /// Finds the first node named `name` in depth-first order across all
    /// roots (children in insertion order).
    pub fn find_by_name(&self, name: &str) -> Result<NodeId, SceneError> {
        for &root in &self.roots {
            if let Some(found) = self.find_in_subtree(root, name) {
                return Ok(found);
            }
        }
        Err(SceneError::NodeNotFound(name.to_owned()))
    }

    /// Finds the first node named `name` in the subtree rooted at `root`
    /// (including `root` itself), depth-first.
    pub fn find_by_name_under(&self, root: NodeId, name: &str) -> Result<NodeId, SceneError> {
        if !self.contains(root) {
            return Err(SceneError::StaleNode);
        }
        self.find_in_subtree(root, name)
            .ok_or_else(|| SceneError::NodeNotFound(name.to_owned()))
    }

    fn find_in_subtree(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.name == name {
            return Some(id);
        }
        for &child in &node.children {
            if let Some(found) = self.find_in_subtree(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// All ids in the subtree rooted at `id` (inclusive), depth-first,
    /// children in insertion order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.get(id) {
            out.push(id);
            for &child in &node.children {
                self.collect_subtree(child, out);
            }
        }
    }

    /// Depth-first traversal over the whole forest.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_subtree(root, &mut out);
        }
        out
    }

    // ---- World transforms ----

    /// Computes the node's world transform: its local transform composed
    /// with every ancestor up to its root, applied root to leaf.
    ///
    /// Derived from the tree path on every call; nothing is cached.
    pub fn world_transform(&self, id: NodeId) -> Result<WorldTransform, SceneError> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            chain.push(current);
            cursor = node.parent;
        }
        let mut world = WorldTransform::IDENTITY;
        for ancestor in chain.into_iter().rev() {
            let node = self.node(ancestor)?;
            world = world.mul_transform(&node.transform);
        }
        Ok(world)
    }

    // ---- Cloning & last-copy resolution ----

    /// Deep-copies the subtree rooted at `id` under `new_parent`
    /// (`None` makes the clone a new root).
    ///
    /// Cloned nodes get fresh ids but keep their names, so name-based
    /// lookups keep working inside the clone. If the clone's own name
    /// collides at the destination it gets a `_copyN` suffix. Every
    /// original node is recorded in the per-scene last-copy map so that
    /// [`resolve_last_copy`](Self::resolve_last_copy) can follow a
    /// captured name to its newest clone.
    pub fn clone_subtree(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        if let Some(p) = new_parent {
            if !self.contains(p) {
                return Err(SceneError::StaleNode);
            }
            // Cloning into the subtree being copied would recurse into
            // the half-built clone.
            if self.is_ancestor(id, p) {
                return Err(SceneError::WouldCycle);
            }
        }
        let original = self.node(id)?.clone();
        let mut top = original.clone();
        top.name = self.clone_name(&original, new_parent)?;
        // Keep the (possibly suffixed) clone name from colliding checks
        // in insert paths below.
        top.user_named = true;

        let clone_id = match new_parent {
            Some(p) => self.add_child(p, detached(top))?,
            None => self.spawn(detached(top))?,
        };
        self.last_copies.insert(id, clone_id);

        let children = self.node(id)?.children.clone();
        for child in children {
            self.clone_into(child, clone_id)?;
        }
        log::debug!(
            "cloned subtree of {} into {}",
            self.node(id)?.name,
            clone_id
        );
        Ok(clone_id)
    }

    fn clone_into(&mut self, id: NodeId, parent: NodeId) -> Result<(), SceneError> {
        let node = self.node(id)?.clone();
        let clone_id = self.add_child(parent, detached(node))?;
        self.last_copies.insert(id, clone_id);
        let children = self.node(id)?.children.clone();
        for child in children {
            self.clone_into(child, clone_id)?;
        }
        Ok(())
    }

    fn clone_name(
        &self,
        original: &AssetNode,
        new_parent: Option<NodeId>,
    ) -> Result<String, SceneError> {
        let siblings: &[NodeId] = match new_parent {
            Some(p) => &self.node(p)?.children,
            None => &self.roots,
        };
        let taken = |name: &str| {
            siblings
                .iter()
                .filter_map(|&id| self.get(id))
                .any(|n| n.name == name)
        };
        if !taken(&original.name) {
            return Ok(original.name.clone());
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}_copy{n}", original.name);
            if !taken(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// The most recent clone of `original`, if it has been cloned.
    pub fn last_copy(&self, original: NodeId) -> Option<NodeId> {
        let mut id = *self.last_copies.get(&original)?;
        while let Some(&next) = self.last_copies.get(&id) {
            id = next;
        }
        Some(id)
    }

    /// Resolves a name captured before cloning to the newest clone.
    ///
    /// Finds the first node named `name`, then follows the last-copy
    /// chain transitively. A name that was never cloned resolves to
    /// itself.
    pub fn resolve_last_copy(&self, name: &str) -> Result<NodeId, SceneError> {
        let id = self.find_by_name(name)?;
        Ok(self.last_copy(id).unwrap_or(id))
    }
}

/// Strips graph links from a node clone before re-insertion.
fn detached(mut node: AssetNode) -> AssetNode {
    node.parent = None;
    node.children = Vec::new();
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use glam::Vec3;

    fn named(name: &str) -> AssetNode {
        AssetNode::empty().with_name(name)
    }

    fn build_family(scene: &mut Scene) -> (NodeId, NodeId, NodeId) {
        let root = scene.spawn(named("root")).unwrap();
        let child = scene.add_child(root, named("child")).unwrap();
        let grandchild = scene.add_child(child, named("grandchild")).unwrap();
        (root, child, grandchild)
    }

    #[test]
    fn find_by_name_depth_first() {
        let mut scene = Scene::new();
        let (root, child, grandchild) = build_family(&mut scene);
        assert_eq!(scene.find_by_name("root").unwrap(), root);
        assert_eq!(scene.find_by_name("child").unwrap(), child);
        assert_eq!(scene.find_by_name("grandchild").unwrap(), grandchild);
        assert_eq!(
            scene.find_by_name("missing"),
            Err(SceneError::NodeNotFound("missing".into()))
        );
    }

    #[test]
    fn find_under_subtree_only() {
        let mut scene = Scene::new();
        let (_, child, grandchild) = build_family(&mut scene);
        assert_eq!(
            scene.find_by_name_under(child, "grandchild").unwrap(),
            grandchild
        );
        assert_eq!(
            scene.find_by_name_under(grandchild, "child"),
            Err(SceneError::NodeNotFound("child".into()))
        );
    }

    #[test]
    fn default_names_are_suffixed_explicit_names_collide() {
        let mut scene = Scene::new();
        let root = scene.spawn(named("root")).unwrap();
        let a = scene.add_child(root, AssetNode::empty()).unwrap();
        let b = scene.add_child(root, AssetNode::empty()).unwrap();
        assert_eq!(scene.node(a).unwrap().name, "Asset");
        assert_eq!(scene.node(b).unwrap().name, "Asset_1");

        scene.add_child(root, named("goal")).unwrap();
        let err = scene.add_child(root, named("goal")).unwrap_err();
        assert_eq!(err, SceneError::DuplicateName { name: "goal".into() });
    }

    #[test]
    fn removal_detaches_whole_subtree() {
        let mut scene = Scene::new();
        let (_, child, grandchild) = build_family(&mut scene);
        scene.remove(child).unwrap();
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.find_by_name("child").is_err());
        assert!(scene.find_by_name("grandchild").is_err());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn removed_ids_go_stale_even_after_slot_reuse() {
        let mut scene = Scene::new();
        let root = scene.spawn(named("root")).unwrap();
        let old = scene.add_child(root, named("old")).unwrap();
        scene.remove(old).unwrap();
        let new = scene.add_child(root, named("new")).unwrap();
        // Slot is reused, but the captured id must not resolve.
        assert_eq!(new.index(), old.index());
        assert!(!scene.contains(old));
        assert_eq!(scene.node(old), Err(SceneError::StaleNode));
        assert!(scene.contains(new));
    }

    #[test]
    fn reparent_moves_subtree_and_rejects_cycles() {
        let mut scene = Scene::new();
        let (root, child, grandchild) = build_family(&mut scene);
        let other = scene.spawn(named("other")).unwrap();

        scene.reparent(child, other).unwrap();
        assert_eq!(scene.node(child).unwrap().parent(), Some(other));
        assert_eq!(scene.node(root).unwrap().children(), &[]);
        // Subtree came along.
        assert_eq!(scene.find_by_name_under(other, "grandchild").unwrap(), grandchild);

        assert_eq!(scene.reparent(child, child), Err(SceneError::WouldCycle));
        assert_eq!(scene.reparent(child, grandchild), Err(SceneError::WouldCycle));
    }

    #[test]
    fn world_transform_composes_root_to_leaf() {
        let mut scene = Scene::new();
        let root = scene
            .spawn(
                named("root").with_transform(
                    Transform::from_translation(Vec3::new(10.0, 0.0, 0.0))
                        .with_scale(Vec3::splat(2.0)),
                ),
            )
            .unwrap();
        let child = scene
            .add_child(
                root,
                named("child")
                    .with_transform(Transform::from_translation(Vec3::new(1.0, 2.0, 0.0))),
            )
            .unwrap();

        let world = scene.world_transform(child).unwrap();
        // Parent scale applies to the child's translation.
        assert!((world.translation() - Vec3::new(12.0, 4.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn world_transform_of_root_is_local() {
        let mut scene = Scene::new();
        let root = scene
            .spawn(named("root").with_transform(Transform::from_xyz(1.0, 2.0, 3.0)))
            .unwrap();
        let world = scene.world_transform(root).unwrap();
        assert!((world.translation() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn clone_subtree_gets_fresh_ids_and_keeps_names() {
        let mut scene = Scene::new();
        let (root, child, _) = build_family(&mut scene);
        let copy = scene.clone_subtree(child, Some(root)).unwrap();
        assert_ne!(copy, child);
        // Clone of "child" collides with its sibling original.
        assert_eq!(scene.node(copy).unwrap().name, "child_copy1");
        // Interior names are preserved and resolvable from the new root.
        assert!(scene.find_by_name_under(copy, "grandchild").is_ok());
    }

    #[test]
    fn last_copy_resolves_captured_name_to_newest_clone() {
        let mut scene = Scene::new();
        let (_, child, grandchild) = build_family(&mut scene);
        let other = scene.spawn(named("other")).unwrap();

        let copy1 = scene.clone_subtree(child, Some(other)).unwrap();
        assert_eq!(scene.resolve_last_copy("child").unwrap(), copy1);
        let inner1 = scene.resolve_last_copy("grandchild").unwrap();
        assert_ne!(inner1, grandchild);
        assert_eq!(scene.find_by_name_under(copy1, "grandchild").unwrap(), inner1);

        // Cloning the clone chains the resolution forward.
        let copy2 = scene.clone_subtree(copy1, None).unwrap();
        assert_eq!(scene.resolve_last_copy("child").unwrap(), copy2);
    }

    #[test]
    fn uncloned_name_resolves_to_itself() {
        let mut scene = Scene::new();
        let (root, _, _) = build_family(&mut scene);
        assert_eq!(scene.resolve_last_copy("root").unwrap(), root);
    }

    #[test]
    fn removing_a_clone_falls_back_along_the_chain() {
        let mut scene = Scene::new();
        let (_, child, _) = build_family(&mut scene);
        let other = scene.spawn(named("other")).unwrap();
        let copy1 = scene.clone_subtree(child, Some(other)).unwrap();
        let copy2 = scene.clone_subtree(copy1, None).unwrap();
        assert_eq!(scene.resolve_last_copy("child").unwrap(), copy2);

        scene.remove(copy2).unwrap();
        assert_eq!(scene.resolve_last_copy("child").unwrap(), copy1);
    }
}
