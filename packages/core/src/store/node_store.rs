//! NodeStore - arena of nodes plus a children-by-parent index
//!
//! Nodes live in a `HashMap` keyed by id. Sibling order is held by the
//! index: `roots` for top-level nodes and `children` for everything else.
//! Every mutation keeps the index and each node's `parent_id` in step, so
//! queries never scan the whole arena and never observe stale structure.
//!
//! # Examples
//!
//! ```rust
//! use smartmsg_core::models::DetachedNode;
//! use smartmsg_core::store::NodeStore;
//!
//! let mut store = NodeStore::new();
//! let tree = DetachedNode::new("SVC", vec![])
//!     .with_children(vec![DetachedNode::new("OBS", vec![])]);
//! let svc = store.materialize(&tree, None, None).unwrap();
//!
//! assert_eq!(store.depth_of(&svc).unwrap(), 0);
//! assert_eq!(store.descendants_of(&svc).unwrap().len(), 1);
//! ```

use crate::models::{DetachedNode, Node, NodeId, Snapshot};
use crate::store::StoreError;
use std::collections::{HashMap, HashSet};

/// Authoritative node collection for one document
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Next sequence number for minted ids; only ever grows
    next_sequence: u64,
}

impl NodeStore {
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            ..Default::default()
        }
    }

    /// Build a store from a snapshot, validating its structure
    ///
    /// # Errors
    ///
    /// - `DuplicateId` if two nodes share an id
    /// - `DanglingParent` if a parent id is not in the snapshot
    /// - `CycleDetected` if parent links loop
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.replace_with(snapshot)?;
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Ordered child ids of `parent` (`None` = root level)
    pub fn child_ids(&self, parent: Option<&NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(id) => self.children.get(id).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Ordered children of `parent` (`None` = root level)
    pub fn children_of(&self, parent: Option<&NodeId>) -> Vec<&Node> {
        self.child_ids(parent)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    pub fn root_nodes(&self) -> Vec<&Node> {
        self.children_of(None)
    }

    /// All descendants of `id` in pre-order (each child, then its subtree)
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if `id` is unknown
    /// - `CycleDetected` if a node is reached twice while walking down
    pub fn descendants_of(&self, id: &NodeId) -> Result<Vec<&Node>, StoreError> {
        Ok(self
            .descendant_ids(id)?
            .iter()
            .filter_map(|d| self.nodes.get(d))
            .collect())
    }

    /// Ids of all descendants of `id`, in pre-order
    pub fn descendant_ids(&self, id: &NodeId) -> Result<Vec<NodeId>, StoreError> {
        if !self.contains(id) {
            return Err(StoreError::node_not_found(id));
        }

        let mut visited: HashSet<&NodeId> = HashSet::from([id]);
        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.child_ids(Some(id)).iter().rev().collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                return Err(StoreError::cycle_detected(current));
            }
            out.push(current.clone());
            stack.extend(self.child_ids(Some(current)).iter().rev());
        }

        Ok(out)
    }

    /// Distance from the root level (roots are depth 0)
    pub fn depth_of(&self, id: &NodeId) -> Result<usize, StoreError> {
        let mut node = self.get(id).ok_or_else(|| StoreError::node_not_found(id))?;
        let mut depth = 0;

        while let Some(parent_id) = &node.parent_id {
            depth += 1;
            if depth > self.nodes.len() {
                return Err(StoreError::cycle_detected(id));
            }
            node = self
                .get(parent_id)
                .ok_or_else(|| StoreError::dangling_parent(&node.id, parent_id))?;
        }

        Ok(depth)
    }

    /// Whether `ancestor` appears on the parent chain of `id`
    ///
    /// A node is not its own ancestor.
    pub fn is_ancestor(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = self.get(id).and_then(|n| n.parent_id.as_ref());
        let mut steps = 0;

        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.get(parent_id).and_then(|n| n.parent_id.as_ref());
        }

        false
    }

    /// Position of `id` among its siblings
    pub fn sibling_index(&self, id: &NodeId) -> Option<usize> {
        let node = self.get(id)?;
        self.child_ids(node.parent_id.as_ref())
            .iter()
            .position(|s| s == id)
    }

    /// Every node in document order: each root followed by its subtree
    pub fn preorder(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        let mut stack: Vec<&NodeId> = self.roots.iter().rev().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
            }
            stack.extend(self.child_ids(Some(id)).iter().rev());
        }

        out
    }

    /// Deep copy of the whole collection, parents before children
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.preorder().into_iter().cloned().collect())
    }

    /// Replace the entire collection with a snapshot's nodes
    ///
    /// Ids are taken verbatim. The id sequence never rewinds, so ids minted
    /// after a restore still never collide with ones issued before it.
    /// On error the store is left exactly as it was.
    pub fn replace_with(&mut self, snapshot: Snapshot) -> Result<(), StoreError> {
        let nodes = snapshot.into_nodes();
        let order: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();

        let mut map = HashMap::with_capacity(nodes.len());
        let mut max_sequence = 0;
        for node in nodes {
            if let Some(seq) = node.id.sequence() {
                max_sequence = max_sequence.max(seq);
            }
            if map.contains_key(&node.id) {
                return Err(StoreError::duplicate_id(&node.id));
            }
            map.insert(node.id.clone(), node);
        }

        let mut roots = Vec::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for id in &order {
            match map.get(id).and_then(|n| n.parent_id.as_ref()) {
                None => roots.push(id.clone()),
                Some(parent_id) => {
                    if !map.contains_key(parent_id) {
                        return Err(StoreError::dangling_parent(id, parent_id));
                    }
                    children
                        .entry(parent_id.clone())
                        .or_default()
                        .push(id.clone());
                }
            }
        }

        // Every chain must reach a root within `len` steps
        for id in &order {
            let mut current = map.get(id).and_then(|n| n.parent_id.as_ref());
            let mut steps = 0;
            while let Some(parent_id) = current {
                steps += 1;
                if steps > map.len() {
                    return Err(StoreError::cycle_detected(id));
                }
                current = map.get(parent_id).and_then(|n| n.parent_id.as_ref());
            }
        }

        self.nodes = map;
        self.roots = roots;
        self.children = children;
        self.next_sequence = self.next_sequence.max(max_sequence + 1);
        Ok(())
    }

    /// Issue a fresh id that has never been handed out by this store
    pub(crate) fn mint_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::from(format!("node_{}", self.next_sequence));
            self.next_sequence += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Insert a node under its `parent_id` at `index` (append when `None`
    /// or past the end). The parent must already exist.
    pub(crate) fn attach(&mut self, node: Node, index: Option<usize>) -> Result<NodeId, StoreError> {
        if self.contains(&node.id) {
            return Err(StoreError::duplicate_id(&node.id));
        }
        if let Some(parent_id) = &node.parent_id {
            if !self.contains(parent_id) {
                return Err(StoreError::dangling_parent(&node.id, parent_id));
            }
        }

        let id = node.id.clone();
        let siblings = self.siblings_mut(node.parent_id.as_ref());
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, id.clone());
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Create a subtree from an id-less copy, minting fresh ids throughout
    ///
    /// Returns the id of the subtree's root.
    pub fn materialize(
        &mut self,
        detached: &DetachedNode,
        parent: Option<&NodeId>,
        index: Option<usize>,
    ) -> Result<NodeId, StoreError> {
        if let Some(parent_id) = parent {
            if !self.contains(parent_id) {
                return Err(StoreError::node_not_found(parent_id));
            }
        }

        let root_id = self.attach_detached(detached, parent.cloned(), index);
        let mut pending: Vec<(&DetachedNode, NodeId)> = vec![(detached, root_id.clone())];

        while let Some((source, new_parent)) = pending.pop() {
            for child in &source.children {
                let child_id = self.attach_detached(child, Some(new_parent.clone()), None);
                pending.push((child, child_id));
            }
        }

        Ok(root_id)
    }

    fn attach_detached(
        &mut self,
        detached: &DetachedNode,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> NodeId {
        let id = self.mint_id();
        let node = Node {
            id: id.clone(),
            node_type: detached.node_type.clone(),
            fields: detached.fields.clone(),
            parent_id: parent,
            expanded: detached.expanded,
            custom_type_name: detached.custom_type_name.clone(),
        };
        let siblings = self.siblings_mut(node.parent_id.as_ref());
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, id.clone());
        self.nodes.insert(id.clone(), node);
        id
    }

    /// Id-less deep copy of the subtree rooted at `id`
    pub fn detach_copy(&self, id: &NodeId) -> Result<DetachedNode, StoreError> {
        // Walk once up front so a malformed index fails before any copying
        self.descendant_ids(id)?;
        let node = self.get(id).ok_or_else(|| StoreError::node_not_found(id))?;
        Ok(self.copy_subtree(node))
    }

    fn copy_subtree(&self, node: &Node) -> DetachedNode {
        DetachedNode {
            node_type: node.node_type.clone(),
            fields: node.fields.clone(),
            expanded: node.expanded,
            custom_type_name: node.custom_type_name.clone(),
            children: self
                .children_of(Some(&node.id))
                .into_iter()
                .map(|child| self.copy_subtree(child))
                .collect(),
        }
    }

    /// Remove `id` and all its descendants, returning the removed nodes
    /// (subtree root first, then pre-order)
    pub(crate) fn remove_subtree(&mut self, id: &NodeId) -> Result<Vec<Node>, StoreError> {
        let mut doomed = vec![id.clone()];
        doomed.extend(self.descendant_ids(id)?);

        let parent = self.get(id).and_then(|n| n.parent_id.clone());
        self.siblings_mut(parent.as_ref()).retain(|s| s != id);

        let removed = doomed
            .iter()
            .filter_map(|d| {
                self.children.remove(d);
                self.nodes.remove(d)
            })
            .collect();
        Ok(removed)
    }

    /// Move `id` under `new_parent` at `index` (append when `None`).
    /// Callers are responsible for rejecting cycles first.
    pub(crate) fn relink(
        &mut self,
        id: &NodeId,
        new_parent: Option<&NodeId>,
        index: Option<usize>,
    ) -> Result<(), StoreError> {
        let old_parent = self
            .get(id)
            .ok_or_else(|| StoreError::node_not_found(id))?
            .parent_id
            .clone();
        if let Some(parent_id) = new_parent {
            if !self.contains(parent_id) {
                return Err(StoreError::node_not_found(parent_id));
            }
        }

        self.siblings_mut(old_parent.as_ref()).retain(|s| s != id);
        let siblings = self.siblings_mut(new_parent);
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, id.clone());

        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = new_parent.cloned();
        }
        Ok(())
    }

    /// Swap two positions in one sibling list
    pub(crate) fn swap_siblings(&mut self, parent: Option<&NodeId>, a: usize, b: usize) {
        let siblings = self.siblings_mut(parent);
        if a < siblings.len() && b < siblings.len() {
            siblings.swap(a, b);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.children.clear();
    }

    fn siblings_mut(&mut self, parent: Option<&NodeId>) -> &mut Vec<NodeId> {
        match parent {
            None => &mut self.roots,
            Some(id) => self.children.entry(id.clone()).or_default(),
        }
    }
}
