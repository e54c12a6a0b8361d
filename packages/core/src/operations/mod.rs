//! Tree Operations
//!
//! Structural and field edits over a [`NodeStore`]. Every operation checks
//! that the ids it is given exist before touching anything, so a refused
//! edit leaves the store exactly as it was.
//!
//! Operations that may turn out to change nothing (a move at a sibling
//! boundary, setting a type to its current value) report whether they did
//! anything. The document layer uses that to avoid recording empty history
//! entries.
//!
//! Node types are not checked against the hierarchy resolver here: the
//! resolver tells an editor what to offer, it does not veto inserts.

mod error;

pub use error::OperationError;

use crate::models::{DetachedNode, Field, FieldName, MessageFormat, Node, NodeId};
use crate::store::NodeStore;
use tracing::{debug, warn};

pub type OperationResult<T> = Result<T, OperationError>;

/// Sibling reorder direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Parameters for inserting a node
///
/// # Examples
///
/// ```rust
/// use smartmsg_core::models::Field;
/// use smartmsg_core::operations::InsertParams;
///
/// let params = InsertParams::new("OBX")
///     .with_fields(vec![Field::positional(1, "1")]);
/// assert!(params.parent_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InsertParams {
    pub node_type: String,
    pub fields: Vec<Field>,
    /// Owning node, `None` for a root
    pub parent_id: Option<NodeId>,
    /// Sibling to insert after; appends when absent or not a sibling
    pub insert_after: Option<NodeId>,
}

impl InsertParams {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            fields: Vec::new(),
            parent_id: None,
            insert_after: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn under(mut self, parent_id: &NodeId) -> Self {
        self.parent_id = Some(parent_id.clone());
        self
    }

    pub fn after(mut self, sibling_id: &NodeId) -> Self {
        self.insert_after = Some(sibling_id.clone());
        self
    }
}

/// Edit surface over one store
pub struct TreeOperations<'a> {
    store: &'a mut NodeStore,
}

impl<'a> TreeOperations<'a> {
    pub fn new(store: &'a mut NodeStore) -> Self {
        Self { store }
    }

    /// Insert a new node and return its id
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if the parent does not exist.
    pub fn insert(&mut self, params: InsertParams) -> OperationResult<NodeId> {
        let parent = params.parent_id.as_ref();
        self.require_parent(parent)?;

        let index = params.insert_after.as_ref().and_then(|sibling| {
            self.store
                .child_ids(parent)
                .iter()
                .position(|s| s == sibling)
                .map(|i| i + 1)
        });

        let id = self.store.mint_id();
        let node = Node::new(id, params.node_type, params.fields, params.parent_id);
        let id = self.store.attach(node, index)?;

        debug!(node_id = %id, "Inserted node");
        Ok(id)
    }

    /// Delete a node and all of its descendants
    ///
    /// Returns the removed ids, the node itself first. The subtree is
    /// walked in full before anything is removed, so a corrupt subtree is
    /// rejected without a partial delete.
    pub fn delete(&mut self, id: &NodeId) -> OperationResult<Vec<NodeId>> {
        self.require(id)?;
        let removed: Vec<NodeId> = self
            .store
            .remove_subtree(id)?
            .into_iter()
            .map(|node| node.id)
            .collect();

        debug!(node_id = %id, removed = removed.len(), "Deleted subtree");
        Ok(removed)
    }

    /// Swap a node with its neighbouring sibling
    ///
    /// Returns `false` when the node is already first (moving up) or last
    /// (moving down).
    pub fn move_node(&mut self, id: &NodeId, direction: Direction) -> OperationResult<bool> {
        let parent = self.require(id)?.parent_id.clone();
        let siblings = self.store.child_ids(parent.as_ref());
        let Some(current) = siblings.iter().position(|s| s == id) else {
            return Err(OperationError::node_not_found(id));
        };

        let target = match direction {
            Direction::Up if current > 0 => current - 1,
            Direction::Down if current + 1 < siblings.len() => current + 1,
            _ => return Ok(false),
        };

        self.store.swap_siblings(parent.as_ref(), current, target);
        debug!(node_id = %id, ?direction, "Moved node");
        Ok(true)
    }

    /// Move a node (with its subtree) under a new parent
    ///
    /// `position` is the index among the new parent's children once the
    /// node has been detached; `None` appends.
    ///
    /// # Errors
    ///
    /// - `CircularReference` if `new_parent` is the node or one of its
    ///   descendants
    /// - `NodeNotFound` if either id is unknown
    pub fn reparent(
        &mut self,
        id: &NodeId,
        new_parent: Option<&NodeId>,
        position: Option<usize>,
    ) -> OperationResult<()> {
        self.require(id)?;
        self.require_parent(new_parent)?;

        if let Some(target) = new_parent {
            if target == id || self.store.descendant_ids(id)?.contains(target) {
                warn!(node_id = %id, target_id = %target, "Rejected circular re-parent");
                return Err(OperationError::circular_reference(id, target));
            }
        }

        self.store.relink(id, new_parent, position)?;
        debug!(node_id = %id, parent_id = ?new_parent.map(NodeId::as_str), "Re-parented node");
        Ok(())
    }

    /// Deep-copy a subtree with fresh ids, placed right after the original
    pub fn duplicate(&mut self, id: &NodeId) -> OperationResult<NodeId> {
        let parent = self.require(id)?.parent_id.clone();
        let copy = self.store.detach_copy(id)?;
        let index = self.store.sibling_index(id).map(|i| i + 1);
        let new_id = self.store.materialize(&copy, parent.as_ref(), index)?;

        debug!(node_id = %id, copy_id = %new_id, nodes = copy.subtree_len(), "Duplicated subtree");
        Ok(new_id)
    }

    /// Id-less structural copy of a subtree, suitable for a clipboard
    pub fn copy(&self, id: &NodeId) -> OperationResult<DetachedNode> {
        self.require(id)?;
        Ok(self.store.detach_copy(id)?)
    }

    /// Materialize a copied subtree under `parent` (`None` = root), minting
    /// fresh ids for every node
    pub fn paste(
        &mut self,
        content: &DetachedNode,
        parent: Option<&NodeId>,
    ) -> OperationResult<NodeId> {
        self.require_parent(parent)?;
        let id = self.store.materialize(content, parent, None)?;

        debug!(node_id = %id, nodes = content.subtree_len(), "Pasted subtree");
        Ok(id)
    }

    /// Change a node's type, dropping any custom type name
    pub fn set_type(&mut self, id: &NodeId, node_type: &str) -> OperationResult<bool> {
        let node = self.require_mut(id)?;
        if node.node_type == node_type && node.custom_type_name.is_none() {
            return Ok(false);
        }
        node.node_type = node_type.to_string();
        node.custom_type_name = None;
        Ok(true)
    }

    /// Give a node a user-defined type name
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the trimmed name is empty.
    pub fn set_custom_type(&mut self, id: &NodeId, name: &str) -> OperationResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OperationError::invalid_operation(
                "custom type name must not be empty",
            ));
        }

        let node = self.require_mut(id)?;
        if node.node_type == name && node.custom_type_name.as_deref() == Some(name) {
            return Ok(false);
        }
        node.node_type = name.to_string();
        node.custom_type_name = Some(name.to_string());
        Ok(true)
    }

    /// Overwrite the field at `index`; an index past the end appends
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the name is a number past
    /// [`FieldName::MAX_POSITION`].
    pub fn set_field(&mut self, id: &NodeId, index: usize, field: Field) -> OperationResult<bool> {
        if field.name.is_out_of_range() {
            warn!(node_id = %id, name = %field.name, "Rejected out-of-range field position");
            return Err(OperationError::invalid_operation(format!(
                "field position {} exceeds the maximum of {}",
                field.name,
                FieldName::MAX_POSITION
            )));
        }
        let node = self.require_mut(id)?;
        match node.fields.get_mut(index) {
            Some(existing) if *existing == field => Ok(false),
            Some(existing) => {
                *existing = field;
                Ok(true)
            }
            None => {
                node.fields.push(field);
                Ok(true)
            }
        }
    }

    /// Append an empty field named the way `format` expects
    ///
    /// Positional formats get the next position (`len + 1`); XML formats
    /// get a bare `@` placeholder for the user to rename. Returns the new
    /// field's index.
    pub fn add_field(&mut self, id: &NodeId, format: MessageFormat) -> OperationResult<usize> {
        let node = self.require_mut(id)?;
        let name = if format.is_hierarchical() {
            FieldName::from("@")
        } else {
            FieldName::Position(node.fields.len() as u32 + 1)
        };
        node.fields.push(Field::new(name, ""));
        Ok(node.fields.len() - 1)
    }

    pub fn remove_field(&mut self, id: &NodeId, index: usize) -> OperationResult<Field> {
        let node = self.require_mut(id)?;
        if index >= node.fields.len() {
            return Err(OperationError::field_not_found(id, index));
        }
        Ok(node.fields.remove(index))
    }

    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) -> OperationResult<()> {
        self.require_mut(id)?.expanded = expanded;
        Ok(())
    }

    pub fn set_all_expanded(&mut self, expanded: bool) {
        for node in self.store.iter_mut() {
            node.expanded = expanded;
        }
    }

    /// Remove every node, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.store.len();
        self.store.clear();
        debug!(removed, "Cleared tree");
        removed
    }

    fn require(&self, id: &NodeId) -> OperationResult<&Node> {
        self.store
            .get(id)
            .ok_or_else(|| OperationError::node_not_found(id))
    }

    fn require_mut(&mut self, id: &NodeId) -> OperationResult<&mut Node> {
        self.store
            .get_mut(id)
            .ok_or_else(|| OperationError::node_not_found(id))
    }

    fn require_parent(&self, parent: Option<&NodeId>) -> OperationResult<()> {
        match parent {
            Some(parent_id) => self.require(parent_id).map(|_| ()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Snapshot;

    /// OBS.R01 ─┬─ HDR ── HDR.control_id
    ///          └─ SVC ─┬─ OBS ── OBS.value
    ///                  └─ OPR
    fn sample() -> (NodeStore, Vec<NodeId>) {
        let mut store = NodeStore::new();
        let ids = {
            let mut ops = TreeOperations::new(&mut store);
            let root = ops.insert(InsertParams::new("OBS.R01")).unwrap();
            let hdr = ops.insert(InsertParams::new("HDR").under(&root)).unwrap();
            let ctl = ops
                .insert(
                    InsertParams::new("HDR.control_id")
                        .under(&hdr)
                        .with_fields(vec![Field::keyed("V", "MSG001")]),
                )
                .unwrap();
            let svc = ops.insert(InsertParams::new("SVC").under(&root)).unwrap();
            let obs = ops.insert(InsertParams::new("OBS").under(&svc)).unwrap();
            let val = ops.insert(InsertParams::new("OBS.value").under(&obs)).unwrap();
            let opr = ops.insert(InsertParams::new("OPR").under(&svc)).unwrap();
            vec![root, hdr, ctl, svc, obs, val, opr]
        };
        (store, ids)
    }

    fn child_types(store: &NodeStore, parent: Option<&NodeId>) -> Vec<String> {
        store
            .children_of(parent)
            .into_iter()
            .map(|n| n.node_type.clone())
            .collect()
    }

    #[test]
    fn test_insert_after_sibling() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        ops.insert(InsertParams::new("NTE").under(&ids[3]).after(&ids[4]))
            .unwrap();
        assert_eq!(child_types(&store, Some(&ids[3])), vec!["OBS", "NTE", "OPR"]);
    }

    #[test]
    fn test_insert_after_non_sibling_appends() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        ops.insert(InsertParams::new("NTE").under(&ids[3]).after(&ids[1]))
            .unwrap();
        assert_eq!(child_types(&store, Some(&ids[3])), vec!["OBS", "OPR", "NTE"]);
    }

    #[test]
    fn test_insert_accepts_out_of_vocabulary_type() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        let id = ops
            .insert(InsertParams::new("NOT_A_SEGMENT").under(&ids[5]))
            .unwrap();
        assert_eq!(store.get(&id).unwrap().parent_id.as_ref(), Some(&ids[5]));
    }

    #[test]
    fn test_insert_under_missing_parent() {
        let (mut store, _) = sample();
        let before = store.snapshot();
        let err = TreeOperations::new(&mut store)
            .insert(InsertParams::new("HDR").under(&NodeId::from("gone")))
            .unwrap_err();
        assert!(matches!(err, OperationError::NodeNotFound { .. }));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_delete_cascades() {
        let (mut store, ids) = sample();
        let removed = TreeOperations::new(&mut store).delete(&ids[3]).unwrap();
        assert_eq!(removed, vec![ids[3].clone(), ids[4].clone(), ids[5].clone(), ids[6].clone()]);
        assert_eq!(store.len(), 3);
        assert!(store
            .snapshot()
            .nodes()
            .iter()
            .all(|n| n.parent_id.as_ref().map_or(true, |p| !removed.contains(p))));
    }

    #[test]
    fn test_move_within_siblings() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        assert!(ops.move_node(&ids[6], Direction::Up).unwrap());
        assert!(!ops.move_node(&ids[6], Direction::Up).unwrap());
        assert!(!ops.move_node(&ids[0], Direction::Down).unwrap());
        assert_eq!(child_types(&store, Some(&ids[3])), vec!["OPR", "OBS"]);
    }

    #[test]
    fn test_reparent_rejects_self_and_descendants() {
        let (mut store, ids) = sample();
        let before = store.snapshot();
        let mut ops = TreeOperations::new(&mut store);

        for target in [&ids[3], &ids[4], &ids[5], &ids[6]] {
            let err = ops.reparent(&ids[3], Some(target), None).unwrap_err();
            assert!(matches!(err, OperationError::CircularReference { .. }));
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_reparent_moves_subtree() {
        let (mut store, ids) = sample();
        TreeOperations::new(&mut store)
            .reparent(&ids[4], Some(&ids[1]), Some(0))
            .unwrap();
        assert_eq!(child_types(&store, Some(&ids[1])), vec!["OBS", "HDR.control_id"]);
        assert_eq!(store.depth_of(&ids[5]).unwrap(), 3);
    }

    #[test]
    fn test_reparent_to_root() {
        let (mut store, ids) = sample();
        TreeOperations::new(&mut store)
            .reparent(&ids[6], None, None)
            .unwrap();
        assert_eq!(store.root_nodes().len(), 2);
        assert!(store.get(&ids[6]).unwrap().is_root());
    }

    #[test]
    fn test_duplicate_places_copy_after_original() {
        let (mut store, ids) = sample();
        let copy = TreeOperations::new(&mut store).duplicate(&ids[4]).unwrap();

        assert_eq!(child_types(&store, Some(&ids[3])), vec!["OBS", "OBS", "OPR"]);
        assert_ne!(copy, ids[4]);
        let copy_children = store.children_of(Some(&copy));
        assert_eq!(copy_children.len(), 1);
        assert_ne!(copy_children[0].id, ids[5]);
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn test_pastes_are_independent() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        let clip = ops.copy(&ids[1]).unwrap();

        let first = ops.paste(&clip, Some(&ids[3])).unwrap();
        let second = ops.paste(&clip, None).unwrap();

        let first_child = store.children_of(Some(&first))[0].id.clone();
        TreeOperations::new(&mut store)
            .set_field(&first_child, 0, Field::keyed("V", "CHANGED"))
            .unwrap();

        let second_child = &store.children_of(Some(&second))[0];
        assert_eq!(second_child.fields[0].value, "MSG001");
        assert_eq!(clip.children[0].fields[0].value, "MSG001");
    }

    #[test]
    fn test_custom_type() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        assert!(ops.set_custom_type(&ids[6], "  ZVENDOR ").unwrap());
        assert!(!ops.set_custom_type(&ids[6], "ZVENDOR").unwrap());
        assert!(matches!(
            ops.set_custom_type(&ids[6], "   "),
            Err(OperationError::InvalidOperation { .. })
        ));

        let node = store.get(&ids[6]).unwrap();
        assert_eq!(node.node_type, "ZVENDOR");
        assert_eq!(node.custom_type_name.as_deref(), Some("ZVENDOR"));

        assert!(TreeOperations::new(&mut store).set_type(&ids[6], "OPR").unwrap());
        assert!(store.get(&ids[6]).unwrap().custom_type_name.is_none());
    }

    #[test]
    fn test_field_editing() {
        let mut store = NodeStore::from_snapshot(Snapshot::new(vec![Node::new(
            NodeId::from("r"),
            "R".to_string(),
            vec![Field::positional(1, "1")],
            None,
        )]))
        .unwrap();
        let id = NodeId::from("r");
        let mut ops = TreeOperations::new(&mut store);

        assert_eq!(ops.add_field(&id, MessageFormat::Astm).unwrap(), 1);
        assert!(ops.set_field(&id, 1, Field::positional(2, "GLU")).unwrap());
        assert!(!ops.set_field(&id, 1, Field::positional(2, "GLU")).unwrap());
        assert!(ops.set_field(&id, 10, Field::positional(4, "100")).unwrap());
        assert_eq!(ops.add_field(&id, MessageFormat::XmlRequest).unwrap(), 3);
        assert!(matches!(
            ops.remove_field(&id, 9),
            Err(OperationError::FieldNotFound { index: 9, .. })
        ));
        assert_eq!(ops.remove_field(&id, 0).unwrap(), Field::positional(1, "1"));

        let names: Vec<String> = store
            .get(&id)
            .unwrap()
            .fields
            .iter()
            .map(|f| f.name.to_string())
            .collect();
        assert_eq!(names, vec!["2", "4", "@"]);
    }

    #[test]
    fn test_set_field_rejects_huge_positions() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);

        for name in [
            FieldName::from("18446744073709551615"),
            FieldName::Position(u32::MAX),
        ] {
            let err = ops.set_field(&ids[0], 0, Field::new(name, "x")).unwrap_err();
            assert!(matches!(err, OperationError::InvalidOperation { .. }));
        }
        assert!(store.get(&ids[0]).unwrap().fields.is_empty());

        let mut ops = TreeOperations::new(&mut store);
        assert!(ops.set_field(&ids[0], 0, Field::positional(9999, "x")).unwrap());
    }

    #[test]
    fn test_expand_and_clear() {
        let (mut store, ids) = sample();
        let mut ops = TreeOperations::new(&mut store);
        ops.set_all_expanded(false);
        ops.set_expanded(&ids[0], true).unwrap();
        assert_eq!(ops.clear(), 7);
        assert!(store.is_empty());
    }

    #[test]
    fn test_stale_ids_are_errors_not_panics() {
        let (mut store, _) = sample();
        let ghost = NodeId::from("ghost");
        let mut ops = TreeOperations::new(&mut store);
        assert!(ops.delete(&ghost).is_err());
        assert!(ops.move_node(&ghost, Direction::Up).is_err());
        assert!(ops.duplicate(&ghost).is_err());
        assert!(ops.copy(&ghost).is_err());
        assert!(ops.set_type(&ghost, "H").is_err());
        assert!(ops.set_expanded(&ghost, false).is_err());
        assert_eq!(store.len(), 7);
    }
}
