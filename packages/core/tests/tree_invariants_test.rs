//! Integration tests for structural invariants of the node tree
//!
//! Tests cover:
//! - Re-parent cycle prevention for every ancestor/descendant pair
//! - Cascading delete with no orphans left behind
//! - POCT1-A hierarchy fallback for unmapped parents
//! - Snapshot restore validation

mod common;

use anyhow::Result;
use common::{init_tracing, observation_tree};
use smartmsg_core::hierarchy::{vocabulary, HierarchyResolver};
use smartmsg_core::models::{MessageFormat, Node, NodeId, Snapshot};
use smartmsg_core::operations::{OperationError, TreeOperations};
use smartmsg_core::store::{NodeStore, StoreError};
use std::collections::HashSet;

fn observation_store() -> Result<NodeStore> {
    let mut store = NodeStore::new();
    store.materialize(&observation_tree(), None, None)?;
    Ok(store)
}

fn parent_links(store: &NodeStore) -> Vec<(NodeId, Option<NodeId>)> {
    let mut links: Vec<_> = store
        .preorder()
        .into_iter()
        .map(|n| (n.id.clone(), n.parent_id.clone()))
        .collect();
    links.sort();
    links
}

#[test]
fn test_reparent_under_own_subtree_is_rejected() -> Result<()> {
    init_tracing();
    let mut store = observation_store()?;
    let before = parent_links(&store);
    let ids: Vec<NodeId> = store.preorder().into_iter().map(|n| n.id.clone()).collect();

    for a in &ids {
        let mut targets = store.descendant_ids(a)?;
        targets.push(a.clone());

        for b in &targets {
            let err = TreeOperations::new(&mut store)
                .reparent(a, Some(b), None)
                .unwrap_err();
            assert_eq!(err, OperationError::circular_reference(a, b));
            assert_eq!(parent_links(&store), before, "{a} under {b}");
        }
    }
    Ok(())
}

#[test]
fn test_reparent_outside_subtree_succeeds() -> Result<()> {
    let mut store = observation_store()?;
    let root = store.root_nodes()[0].id.clone();
    let hdr = store.child_ids(Some(&root))[0].clone();
    let svc = store.child_ids(Some(&root))[1].clone();

    TreeOperations::new(&mut store).reparent(&hdr, Some(&svc), Some(0))?;
    assert_eq!(store.child_ids(Some(&svc))[0], hdr);
    assert_eq!(store.depth_of(&hdr)?, 2);
    assert!(store.is_ancestor(&svc, &hdr));
    Ok(())
}

#[test]
fn test_cascade_delete_leaves_no_orphans() -> Result<()> {
    let original = observation_store()?;
    let ids: Vec<NodeId> = original.preorder().into_iter().map(|n| n.id.clone()).collect();

    for id in &ids {
        let mut store = observation_store()?;
        let mut expected: HashSet<NodeId> = store.descendant_ids(id)?.into_iter().collect();
        expected.insert(id.clone());

        let removed: HashSet<NodeId> = TreeOperations::new(&mut store).delete(id)?.into_iter().collect();
        assert_eq!(removed, expected);
        assert_eq!(store.len(), ids.len() - expected.len());

        for node in store.preorder() {
            assert!(!removed.contains(&node.id));
            if let Some(parent) = &node.parent_id {
                assert!(store.contains(parent), "orphan {}", node.id);
            }
        }
    }
    Ok(())
}

#[test]
fn test_poct1a_unmapped_parent_falls_back_to_every_non_root_type() {
    let resolver = HierarchyResolver::new();
    let allowed = resolver.allowed_child_types(MessageFormat::Poct1a, Some("ZZZ.vendor_segment"));

    let expected: Vec<String> = vocabulary::poct1a()
        .iter()
        .filter(|t| !t.is_root)
        .map(|t| t.value.clone())
        .collect();
    assert!(!allowed.is_empty());
    assert_eq!(allowed, expected);
    assert!(!allowed.iter().any(|t| t == "OBS.R01"));
}

#[test]
fn test_restore_rejects_broken_snapshots() -> Result<()> {
    let mut store = observation_store()?;
    let good = store.snapshot();

    let mut looped = good.clone().into_nodes();
    let first = looped[0].id.clone();
    let last = looped[looped.len() - 1].id.clone();
    looped[0].parent_id = Some(last);
    assert!(matches!(
        store.replace_with(Snapshot::new(looped)),
        Err(StoreError::CycleDetected { .. })
    ));

    let mut dangling = good.clone().into_nodes();
    dangling.push(Node::new(
        NodeId::from("node_900"),
        "NTE".to_string(),
        vec![],
        Some(NodeId::from("node_901")),
    ));
    assert!(matches!(
        store.replace_with(Snapshot::new(dangling)),
        Err(StoreError::DanglingParent { .. })
    ));

    assert_eq!(store.snapshot(), good);
    assert!(store.contains(&first));
    Ok(())
}
