//! Shared helpers for integration tests

use smartmsg_core::models::{DetachedNode, Field};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness (`RUST_LOG` to adjust)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A three-level POCT1-A observation used by several tests
#[allow(dead_code)]
pub fn observation_tree() -> DetachedNode {
    DetachedNode::new("OBS.R01", vec![]).with_children(vec![
        DetachedNode::new("HDR", vec![]).with_children(vec![DetachedNode::new(
            "HDR.control_id",
            vec![Field::keyed("V", "MSG001")],
        )]),
        DetachedNode::new("SVC", vec![]).with_children(vec![
            DetachedNode::new("SVC.role_cd", vec![Field::keyed("V", "PAT")]),
            DetachedNode::new("OBS", vec![]).with_children(vec![DetachedNode::new(
                "OBS.value",
                vec![Field::keyed("V", "95"), Field::keyed("U", "mg/dL")],
            )]),
        ]),
    ])
}
