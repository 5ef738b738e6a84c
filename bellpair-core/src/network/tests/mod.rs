//! Unit tests for the capacity network.

mod graph;

use super::{CapacityNetwork, NodeId};

//   /--> 1 --> 2 -+
//  /              v
// 0               3   all weights are 4, except 0->4 which is 1
//  \              ^
//   \---> 4 ------+
pub(crate) fn ladder_weights() -> Vec<(NodeId, NodeId, f64)> {
    vec![
        (0, 1, 4.0),
        (1, 2, 4.0),
        (2, 3, 4.0),
        (0, 4, 1.0),
        (4, 3, 4.0),
    ]
}

pub(crate) fn ladder() -> CapacityNetwork {
    CapacityNetwork::from_weighted_edges(ladder_weights()).expect("weights must be valid")
}

//
//  +----> 1 <----+ +---> 4 ----+
//  |             | |           |
//  |             v v           v
//  0              3            6 all weights are 1
//  |             ^ ^           ^
//  |             | |           |
//  +----> 2 <----+ +---> 5 ----+
//
pub(crate) fn braid_weights() -> Vec<(NodeId, NodeId, f64)> {
    vec![
        (0, 1, 1.0),
        (0, 2, 1.0),
        (1, 3, 1.0),
        (2, 3, 1.0),
        (3, 1, 1.0),
        (3, 2, 1.0),
        (3, 4, 1.0),
        (3, 5, 1.0),
        (4, 3, 1.0),
        (4, 6, 1.0),
        (5, 3, 1.0),
        (5, 6, 1.0),
    ]
}

pub(crate) fn braid() -> CapacityNetwork {
    CapacityNetwork::from_weighted_edges(braid_weights()).expect("weights must be valid")
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
