//! Construction, query, DOT export, and capacity adjustment tests.

use std::collections::BTreeSet;

use rstest::rstest;

use crate::{CapacityNetwork, FlowDescriptor, FnSampler, NetworkError, UniformRateSampler};

use super::{assert_close, ladder, ladder_weights};

#[test]
fn graph_properties_match_the_edge_list() {
    let network = ladder();
    assert_eq!(network.num_nodes(), 5);
    assert_eq!(network.num_edges(), 5);
    assert_eq!(network.total_capacity(), 17.0);
    assert_eq!(network.in_degree(), (0, 2));
    assert_eq!(network.out_degree(), (0, 2));
    assert_eq!(network.node_capacities(), vec![5.0, 4.0, 4.0, 0.0, 4.0]);
    assert_eq!(network.measurement_probability(), 1.0);
}

#[test]
fn weights_preserve_insertion_order() {
    let network = ladder();
    assert_eq!(network.weights(), ladder_weights());
}

#[test]
fn measurement_probability_validates_its_range() {
    let mut network = ladder();
    assert_eq!(network.measurement_probability(), 1.0);
    network
        .set_measurement_probability(0.314)
        .expect("in-range probability must be accepted");
    assert_eq!(network.measurement_probability(), 0.314);

    for bad in [-0.5, 0.0, 2.0, f64::NAN] {
        assert!(matches!(
            network.set_measurement_probability(bad),
            Err(NetworkError::InvalidMeasurementProbability { .. })
        ));
        assert_eq!(network.measurement_probability(), 0.314);
    }
}

#[rstest]
#[case::single_directed(false, 5)]
#[case::bidirectional(true, 10)]
fn sampled_construction_draws_one_weight_per_edge(
    #[case] bidirectional: bool,
    #[case] expected_edges: usize,
) {
    let pairs = [(0, 1), (1, 2), (2, 3), (0, 4), (4, 3)];
    let mut sampler =
        UniformRateSampler::new(0.0, 100.0, 1234).expect("range must be valid");
    let network = CapacityNetwork::from_edges(pairs, &mut sampler, bidirectional)
        .expect("sampled construction must succeed");

    assert_eq!(network.num_edges(), expected_edges);
    let weights = network.weights();
    for &(source, target, weight) in &weights {
        assert!(
            (0.0..=100.0).contains(&weight),
            "({source}, {target}) got weight {weight}"
        );
    }
    // Reverse edges draw independently, so repeated values stay unlikely.
    let distinct: BTreeSet<u64> = weights.iter().map(|w| w.2.to_bits()).collect();
    assert_eq!(distinct.len(), expected_edges);
}

#[test]
fn sampled_construction_orders_reverse_after_forward() {
    let mut rate = 0.0;
    let mut sampler = FnSampler::new(move || {
        rate += 1.0;
        rate
    });
    let network = CapacityNetwork::from_edges([(0, 1), (1, 2)], &mut sampler, true)
        .expect("sampled construction must succeed");
    assert_eq!(
        network.weights(),
        vec![(0, 1, 1.0), (1, 0, 2.0), (1, 2, 3.0), (2, 1, 4.0)]
    );
}

#[test]
fn construction_rejects_invalid_weights() {
    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            CapacityNetwork::from_weighted_edges([(0, 1, bad)]),
            Err(NetworkError::InvalidWeight { .. })
        ));
    }

    let mut sampler = FnSampler::new(|| -2.0);
    assert!(matches!(
        CapacityNetwork::from_edges([(0, 1)], &mut sampler, false),
        Err(NetworkError::InvalidWeight { .. })
    ));
}

#[test]
fn empty_networks_are_allowed() {
    let network = CapacityNetwork::from_weighted_edges([]).expect("an empty list must build");
    assert_eq!(network.num_nodes(), 0);
    assert_eq!(network.num_edges(), 0);
    assert_eq!(network.total_capacity(), 0.0);
    assert_eq!(network.in_degree(), (0, 0));
    assert_eq!(network.out_degree(), (0, 0));
}

#[test]
fn dot_export_labels_edges_with_residuals() {
    let network = ladder();
    let mut rendered = Vec::new();
    network
        .write_dot(&mut rendered)
        .expect("writing to a vector must succeed");
    let rendered = String::from_utf8(rendered).expect("DOT output must be UTF-8");

    assert!(rendered.starts_with("digraph G {"));
    assert!(rendered.ends_with("}\n"));
    for line in ["0;", "4;", "0->1 [label=\"4\"];", "0->4 [label=\"1\"];"] {
        assert!(rendered.contains(line), "missing `{line}` in:\n{rendered}");
    }
}

#[test]
fn dot_export_writes_files() {
    let directory = tempfile::tempdir().expect("a temporary directory must be available");
    let path = directory.path().join("network.dot");
    ladder().to_dot(&path).expect("the export must succeed");
    let contents = std::fs::read_to_string(&path).expect("the file must exist");
    assert!(contents.contains("4->3 [label=\"4\"];"));
}

#[test]
fn dot_export_surfaces_io_failures() {
    let result = ladder().to_dot("missing-directory/network.dot");
    assert!(matches!(result, Err(NetworkError::Io { .. })));
}

#[test]
fn capacity_restoration_round_trips() {
    let mut network = ladder();
    network
        .set_measurement_probability(0.5)
        .expect("probability must be accepted");
    let initial = network.total_capacity();

    let mut flows = vec![FlowDescriptor::new(0, 3, 1.0)];
    network.route_flows(&mut flows).expect("routing must succeed");
    assert_eq!(flows[0].path(), &[1, 2, 3]);
    assert_eq!(flows[0].gross_rate(), 4.0);
    assert_eq!(
        network.total_capacity(),
        initial - flows[0].path().len() as f64 * flows[0].gross_rate()
    );

    network
        .add_capacity_to_path(0, &[1, 2, 3], flows[0].gross_rate())
        .expect("restoring along the admitted path must succeed");
    assert_eq!(network.total_capacity(), initial);
}

#[test]
fn capacity_restoration_supports_path_suffixes() {
    let mut network = ladder();
    network
        .set_measurement_probability(0.5)
        .expect("probability must be accepted");
    let initial = network.total_capacity();

    let mut flows = vec![FlowDescriptor::new(0, 3, 1.0)];
    network.route_flows(&mut flows).expect("routing must succeed");
    network
        .add_capacity_to_path(2, &[3], flows[0].gross_rate())
        .expect("restoring a suffix must succeed");
    assert_eq!(
        network.total_capacity(),
        initial - 2.0 * flows[0].gross_rate()
    );
}

#[test]
fn capacity_adjustment_validates_before_mutating() {
    let mut network = ladder();
    let before = network.weights();

    assert!(matches!(
        network.add_capacity_to_path(2, &[3], -10.0),
        Err(NetworkError::CapacityUnderflow { .. })
    ));
    assert!(matches!(
        network.add_capacity_to_path(1, &[0], 1.0),
        Err(NetworkError::MissingEdge {
            source_node: 1,
            target: 0
        })
    ));
    // The missing edge sits mid-path; nothing before it may commit.
    assert!(matches!(
        network.add_capacity_to_path(0, &[1, 0], 1.0),
        Err(NetworkError::MissingEdge { .. })
    ));
    assert!(matches!(
        network.add_capacity_to_path(0, &[9], 1.0),
        Err(NetworkError::NodeOutOfRange { node: 9, .. })
    ));
    assert!(matches!(
        network.add_capacity_to_path(0, &[1], f64::NAN),
        Err(NetworkError::NonFiniteDelta { .. })
    ));
    assert_eq!(network.weights(), before);

    network
        .add_capacity_to_path(0, &[1], 1.0)
        .expect("a single existing edge must accept capacity");
    assert_eq!(network.total_capacity(), 18.0);
}

#[test]
fn capacity_adjustment_accepts_exact_drains() {
    let mut network = ladder();
    network
        .add_capacity_to_path(0, &[4], -1.0)
        .expect("draining to zero must succeed");
    assert_close(network.total_capacity(), 16.0);
    assert_eq!(network.weights()[3], (0, 4, 0.0));
}
