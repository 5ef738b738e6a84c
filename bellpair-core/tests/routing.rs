//! End-to-end tests: generated topologies carry admission traffic.

use bellpair_core::{
    AppDescriptor, FlowDescriptor, UniformRateSampler, make_capacity_network_ppp,
};

#[test]
fn generated_topologies_admit_pairwise_flows() {
    let mut sampler = UniformRateSampler::new(4.0, 8.0, 11).expect("range must be valid");
    // A threshold wider than the grid diagonal makes every draw with at
    // least two points a complete graph.
    let (mut network, coordinates) =
        make_capacity_network_ppp(&mut sampler, 11, 8.0, 100.0, 150.0, 1.0)
            .expect("the factory must find a connected draw");
    network
        .set_measurement_probability(0.9)
        .expect("probability must be accepted");

    let node_count = network.num_nodes();
    assert_eq!(node_count, coordinates.len());
    assert!(node_count >= 2);

    let sweep = network.reachable_nodes(1, 1);
    for reached in sweep.per_source().values() {
        assert_eq!(reached.len(), node_count - 1);
    }
    assert_eq!(sweep.diameter(), 1);

    let rate = 1.0 / 64.0;
    let mut flows = Vec::new();
    for source in 0..node_count {
        for target in 0..node_count {
            if source != target {
                flows.push(FlowDescriptor::new(source, target, rate));
            }
        }
    }

    let before = network.total_capacity();
    network.route_flows(&mut flows).expect("routing must succeed");

    // Every pair is adjacent and every edge rate dwarfs the request, so
    // each flow takes its direct single-hop path at the net rate.
    for flow in &flows {
        assert_eq!(flow.path(), &[flow.target()]);
        assert_eq!(flow.gross_rate(), rate);
        assert_eq!(flow.path_searches(), 1);
    }
    let expected = before - flows.len() as f64 * rate;
    assert!((network.total_capacity() - expected).abs() < 1e-9);
}

#[test]
fn generated_topologies_serve_apps_until_saturation() {
    let mut sampler = UniformRateSampler::new(1.0, 2.0, 23).expect("range must be valid");
    let (mut network, _coordinates) =
        make_capacity_network_ppp(&mut sampler, 23, 6.0, 50.0, 75.0, 1.0)
            .expect("the factory must find a connected draw");

    let node_count = network.num_nodes();
    let peers: Vec<usize> = (1..node_count).collect();
    let mut apps = vec![AppDescriptor::new(0, peers, 1.0)];

    let before = network.total_capacity();
    network
        .route_apps(&mut apps, 0.25, 2)
        .expect("routing must succeed");

    assert!(apps[0].visits() > 0);
    assert!(apps[0].gross_rate() > 0.0);
    assert!(apps[0].net_rate() <= apps[0].gross_rate());
    assert!(apps[0].remaining_paths().is_empty());

    let reserved: f64 = apps[0]
        .allocations()
        .values()
        .flatten()
        .map(|allocation| allocation.hops().len() as f64 * allocation.gross_rate())
        .sum();
    assert!((before - network.total_capacity() - reserved).abs() < 1e-9);
}

#[test]
fn identical_seeds_rebuild_identical_networks() {
    let build = || {
        let mut sampler = UniformRateSampler::new(0.0, 10.0, 5).expect("range must be valid");
        make_capacity_network_ppp(&mut sampler, 5, 7.0, 80.0, 40.0, 0.7)
            .expect("the factory must find a connected draw")
    };
    let (left, left_coordinates) = build();
    let (right, right_coordinates) = build();
    assert_eq!(left_coordinates, right_coordinates);
    assert_eq!(left.weights(), right.weights());
    assert_eq!(left.num_nodes(), right.num_nodes());
}
