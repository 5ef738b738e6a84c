//! Command definitions and execution for the bellpair CLI.

use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::info;

use bellpair_core::{
    CapacityNetwork, FlowDescriptor, NetworkError, UniformRateSampler,
    make_capacity_network_ppp,
};

/// Entanglement routing simulator.
#[derive(Debug, Parser)]
#[command(name = "bellpair", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Draw a connected Poisson point topology and print its properties.
    Generate(GenerateArgs),
    /// Draw a topology and admit a batch of random flow requests onto it.
    Flows(FlowsArgs),
}

/// Parameters shared by every topology-producing command.
#[derive(Debug, Args)]
pub struct TopologyArgs {
    /// Seed for the point process, link formation, and rate sampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Expected number of repeater nodes per draw.
    #[arg(long, default_value_t = 20.0)]
    pub mean_nodes: f64,
    /// Side length of the square deployment area.
    #[arg(long, default_value_t = 100.0)]
    pub grid_length: f64,
    /// Maximum distance at which two nodes can form a link.
    #[arg(long, default_value_t = 45.0)]
    pub threshold: f64,
    /// Probability that a candidate link is retained.
    #[arg(long, default_value_t = 0.8)]
    pub link_probability: f64,
    /// Lower bound of the per-link EPR generation rate.
    #[arg(long, default_value_t = 1.0)]
    pub min_rate: f64,
    /// Upper bound of the per-link EPR generation rate.
    #[arg(long, default_value_t = 10.0)]
    pub max_rate: f64,
    /// Probability that an entanglement swap succeeds, in (0, 1].
    #[arg(long)]
    pub measurement_probability: Option<f64>,
    /// Write the generated network to this file in Graphviz format.
    #[arg(long)]
    pub dot: Option<PathBuf>,
}

/// Arguments of the `generate` command.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,
}

/// Arguments of the `flows` command.
#[derive(Debug, Args)]
pub struct FlowsArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,
    /// Number of random source/destination requests to admit.
    #[arg(long, default_value_t = 10)]
    pub count: usize,
    /// End-to-end rate of every request.
    #[arg(long, default_value_t = 0.5)]
    pub net_rate: f64,
}

/// Errors surfaced by command execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// The core library rejected the request.
    #[error(transparent)]
    Core(#[from] NetworkError),
    /// Flow generation needs at least two nodes to pick endpoints from.
    #[error("cannot draw flow endpoints from a {nodes}-node network")]
    TooFewNodes {
        /// Number of nodes in the generated network.
        nodes: usize,
    },
}

/// Outcome of admitting a batch of flows.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowReport {
    /// Number of requests submitted.
    pub requested: usize,
    /// Number of requests that received a path.
    pub admitted: usize,
    /// Total rate reserved across all admitted paths.
    pub reserved: f64,
}

/// What a command produced, ready for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionSummary {
    /// Number of repeater nodes.
    pub nodes: usize,
    /// Number of directed links.
    pub edges: usize,
    /// Sum of residual capacities after execution.
    pub total_capacity: f64,
    /// Minimum and maximum in-degree.
    pub in_degree: (usize, usize),
    /// Minimum and maximum out-degree.
    pub out_degree: (usize, usize),
    /// Largest hop distance between any connected pair.
    pub diameter: usize,
    /// Present when the command admitted flows.
    pub flows: Option<FlowReport>,
}

/// Executes a parsed command.
///
/// # Errors
/// Returns [`CliError`] when topology generation, validation, or DOT
/// export fails.
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Generate(args) => {
            let network = build_network(&args.topology)?;
            Ok(summarise(&network, None))
        }
        Command::Flows(args) => {
            let mut network = build_network(&args.topology)?;
            let report = admit_random_flows(&mut network, &args)?;
            Ok(summarise(&network, Some(report)))
        }
    }
}

/// Renders `summary` as plain `key: value` lines.
///
/// # Errors
/// Propagates failures of the underlying writer.
pub fn render_summary<W: io::Write>(summary: &ExecutionSummary, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "nodes: {}", summary.nodes)?;
    writeln!(writer, "edges: {}", summary.edges)?;
    writeln!(writer, "total capacity: {}", summary.total_capacity)?;
    writeln!(
        writer,
        "in-degree: {}..{}",
        summary.in_degree.0, summary.in_degree.1
    )?;
    writeln!(
        writer,
        "out-degree: {}..{}",
        summary.out_degree.0, summary.out_degree.1
    )?;
    writeln!(writer, "diameter: {}", summary.diameter)?;
    if let Some(flows) = &summary.flows {
        writeln!(writer, "flows requested: {}", flows.requested)?;
        writeln!(writer, "flows admitted: {}", flows.admitted)?;
        writeln!(writer, "rate reserved: {}", flows.reserved)?;
    }
    Ok(())
}

fn build_network(args: &TopologyArgs) -> Result<CapacityNetwork, CliError> {
    let mut sampler = UniformRateSampler::new(args.min_rate, args.max_rate, args.seed)?;
    let (mut network, coordinates) = make_capacity_network_ppp(
        &mut sampler,
        args.seed,
        args.mean_nodes,
        args.grid_length,
        args.threshold,
        args.link_probability,
    )?;
    if let Some(probability) = args.measurement_probability {
        network.set_measurement_probability(probability)?;
    }
    info!(
        nodes = network.num_nodes(),
        edges = network.num_edges(),
        points = coordinates.len(),
        "generated connected topology"
    );
    if let Some(path) = &args.dot {
        network.to_dot(path)?;
        info!(path = %path.display(), "wrote DOT export");
    }
    Ok(network)
}

fn admit_random_flows(
    network: &mut CapacityNetwork,
    args: &FlowsArgs,
) -> Result<FlowReport, CliError> {
    let nodes = network.num_nodes();
    if nodes < 2 {
        return Err(CliError::TooFewNodes { nodes });
    }

    let mut rng = SmallRng::seed_from_u64(args.topology.seed);
    let mut flows = Vec::with_capacity(args.count);
    while flows.len() < args.count {
        let source = rng.gen_range(0..nodes);
        let target = rng.gen_range(0..nodes);
        if source != target {
            flows.push(FlowDescriptor::new(source, target, args.net_rate));
        }
    }
    network.route_flows(&mut flows)?;

    let admitted = flows.iter().filter(|flow| !flow.path().is_empty()).count();
    let reserved = flows
        .iter()
        .map(|flow| flow.path().len() as f64 * flow.gross_rate())
        .sum();
    info!(requested = args.count, admitted, "admitted flow batch");
    Ok(FlowReport {
        requested: args.count,
        admitted,
        reserved,
    })
}

fn summarise(network: &CapacityNetwork, flows: Option<FlowReport>) -> ExecutionSummary {
    let sweep = network.reachable_nodes(1, usize::MAX);
    ExecutionSummary {
        nodes: network.num_nodes(),
        edges: network.num_edges(),
        total_capacity: network.total_capacity(),
        in_degree: network.in_degree(),
        out_degree: network.out_degree(),
        diameter: sweep.diameter(),
        flows,
    }
}
