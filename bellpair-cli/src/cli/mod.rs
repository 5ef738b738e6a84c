//! Command-line interface orchestration for the bellpair simulator.
//!
//! Offers a `generate` command that draws a connected Poisson point
//! topology and a `flows` command that additionally admits a batch of
//! random flow requests onto it.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, FlowReport, FlowsArgs, GenerateArgs, TopologyArgs,
    render_summary, run_cli,
};
