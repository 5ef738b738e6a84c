//! Bellpair command-line library.
//!
//! Hosts the clap command definitions and the logging bootstrap so both the
//! binary and the test suite can exercise them.

pub mod cli;
pub mod logging;
