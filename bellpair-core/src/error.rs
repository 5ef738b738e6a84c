//! Error types for the bellpair core library.
//!
//! Defines the error enum exposed by the public API, a stable code for each
//! failure class, and a convenient result alias.

use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::network::NodeId;

/// Stable codes grouping [`NetworkError`] variants by failure class.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum NetworkErrorCode {
    /// A caller-supplied argument was rejected by validation.
    InvalidArgument,
    /// A bounded search ran out of attempts or the input graph cannot be
    /// used as a single connected network.
    Exhausted,
    /// An explicit I/O operation failed.
    IoFailure,
}

impl NetworkErrorCode {
    /// Return the stable machine-readable representation of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Exhausted => "EXHAUSTED",
            Self::IoFailure => "IO_FAILURE",
        }
    }
}

impl fmt::Display for NetworkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced by network construction, queries, and admission.
///
/// Admission *rejection* is not an error: a flow or app that cannot be
/// served simply comes back with an empty path or allocation map.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A node identifier fell outside the network's node range.
    #[error("node {node} is out of range (network has {node_count} nodes)")]
    NodeOutOfRange { node: NodeId, node_count: usize },
    /// A flow request named the same node as source and destination.
    #[error("flow source and destination coincide at node {node}")]
    SourceIsDestination { node: NodeId },
    /// An app listed its own source among its peers.
    #[error("app source {source_node} appears in its own peer set")]
    PeerIsSource { source_node: NodeId },
    /// An app was submitted without any peers.
    #[error("app with source {source_node} has an empty peer set")]
    EmptyPeers { source_node: NodeId },
    /// A flow net rate was not a positive finite number.
    #[error("net rate must be positive and finite (got {rate})")]
    NonPositiveRate { rate: f64 },
    /// An app priority was not a positive finite number.
    #[error("priority must be positive and finite (got {priority})")]
    NonPositivePriority { priority: f64 },
    /// The app admission quantum was not a positive finite number.
    #[error("quantum must be positive and finite (got {quantum})")]
    NonPositiveQuantum { quantum: f64 },
    /// App admission was asked for zero candidate paths per peer.
    #[error("the number of candidate paths per peer must be at least 1")]
    ZeroPathCount,
    /// The measurement probability must lie in (0, 1].
    #[error("measurement probability must lie in (0, 1] (got {probability})")]
    InvalidMeasurementProbability { probability: f64 },
    /// The link retention probability must lie in [0, 1].
    #[error("link probability must lie in [0, 1] (got {probability})")]
    InvalidLinkProbability { probability: f64 },
    /// The link distance threshold must be non-negative and finite.
    #[error("link threshold must be non-negative and finite (got {threshold})")]
    InvalidThreshold { threshold: f64 },
    /// The expected point count of a Poisson draw must be positive.
    #[error("expected point count must be positive and finite (got {mean_points})")]
    InvalidIntensity { mean_points: f64 },
    /// The sampling rectangle must have positive finite sides.
    #[error("grid sides must be positive and finite (got {width} x {height})")]
    InvalidGridDimension { width: f64, height: f64 },
    /// A uniform rate sampler was configured with an unusable range.
    #[error("rate range must satisfy 0 <= min <= max (got [{min}, {max}])")]
    InvalidRateRange { min: f64, max: f64 },
    /// An edge weight was negative or non-finite.
    #[error("edge ({source_node}, {target}) has invalid weight {weight}")]
    InvalidWeight {
        source_node: NodeId,
        target: NodeId,
        weight: f64,
    },
    /// A capacity adjustment referenced an edge the network does not have.
    #[error("edge ({source_node}, {target}) does not exist")]
    MissingEdge { source_node: NodeId, target: NodeId },
    /// A capacity adjustment would drive an edge residual below zero.
    #[error(
        "removing {delta} from edge ({source_node}, {target}) would leave residual {residual} negative"
    )]
    CapacityUnderflow {
        source_node: NodeId,
        target: NodeId,
        residual: f64,
        delta: f64,
    },
    /// A capacity delta was not a finite number.
    #[error("capacity delta must be finite (got {delta})")]
    NonFiniteDelta { delta: f64 },
    /// An externally supplied edge list does not form one connected network.
    #[error("the input edge list is not fully connected")]
    NotConnected,
    /// The topology factory could not find a connected instance.
    #[error("could not find a connected network after {attempts} tries")]
    Exhausted { attempts: u32 },
    /// A DOT export could not be written.
    #[error("could not write DOT file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NetworkError {
    /// Retrieve the stable [`NetworkErrorCode`] for this error.
    ///
    /// # Examples
    /// ```
    /// use bellpair_core::{NetworkError, NetworkErrorCode};
    ///
    /// let err = NetworkError::ZeroPathCount;
    /// assert_eq!(err.code(), NetworkErrorCode::InvalidArgument);
    /// assert_eq!(err.code().as_str(), "INVALID_ARGUMENT");
    /// ```
    #[must_use]
    pub const fn code(&self) -> NetworkErrorCode {
        match self {
            Self::NotConnected | Self::Exhausted { .. } => NetworkErrorCode::Exhausted,
            Self::Io { .. } => NetworkErrorCode::IoFailure,
            _ => NetworkErrorCode::InvalidArgument,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_group_variants_by_failure_class() {
        let invalid = NetworkError::NodeOutOfRange {
            node: 9,
            node_count: 3,
        };
        assert_eq!(invalid.code(), NetworkErrorCode::InvalidArgument);

        let exhausted = NetworkError::Exhausted { attempts: 1_000_000 };
        assert_eq!(exhausted.code(), NetworkErrorCode::Exhausted);
        assert_eq!(NetworkError::NotConnected.code(), NetworkErrorCode::Exhausted);

        let io = NetworkError::Io {
            path: PathBuf::from("missing/out.dot"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        assert_eq!(io.code(), NetworkErrorCode::IoFailure);
    }

    #[test]
    fn display_includes_offending_values() {
        let err = NetworkError::CapacityUnderflow {
            source_node: 2,
            target: 3,
            residual: 1.0,
            delta: -10.0,
        };
        let rendered = format!("{err}");
        assert!(rendered.contains("(2, 3)"));
        assert!(rendered.contains("-10"));
    }
}
