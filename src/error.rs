/*
This code is part of the FlowNet drainage-network analysis library.
Created: 11/03/2025
Last Modified: 14/07/2025
License: MIT
*/

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, FlowError>;

/// The failure taxonomy of the library. Every operator either succeeds or
/// returns one of these; no operator silently drops data.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A drainage encoding contained a value outside its convention
    /// (e.g. a D8 code that is not 1..=9, 5 or 255).
    #[error("unrecognised drainage encoding value {code} at cell {index}")]
    BadEncoding { code: i64, index: usize },

    /// A field's shape disagrees with the domain (or node count) it is
    /// being applied to. Shapes are reported as (rows, columns) for grid
    /// data and (nodes, lanes) for node-space data.
    #[error("field shape {found:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The drainage relation is not acyclic. Construction errors
    /// permanently invalidate the network; no partial network is exposed.
    #[error("river network contains a cycle")]
    CycleDetected,

    /// Missing values found in an input field while `accept_missing` was
    /// false.
    #[error("missing values present in input field and accept_missing is false")]
    UnexpectedMissing,

    /// A reduction was requested by a name outside the supported set.
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    /// A non-NaN missing value was used with a reduction whose sentinel
    /// algebra is not implemented.
    #[error("missing value {0} is not supported for this reduction; use NaN")]
    UnsupportedMissingValue(String),

    /// A station node index outside `[0, N)`.
    #[error("station node {0} is outside the network")]
    InvalidStation(usize),

    /// A requested operator combination that is documented as unavailable.
    #[error("{0}")]
    Unsupported(String),

    /// A precomputed network blob that could not be understood.
    #[error("invalid network blob: {0}")]
    InvalidBlob(String),

    /// A precomputed network blob written by an incompatible library
    /// version.
    #[error("network blob version {found} does not match library version {expected}")]
    UnsupportedVersion { expected: String, found: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
