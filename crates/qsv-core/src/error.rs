//! Error types for the simulator core.
//!
//! Most misuse (out-of-range qubits, equal control and target) is
//! deliberately *not* an error: gate calls silently do nothing. Errors are
//! reserved for resource failures and for parsing user input.

use thiserror::Error;

/// Errors produced by the simulator core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread {index}: {source}")]
    PoolSpawn {
        /// Index of the worker that could not be spawned.
        index: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The state and scratch buffers could not be allocated.
    #[error("cannot allocate state buffers of {dim} amplitudes")]
    Allocation {
        /// Requested dimension (amplitudes per buffer).
        dim: usize,
    },

    /// Gate name is not one of the supported gates.
    #[error("Unknown gate: '{0}'")]
    UnknownGate(String),

    /// Gate spec has the wrong arity or an unparsable operand.
    #[error("Invalid gate spec '{0}'")]
    InvalidGateSpec(String),

    /// Configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
