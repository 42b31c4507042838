//! Simulator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Largest register the simulator will allocate.
///
/// Two buffers of `2^28` single-precision amplitudes take 4 GiB; larger
/// requests are clamped to this value rather than rejected.
pub const MAX_QUBITS: u32 = 28;

/// Default chunk size (in amplitude pairs) for paired-amplitude kernels.
pub const DEFAULT_PAIR_CHUNK: usize = 8192;

/// Default chunk size (in indices) for the full-vector permutation kernel.
pub const DEFAULT_PERMUTATION_CHUNK: usize = 65536;

/// Clamp a requested qubit count to [`MAX_QUBITS`].
pub fn clamp_qubits(num_qubits: u32) -> u32 {
    num_qubits.min(MAX_QUBITS)
}

/// Tuning knobs for a [`Simulator`](crate::Simulator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Worker threads to start when the pool is first built and
    /// [`Simulator::init`](crate::Simulator::init) is passed zero threads.
    pub threads: usize,
    /// Pairs claimed per cursor step by H, X, RX, RY, RZ and custom unitaries.
    pub pair_chunk: usize,
    /// Indices claimed per cursor step by CNOT.
    pub permutation_chunk: usize,
}

impl SimulatorConfig {
    /// Configuration with one worker per available core.
    pub fn new() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, std::num::NonZero::get),
            pair_chunk: DEFAULT_PAIR_CHUNK,
            permutation_chunk: DEFAULT_PERMUTATION_CHUNK,
        }
    }

    /// Set the worker thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the paired-amplitude chunk size.
    #[must_use]
    pub fn with_pair_chunk(mut self, chunk: usize) -> Self {
        self.pair_chunk = chunk;
        self
    }

    /// Set the permutation chunk size.
    #[must_use]
    pub fn with_permutation_chunk(mut self, chunk: usize) -> Self {
        self.permutation_chunk = chunk;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> SimResult<()> {
        if self.threads == 0 {
            return Err(SimError::Config("threads must be at least 1".into()));
        }
        if self.pair_chunk == 0 {
            return Err(SimError::Config("pair_chunk must be at least 1".into()));
        }
        if self.permutation_chunk == 0 {
            return Err(SimError::Config(
                "permutation_chunk must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
