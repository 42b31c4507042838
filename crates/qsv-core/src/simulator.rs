//! The simulator context: one register plus the worker pool driving it.

use std::collections::BTreeMap;

use num_complex::Complex32;
use rand::Rng;
use tracing::{debug, instrument, trace, warn};

use crate::config::{MAX_QUBITS, SimulatorConfig, clamp_qubits};
use crate::error::SimResult;
use crate::gate::{Gate, Matrix2, rz_phases};
use crate::kernels;
use crate::measure;
use crate::pool::WorkerPool;
use crate::store::StateStore;

/// A state-vector simulator.
///
/// Owns the amplitude buffers and the worker pool. Gate methods take
/// `&mut self`, so gate applications are serialized by construction.
///
/// Gate calls whose qubit indices fall outside `[0, n)` do nothing, as does
/// CNOT with `control == target`. Before [`init`](Self::init) every gate is
/// therefore a no-op.
pub struct Simulator {
    config: SimulatorConfig,
    pool: Option<WorkerPool>,
    store: Option<StateStore>,
}

impl Simulator {
    /// Create a simulator with default tuning. No register exists yet.
    pub fn new() -> Self {
        Self {
            config: SimulatorConfig::default(),
            pool: None,
            store: None,
        }
    }

    /// Create a simulator with custom tuning.
    pub fn with_config(config: SimulatorConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pool: None,
            store: None,
        })
    }

    /// Tuning in effect.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Allocate an `n_qubits` register in |0…0⟩.
    ///
    /// `n_qubits` above [`MAX_QUBITS`] is clamped. The worker pool is built
    /// on the first call only, with `n_threads` workers, or
    /// [`SimulatorConfig::threads`] when `n_threads` is zero. Later calls
    /// keep the existing pool whatever `n_threads` they pass.
    ///
    /// The new buffers are allocated while the previous register is still
    /// alive, so a failed call leaves the simulator exactly as it was.
    #[instrument(skip(self))]
    pub fn init(&mut self, n_qubits: u32, n_threads: usize) -> SimResult<()> {
        self.init_with(n_qubits, n_threads, StateStore::new)
    }

    /// `init` with the register allocation supplied by the caller.
    fn init_with<A>(&mut self, n_qubits: u32, n_threads: usize, allocate: A) -> SimResult<()>
    where
        A: FnOnce(u32) -> SimResult<StateStore>,
    {
        let num_qubits = clamp_qubits(n_qubits);
        if num_qubits != n_qubits {
            warn!(
                requested = n_qubits,
                max = MAX_QUBITS,
                "qubit count exceeds memory ceiling, clamping"
            );
        }
        let n_threads = if n_threads == 0 {
            self.config.threads
        } else {
            n_threads
        };

        let store = allocate(num_qubits)?;

        match self.pool.as_ref().map(WorkerPool::num_threads) {
            None => self.pool = Some(WorkerPool::new(n_threads)?),
            Some(running) if running != n_threads => {
                debug!(
                    running,
                    requested = n_threads,
                    "worker pool already running, keeping its size"
                );
            }
            Some(_) => {}
        }

        debug!(num_qubits, dim = store.dim(), "register initialized");
        self.store = Some(store);
        Ok(())
    }

    /// Return to |0…0⟩ without reallocating. No-op without a register.
    pub fn reset(&mut self) {
        if let Some(store) = &mut self.store {
            store.reset();
            debug!("register reset");
        }
    }

    /// Stop the worker pool and free the register.
    ///
    /// A later [`init`](Self::init) builds a fresh pool.
    pub fn teardown(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.shutdown();
        }
        self.store = None;
        debug!("simulator torn down");
    }

    /// Number of qubits (0 without a register).
    pub fn num_qubits(&self) -> u32 {
        self.store.as_ref().map_or(0, StateStore::num_qubits)
    }

    /// Number of amplitudes, `2^n` (0 without a register).
    pub fn dim(&self) -> usize {
        self.store.as_ref().map_or(0, StateStore::dim)
    }

    /// Worker threads in the pool (0 before the first `init`).
    pub fn num_threads(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::num_threads)
    }

    /// The active state vector (empty without a register).
    pub fn amplitudes(&self) -> &[Complex32] {
        self.store
            .as_ref()
            .map(StateStore::amplitudes)
            .unwrap_or_default()
    }

    /// Apply `gate`.
    pub fn apply(&mut self, gate: &Gate) {
        trace!(%gate, "applying gate");
        match *gate {
            Gate::H(q) => self.apply_h(q),
            Gate::X(q) => self.apply_x(q),
            Gate::Rx(q, theta) => self.apply_rx(q, theta),
            Gate::Ry(q, theta) => self.apply_ry(q, theta),
            Gate::Rz(q, theta) => self.apply_rz(q, theta),
            Gate::Cnot { control, target } => self.apply_cnot(control, target),
        }
    }

    /// Apply an arbitrary 2x2 unitary to `target`.
    ///
    /// The matrix is not checked for unitarity.
    pub fn apply_unitary(&mut self, target: u32, matrix: &Matrix2) {
        let chunk = self.config.pair_chunk;
        if let Some((pool, store)) = self.engine(&[target]) {
            kernels::apply_matrix(pool, store, chunk, target, matrix);
        }
    }

    /// Hadamard on `target`.
    pub fn apply_h(&mut self, target: u32) {
        if let Some(m) = Gate::H(target).matrix() {
            self.apply_unitary(target, &m);
        }
    }

    /// Bit flip on `target`.
    pub fn apply_x(&mut self, target: u32) {
        let chunk = self.config.pair_chunk;
        if let Some((pool, store)) = self.engine(&[target]) {
            kernels::apply_x(pool, store, chunk, target);
        }
    }

    /// `RX(theta)` on `target`.
    pub fn apply_rx(&mut self, target: u32, theta: f32) {
        if let Some(m) = Gate::Rx(target, theta).matrix() {
            self.apply_unitary(target, &m);
        }
    }

    /// `RY(theta)` on `target`.
    pub fn apply_ry(&mut self, target: u32, theta: f32) {
        if let Some(m) = Gate::Ry(target, theta).matrix() {
            self.apply_unitary(target, &m);
        }
    }

    /// `RZ(theta)` on `target`.
    pub fn apply_rz(&mut self, target: u32, theta: f32) {
        let chunk = self.config.pair_chunk;
        if let Some((pool, store)) = self.engine(&[target]) {
            let (d0, d1) = rz_phases(theta);
            kernels::apply_diagonal(pool, store, chunk, target, d0, d1);
        }
    }

    /// Controlled bit flip. A no-op when `control == target`.
    pub fn apply_cnot(&mut self, control: u32, target: u32) {
        if control == target {
            return;
        }
        let chunk = self.config.permutation_chunk;
        if let Some((pool, store)) = self.engine(&[control, target]) {
            kernels::apply_cnot(pool, store, chunk, control, target);
        }
    }

    /// Write probabilities of amplitudes `[offset, offset + out.len())`,
    /// clipped to the register, into `out`. Returns the count written.
    pub fn extract_probabilities(&self, offset: usize, out: &mut [f32]) -> usize {
        measure::extract_probabilities(self.amplitudes(), offset, out)
    }

    /// Probabilities of amplitudes `[offset, offset + count)`, clipped.
    pub fn probabilities(&self, offset: usize, count: usize) -> Vec<f32> {
        let count = count.min(self.dim().saturating_sub(offset));
        let mut out = vec![0.0; count];
        self.extract_probabilities(offset, &mut out);
        out
    }

    /// Measure once using the calling thread's generator.
    ///
    /// `None` without a register.
    pub fn sample(&self) -> Option<usize> {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Measure once using `rng`.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        measure::sample_with(self.amplitudes(), rng)
    }

    /// Measure `shots` times using `rng` and count outcomes.
    pub fn sample_counts<R: Rng + ?Sized>(&self, shots: u32, rng: &mut R) -> BTreeMap<usize, u32> {
        measure::sample_counts(self.amplitudes(), shots, rng)
    }

    /// Pool and store, if a register exists and every qubit is in range.
    fn engine(&mut self, qubits: &[u32]) -> Option<(&mut WorkerPool, &mut StateStore)> {
        let store = self.store.as_mut()?;
        if let Some(q) = qubits.iter().find(|&&q| q >= store.num_qubits()) {
            trace!(qubit = q, num_qubits = store.num_qubits(), "qubit out of range, ignoring gate");
            return None;
        }
        Some((self.pool.as_mut()?, store))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
