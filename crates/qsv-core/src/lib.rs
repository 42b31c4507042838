//! Parallel State-Vector Simulator
//!
//! This crate holds the full `2^n` complex amplitude vector of an `n`-qubit
//! register and applies gates to it with a fixed pool of worker threads.
//! It is an exact simulator: probabilities come straight from the
//! amplitudes and measurement samples from that distribution.
//!
//! # Features
//!
//! - **Double Buffering**: every gate reads the active buffer, writes a
//!   scratch buffer and swaps the two
//! - **Chunked Dispatch**: workers claim fixed-size index ranges from a
//!   shared atomic cursor
//! - **Gate Set**: H, X, RX, RY, RZ, CNOT and arbitrary 2x2 unitaries
//! - **Measurement**: probability extraction and cumulative sampling
//!
//! # Memory
//!
//! | Qubits | Two buffers |
//! |--------|-------------|
//! | 10 | 16 KiB |
//! | 20 | 16 MiB |
//! | 24 | 256 MiB |
//! | 28 | 4 GiB |
//!
//! Requests above [`MAX_QUBITS`] are clamped.
//!
//! # Example
//!
//! ```
//! use qsv_core::Simulator;
//!
//! let mut sim = Simulator::new();
//! sim.init(2, 4)?;
//! sim.apply_h(0);
//! sim.apply_cnot(0, 1);
//!
//! let probs = sim.probabilities(0, 4);
//! assert!((probs[0] - 0.5).abs() < 1e-6);
//! assert!((probs[3] - 0.5).abs() < 1e-6);
//! # Ok::<(), qsv_core::SimError>(())
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod index;
mod kernels;
pub mod measure;
pub mod pool;
pub mod simulator;
pub mod store;

pub use config::{MAX_QUBITS, SimulatorConfig};
pub use error::{SimError, SimResult};
pub use gate::{Gate, Matrix2};
pub use measure::bitstring;
pub use pool::WorkerPool;
pub use simulator::Simulator;
pub use store::StateStore;
