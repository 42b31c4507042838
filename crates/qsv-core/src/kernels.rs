//! Gate kernels.
//!
//! Each kernel publishes exactly one range job that reads the active buffer
//! and writes every scratch amplitude once, then swaps the buffers. Qubit
//! indices are validated by the caller.
//!
//! Single-qubit kernels iterate over the pair domain (`2^(n-1)` items); each
//! pair index owns its two offsets, so no two range calls write the same
//! scratch slot. CNOT iterates over all `2^n` indices and scatters through a
//! bijection, which gives the same guarantee.

use std::ops::Range;

use num_complex::Complex32;

use crate::gate::Matrix2;
use crate::index::{controlled_flip, pair_indices};
use crate::pool::WorkerPool;
use crate::store::{ScratchWriter, StateStore};

/// Dispatch `body` over `[0, total)` and promote the scratch buffer.
fn run_gate<F>(pool: &mut WorkerPool, store: &mut StateStore, total: usize, chunk: usize, body: F)
where
    F: Fn(&[Complex32], &ScratchWriter<'_>, Range<usize>) + Sync,
{
    {
        let (state, scratch) = store.split();
        pool.dispatch(total, chunk, |start, end| body(state, &scratch, start..end));
    }
    store.swap();
}

/// Generic 2x2 unitary on `target`.
pub(crate) fn apply_matrix(
    pool: &mut WorkerPool,
    store: &mut StateStore,
    chunk: usize,
    target: u32,
    m: &Matrix2,
) {
    let pairs = store.dim() >> 1;
    run_gate(pool, store, pairs, chunk, |state, scratch, range| {
        for p in range {
            let (i0, i1) = pair_indices(p, target);
            let a0 = state[i0];
            let a1 = state[i1];
            // SAFETY: pair `p` is the only writer of `i0` and `i1`.
            unsafe {
                scratch.write(i0, m[0][0] * a0 + m[0][1] * a1);
                scratch.write(i1, m[1][0] * a0 + m[1][1] * a1);
            }
        }
    });
}

/// Pauli-X: swap each pair.
pub(crate) fn apply_x(pool: &mut WorkerPool, store: &mut StateStore, chunk: usize, target: u32) {
    let pairs = store.dim() >> 1;
    run_gate(pool, store, pairs, chunk, |state, scratch, range| {
        for p in range {
            let (i0, i1) = pair_indices(p, target);
            // SAFETY: pair `p` is the only writer of `i0` and `i1`.
            unsafe {
                scratch.write(i0, state[i1]);
                scratch.write(i1, state[i0]);
            }
        }
    });
}

/// Diagonal gate `diag(d0, d1)` on `target`, used by RZ.
pub(crate) fn apply_diagonal(
    pool: &mut WorkerPool,
    store: &mut StateStore,
    chunk: usize,
    target: u32,
    d0: Complex32,
    d1: Complex32,
) {
    let pairs = store.dim() >> 1;
    run_gate(pool, store, pairs, chunk, |state, scratch, range| {
        for p in range {
            let (i0, i1) = pair_indices(p, target);
            // SAFETY: pair `p` is the only writer of `i0` and `i1`.
            unsafe {
                scratch.write(i0, d0 * state[i0]);
                scratch.write(i1, d1 * state[i1]);
            }
        }
    });
}

/// Controlled bit flip. `control` and `target` must differ.
pub(crate) fn apply_cnot(
    pool: &mut WorkerPool,
    store: &mut StateStore,
    chunk: usize,
    control: u32,
    target: u32,
) {
    debug_assert_ne!(control, target);
    let control_mask = 1usize << control;
    let target_mask = 1usize << target;
    let dim = store.dim();
    run_gate(pool, store, dim, chunk, |state, scratch, range| {
        for i in range {
            let dst = controlled_flip(i, control_mask, target_mask);
            // SAFETY: `controlled_flip` is a bijection, so `dst` has a single source.
            unsafe { scratch.write(dst, state[i]) };
        }
    });
}
