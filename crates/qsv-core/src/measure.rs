//! Measurement: probability extraction and sampling.
//!
//! Both are single-threaded reads of the active buffer. Sampling is a
//! prefix scan over the cumulative distribution and cannot be split.

use std::collections::BTreeMap;

use num_complex::Complex32;
use rand::Rng;

/// Write `|a|²` for amplitudes `[offset, offset + out.len())` into `out`.
///
/// The range is clipped to the state; returns the number of values written.
/// Entries of `out` past that count are left untouched.
pub fn extract_probabilities(state: &[Complex32], offset: usize, out: &mut [f32]) -> usize {
    let offset = offset.min(state.len());
    let count = out.len().min(state.len() - offset);
    for (p, amp) in out.iter_mut().zip(&state[offset..offset + count]) {
        *p = amp.norm_sqr();
    }
    count
}

/// Draw one basis index with probability `|a_i|²`.
///
/// Returns `None` for an empty state. Indices with zero probability are
/// never selected by the scan. If rounding keeps the cumulative sum below
/// the drawn threshold, the last index (`len - 1`) is returned.
pub fn sample_with<R: Rng + ?Sized>(state: &[Complex32], rng: &mut R) -> Option<usize> {
    if state.is_empty() {
        return None;
    }
    let threshold: f64 = rng.r#gen();

    let mut cumulative = 0.0_f64;
    for (i, amp) in state.iter().enumerate() {
        let p = f64::from(amp.norm_sqr());
        if p == 0.0 {
            continue;
        }
        cumulative += p;
        if cumulative >= threshold {
            return Some(i);
        }
    }

    // numeric tail
    Some(state.len() - 1)
}

/// Draw `shots` samples and count outcomes.
pub fn sample_counts<R: Rng + ?Sized>(
    state: &[Complex32],
    shots: u32,
    rng: &mut R,
) -> BTreeMap<usize, u32> {
    let mut counts = BTreeMap::new();
    for _ in 0..shots {
        if let Some(outcome) = sample_with(state, rng) {
            *counts.entry(outcome).or_insert(0) += 1;
        }
    }
    counts
}

/// Format `index` as an `n`-character bitstring, qubit `n-1` first.
pub fn bitstring(index: usize, num_qubits: u32) -> String {
    format!("{:0width$b}", index, width = num_qubits as usize)
}
