//! Bit-level index arithmetic shared by every gate kernel.
//!
//! A *pair index* `p` enumerates the `2^(n-1)` amplitude pairs that differ
//! only in the target qubit: it is the basis index with the target bit
//! removed. Reinserting a zero at the target position yields the first
//! offset of the pair; setting that bit yields the second.

/// Offset of the first amplitude of pair `p`: `p` with a zero inserted at
/// bit `target`.
#[inline]
pub fn pair_index(p: usize, target: u32) -> usize {
    let low_mask = (1usize << target) - 1;
    ((p >> target) << (target + 1)) | (p & low_mask)
}

/// Both offsets `(i0, i1)` of pair `p`, where `i1 = i0 | (1 << target)`.
#[inline]
pub fn pair_indices(p: usize, target: u32) -> (usize, usize) {
    let i0 = pair_index(p, target);
    (i0, i0 | (1usize << target))
}

/// Destination of index `i` under a controlled bit flip.
#[inline]
pub fn controlled_flip(i: usize, control_mask: usize, target_mask: usize) -> usize {
    if i & control_mask != 0 {
        i ^ target_mask
    } else {
        i
    }
}
