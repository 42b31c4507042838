//! Double-buffered amplitude storage.

use std::marker::PhantomData;

use num_complex::Complex32;

use crate::error::{SimError, SimResult};

pub(crate) const ZERO: Complex32 = Complex32::new(0.0, 0.0);
pub(crate) const ONE: Complex32 = Complex32::new(1.0, 0.0);

/// Owns the active state vector and its scratch companion.
///
/// Gate kernels read `active` and write `scratch`; [`StateStore::swap`]
/// then promotes the scratch buffer. The swap exchanges buffer ownership,
/// it never copies amplitudes.
pub struct StateStore {
    num_qubits: u32,
    active: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl StateStore {
    /// Allocate a register of `num_qubits` qubits in |0…0⟩.
    ///
    /// The caller is responsible for clamping `num_qubits`.
    pub fn new(num_qubits: u32) -> SimResult<Self> {
        let dim = 1usize << num_qubits;
        let mut active = zeroed(dim)?;
        let scratch = zeroed(dim)?;
        active[0] = ONE;
        Ok(Self {
            num_qubits,
            active,
            scratch,
        })
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of amplitudes, `2^n`.
    pub fn dim(&self) -> usize {
        self.active.len()
    }

    /// The current state vector.
    pub fn amplitudes(&self) -> &[Complex32] {
        &self.active
    }

    /// Return to |0…0⟩ in place.
    pub fn reset(&mut self) {
        self.active.fill(ZERO);
        self.active[0] = ONE;
    }

    /// Borrow the active buffer for reading and the scratch buffer for
    /// writing, for the duration of one job.
    pub(crate) fn split(&mut self) -> (&[Complex32], ScratchWriter<'_>) {
        (&self.active, ScratchWriter::new(&mut self.scratch))
    }

    /// Promote scratch to active.
    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.active, &mut self.scratch);
    }
}

fn zeroed(dim: usize) -> SimResult<Vec<Complex32>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(dim)
        .map_err(|_| SimError::Allocation { dim })?;
    buf.resize(dim, ZERO);
    Ok(buf)
}

/// Write handle to the scratch buffer shared by every participant of a job.
///
/// Holding the handle borrows the scratch buffer mutably, so nothing else
/// can observe it while the job runs.
pub(crate) struct ScratchWriter<'a> {
    ptr: *mut Complex32,
    len: usize,
    _buf: PhantomData<&'a mut [Complex32]>,
}

// SAFETY: the handle only writes through `write`, whose contract forbids two
// participants from touching the same index during a job.
unsafe impl Send for ScratchWriter<'_> {}
unsafe impl Sync for ScratchWriter<'_> {}

impl<'a> ScratchWriter<'a> {
    pub(crate) fn new(buf: &'a mut [Complex32]) -> Self {
        Self {
            ptr: buf.as_mut_ptr(),
            len: buf.len(),
            _buf: PhantomData,
        }
    }

    /// Store `value` at `index`.
    ///
    /// # Safety
    ///
    /// Within one job, `index` must be written by exactly one range call.
    #[inline]
    pub(crate) unsafe fn write(&self, index: usize, value: Complex32) {
        assert!(index < self.len, "scratch index {index} out of bounds");
        // SAFETY: in bounds; exclusivity is the caller's obligation.
        unsafe { self.ptr.add(index).write(value) }
    }
}
