//! Gate descriptors.
//!
//! Rotations use the half-angle convention:
//!
//! | Gate | Matrix |
//! |------|--------|
//! | `RX(θ)` | `[[c, -i·s], [-i·s, c]]` |
//! | `RY(θ)` | `[[c, -s], [s, c]]` |
//! | `RZ(θ)` | `diag(c - i·s, c + i·s)` = `diag(e^{-iθ/2}, e^{iθ/2})` |
//!
//! with `c = cos(θ/2)` and `s = sin(θ/2)`.

use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex32;
use crate::error::SimError;

/// A 2x2 complex matrix, row-major: `m[row][col]`.
pub type Matrix2 = [[Complex32; 2]; 2];

/// A gate applied to specific qubits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Hadamard.
    H(u32),
    /// Pauli-X (bit flip).
    X(u32),
    /// Rotation about X by an angle in radians.
    Rx(u32, f32),
    /// Rotation about Y by an angle in radians.
    Ry(u32, f32),
    /// Rotation about Z by an angle in radians.
    Rz(u32, f32),
    /// Controlled bit flip.
    Cnot {
        /// Control qubit.
        control: u32,
        /// Target qubit.
        target: u32,
    },
}

impl Gate {
    /// Lower-case gate name.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::Cnot { .. } => "cnot",
        }
    }

    /// The qubit the gate acts on (the target, for CNOT).
    pub fn target(&self) -> u32 {
        match *self {
            Gate::H(q) | Gate::X(q) | Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => q,
            Gate::Cnot { target, .. } => target,
        }
    }

    /// Matrix of a single-qubit gate; `None` for CNOT.
    pub fn matrix(&self) -> Option<Matrix2> {
        let zero = Complex32::new(0.0, 0.0);
        let one = Complex32::new(1.0, 0.0);
        let m = match *self {
            Gate::H(_) => {
                let h = Complex32::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::X(_) => [[zero, one], [one, zero]],
            Gate::Rx(_, theta) => {
                let (s, c) = (0.5 * theta).sin_cos();
                let c = Complex32::new(c, 0.0);
                let mis = Complex32::new(0.0, -s);
                [[c, mis], [mis, c]]
            }
            Gate::Ry(_, theta) => {
                let (s, c) = (0.5 * theta).sin_cos();
                [
                    [Complex32::new(c, 0.0), Complex32::new(-s, 0.0)],
                    [Complex32::new(s, 0.0), Complex32::new(c, 0.0)],
                ]
            }
            Gate::Rz(_, theta) => {
                let (e0, e1) = rz_phases(theta);
                [[e0, zero], [zero, e1]]
            }
            Gate::Cnot { .. } => return None,
        };
        Some(m)
    }
}

/// Diagonal entries `(e^{-iθ/2}, e^{iθ/2})` of RZ(θ).
pub(crate) fn rz_phases(theta: f32) -> (Complex32, Complex32) {
    let (s, c) = (0.5 * theta).sin_cos();
    (Complex32::new(c, -s), Complex32::new(c, s))
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Gate::H(q) | Gate::X(q) => write!(f, "{}:{q}", self.name()),
            Gate::Rx(q, theta) | Gate::Ry(q, theta) | Gate::Rz(q, theta) => {
                write!(f, "{}:{q}:{theta}", self.name())
            }
            Gate::Cnot { control, target } => write!(f, "cnot:{control}:{target}"),
        }
    }
}

/// Parses `name:operand[:operand]`, e.g. `h:0`, `rz:1:0.785`, `cnot:0:1`.
/// Names are case-insensitive; `cx` is accepted for `cnot`.
impl FromStr for Gate {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SimError::InvalidGateSpec(s.to_string());
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        let qubit = |i: usize| -> Result<u32, SimError> {
            parts.get(i).ok_or_else(invalid)?.parse().map_err(|_| invalid())
        };
        let angle = |i: usize| -> Result<f32, SimError> {
            parts.get(i).ok_or_else(invalid)?.parse().map_err(|_| invalid())
        };

        let (gate, arity) = match parts[0].to_lowercase().as_str() {
            "h" => (Gate::H(qubit(1)?), 2),
            "x" => (Gate::X(qubit(1)?), 2),
            "rx" => (Gate::Rx(qubit(1)?, angle(2)?), 3),
            "ry" => (Gate::Ry(qubit(1)?, angle(2)?), 3),
            "rz" => (Gate::Rz(qubit(1)?, angle(2)?), 3),
            "cnot" | "cx" => (
                Gate::Cnot {
                    control: qubit(1)?,
                    target: qubit(2)?,
                },
                3,
            ),
            other => return Err(SimError::UnknownGate(other.to_string())),
        };

        if parts.len() != arity {
            return Err(invalid());
        }
        Ok(gate)
    }
}
