//! Property-based tests: random gate sequences preserve total probability.

use proptest::prelude::*;
use qsv_core::{Gate, Simulator, SimulatorConfig};

fn arb_angle() -> impl Strategy<Value = f32> {
    -7.0_f32..7.0
}

/// Gates on `[0, n]`: the top index is out of range and must be ignored.
fn arb_gate(num_qubits: u32) -> impl Strategy<Value = Gate> {
    let q = 0..=num_qubits;
    prop_oneof![
        q.clone().prop_map(Gate::H),
        q.clone().prop_map(Gate::X),
        (q.clone(), arb_angle()).prop_map(|(q, t)| Gate::Rx(q, t)),
        (q.clone(), arb_angle()).prop_map(|(q, t)| Gate::Ry(q, t)),
        (q.clone(), arb_angle()).prop_map(|(q, t)| Gate::Rz(q, t)),
        (q.clone(), q).prop_map(|(control, target)| Gate::Cnot { control, target }),
    ]
}

fn arb_circuit() -> impl Strategy<Value = (u32, Vec<Gate>)> {
    (1_u32..=6).prop_flat_map(|n| (Just(n), prop::collection::vec(arb_gate(n), 1..=30)))
}

fn simulator(threads: usize) -> Simulator {
    let config = SimulatorConfig::default()
        .with_threads(threads)
        .with_pair_chunk(2)
        .with_permutation_chunk(4);
    Simulator::with_config(config).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn norm_is_preserved((n, gates) in arb_circuit()) {
        let mut sim = simulator(3);
        sim.init(n, 3).unwrap();
        for gate in &gates {
            sim.apply(gate);
        }
        let norm: f32 = sim.amplitudes().iter().map(|a| a.norm_sqr()).sum();
        prop_assert!((norm - 1.0).abs() < 1e-4, "norm = {norm}");

        let probs = sim.probabilities(0, sim.dim());
        let total: f32 = probs.iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-4, "total = {total}");
        prop_assert!(sim.sample().is_some_and(|i| i < sim.dim()));
    }

    #[test]
    fn worker_count_does_not_change_result((n, gates) in arb_circuit()) {
        let mut serial = simulator(1);
        let mut parallel = simulator(4);
        serial.init(n, 1).unwrap();
        parallel.init(n, 4).unwrap();
        for gate in &gates {
            serial.apply(gate);
            parallel.apply(gate);
        }
        prop_assert_eq!(serial.amplitudes(), parallel.amplitudes());
    }

    #[test]
    fn gate_spec_round_trips(gate in arb_gate(8)) {
        let parsed: Gate = gate.to_string().parse().unwrap();
        prop_assert_eq!(parsed, gate);
    }
}
