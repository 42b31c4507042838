//! Benchmarks for gate kernels and measurement
//!
//! Run with: cargo bench -p qsv-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qsv_core::Simulator;
use rand::SeedableRng;
use rand::rngs::StdRng;

const THREADS: usize = 4;

fn ready(num_qubits: u32) -> Simulator {
    let mut sim = Simulator::new();
    sim.init(num_qubits, THREADS)
        .expect("register should allocate");
    sim
}

/// Benchmark single-qubit kernels across register sizes
fn bench_single_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_qubit");

    for num_qubits in [10_u32, 16, 20] {
        let mut sim = ready(num_qubits);
        group.bench_with_input(BenchmarkId::new("h", num_qubits), &num_qubits, |b, &n| {
            b.iter(|| sim.apply_h(black_box(n / 2)));
        });
        group.bench_with_input(BenchmarkId::new("x", num_qubits), &num_qubits, |b, &n| {
            b.iter(|| sim.apply_x(black_box(n - 1)));
        });
        group.bench_with_input(BenchmarkId::new("rz", num_qubits), &num_qubits, |b, &n| {
            b.iter(|| sim.apply_rz(black_box(0), black_box(0.25 * n as f32)));
        });
    }

    group.finish();
}

/// Benchmark the CNOT permutation kernel
fn bench_cnot(c: &mut Criterion) {
    let mut group = c.benchmark_group("cnot");

    for num_qubits in [10_u32, 16, 20] {
        let mut sim = ready(num_qubits);
        sim.apply_h(0);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_qubits),
            &num_qubits,
            |b, &n| {
                b.iter(|| sim.apply_cnot(black_box(0), black_box(n - 1)));
            },
        );
    }

    group.finish();
}

/// Benchmark probability extraction and sampling
fn bench_measurement(c: &mut Criterion) {
    let mut group = c.benchmark_group("measurement");

    let mut sim = ready(16);
    for q in 0..16 {
        sim.apply_h(q);
    }
    let mut out = vec![0.0_f32; sim.dim()];

    group.bench_function("extract_probabilities", |b| {
        b.iter(|| sim.extract_probabilities(black_box(0), &mut out));
    });

    let mut rng = StdRng::seed_from_u64(7);
    group.bench_function("sample", |b| {
        b.iter(|| sim.sample_with(&mut rng));
    });

    group.finish();
}

criterion_group!(benches, bench_single_qubit, bench_cnot, bench_measurement);
criterion_main!(benches);
