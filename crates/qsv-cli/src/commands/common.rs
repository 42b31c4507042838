//! Shared helpers for CLI commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qsv_core::{Simulator, SimulatorConfig, bitstring};

/// Amplitudes read per probability scan step.
const SCAN_CHUNK: usize = 4096;

/// Load a simulator configuration from a JSON file, or the defaults.
///
/// Missing keys take their default values.
pub fn load_config(path: Option<&Path>) -> Result<SimulatorConfig> {
    let Some(path) = path else {
        return Ok(SimulatorConfig::default());
    };

    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: SimulatorConfig = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

/// The first `limit` basis states with non-zero probability, in index order.
///
/// Scans the register in fixed-size windows instead of copying every
/// probability at once.
pub fn nonzero_probabilities(sim: &Simulator, limit: usize) -> Vec<(usize, f32)> {
    let mut found = Vec::new();
    let mut window = vec![0.0_f32; SCAN_CHUNK];
    let mut offset = 0;

    while found.len() < limit {
        let count = sim.extract_probabilities(offset, &mut window);
        if count == 0 {
            break;
        }
        found.extend(
            window[..count]
                .iter()
                .enumerate()
                .filter(|(_, p)| **p > 0.0)
                .map(|(i, p)| (offset + i, *p))
                .take(limit - found.len()),
        );
        offset += count;
    }

    found
}

/// Print basis-state probabilities in a table.
pub fn print_probabilities(entries: &[(usize, f32)], num_qubits: u32) {
    println!("\n{} Probabilities:", style("✓").green().bold());

    if entries.is_empty() {
        println!("  (none shown)");
        return;
    }

    for &(index, prob) in entries {
        println!(
            "  {}: {:.6}",
            style(bitstring(index, num_qubits)).cyan(),
            prob
        );
    }
}

/// Print measurement counts as a histogram, most frequent first.
pub fn print_counts(counts: &BTreeMap<usize, u32>, shots: u32, num_qubits: u32) {
    println!("\n{} Samples ({} shots):", style("✓").green().bold(), shots);

    let mut sorted: Vec<(usize, u32)> = counts.iter().map(|(&k, &v)| (k, v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let total = f64::from(shots.max(1));

    for &(index, count) in sorted.iter().take(16) {
        let prob = f64::from(count) / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring(index, num_qubits)).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}
