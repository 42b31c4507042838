//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - parallel state-vector quantum simulator",
        style("qsv").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qsv-core  Worker pool, gate kernels and measurement");
    println!("  qsv-cli   Command-line interface");
    println!();
    println!(
        "Max qubits: {}",
        style(qsv_core::MAX_QUBITS).yellow()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
