//! Simple extraction example: parse a saved completion response and
//! estimate radio energy from it.

use specguard::datasheets::parser;
use specguard::prelude::*;
use std::path::Path;

fn main() -> Result<(), SpecGuardError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "examples/response.json".to_string());
    let protocol = std::env::args().nth(2).unwrap_or_else(|| "BLE".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_extraction [path/to/response.txt] [protocol]");
        std::process::exit(1);
    }

    let response = std::fs::read_to_string(path)?;
    let parsed = parser::parse(&response, ResponseShape::Json);

    if let Some(ref failure) = parsed.fallback {
        println!("Response was not structured ({}); raw text kept in notes.", failure);
    }

    println!("Specification:");
    for (key, value) in &parsed.spec.specification {
        println!("  {}: {}", key, value);
    }
    println!("Notes: {}", parsed.spec.notes.len());

    let energy = specguard::modeling::estimate(&parsed.spec.specification, &protocol)?;
    println!();
    println!("TX energy:    {:.3} mJ", energy.tx_energy_mj);
    println!("RX energy:    {:.3} mJ", energy.rx_energy_mj);
    println!("Total energy: {:.3} mJ", energy.total_energy_mj);

    match ProtocolTable::reference().lookup(&protocol) {
        Some(profile) => println!(
            "{}: range {} m, latency {} ms, {} kbps, reliability {}",
            profile.name, profile.range_m, profile.latency_ms, profile.throughput_kbps, profile.reliability
        ),
        None => println!("{}: unsupported protocol", protocol),
    }

    Ok(())
}
