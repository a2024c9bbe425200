//! Interactive device lookup over a loaded store.

use anyhow::Context;
use specguard::{DeviceSpecStore, ProtocolTable, SpecGuardCore, SpecGuardError};
use std::io::{BufRead, Write};

/// Prompt for a device, then for `show` or `compute <protocol>`, until
/// `exit` or end of input.
pub fn run<R: BufRead, W: Write>(
    store: &DeviceSpecStore,
    table: &ProtocolTable,
    mut input: R,
    output: &mut W,
) -> anyhow::Result<()> {
    loop {
        let Some(device) = prompt(&mut input, output, "Device name (or 'exit'): ")? else {
            break;
        };
        if device.eq_ignore_ascii_case("exit") {
            break;
        }
        if device.is_empty() {
            continue;
        }

        let Some(record) = store.get(&device) else {
            writeln!(output, "Unknown device: {}", device)?;
            continue;
        };

        let Some(command) = prompt(&mut input, output, "Command (show / compute <protocol>): ")?
        else {
            break;
        };

        if command.eq_ignore_ascii_case("exit") {
            break;
        } else if command == "show" {
            writeln!(output, "{}", serde_json::to_string_pretty(record)?)?;
        } else if let Some(rest) = command.strip_prefix("compute") {
            let mut protocol = rest.trim().to_string();
            if protocol.is_empty() {
                match prompt(&mut input, output, "Protocol: ")? {
                    Some(p) => protocol = p,
                    None => break,
                }
            }
            match SpecGuardCore::estimate_device(store, &device, &protocol, table) {
                Ok(estimate) => {
                    let transmission = match estimate.profile {
                        Some(ref profile) => serde_json::to_value(profile)?,
                        None => serde_json::Value::from("unsupported protocol"),
                    };
                    let result = serde_json::json!({
                        "device": estimate.device_id,
                        "protocol": estimate.protocol,
                        "energy": estimate.energy,
                        "transmission": transmission,
                    });
                    writeln!(output, "{}", serde_json::to_string_pretty(&result)?)?;
                }
                Err(e @ SpecGuardError::Energy(_)) => writeln!(output, "Error: {}", e)?,
                Err(e) => return Err(e.into()),
            }
        } else {
            writeln!(output, "Unknown command: {}", command)?;
        }
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> anyhow::Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use specguard::{ExtractedSpec, SpecificationRecord};

    fn store() -> DeviceSpecStore {
        let spec = ExtractedSpec {
            specification: [
                ("Operating Voltage".to_string(), "5 V".to_string()),
                ("Current Consumption".to_string(), "100 mA".to_string()),
            ]
            .into_iter()
            .collect(),
            notes: vec![],
        };
        let broken = ExtractedSpec {
            specification: [("TX Current".to_string(), "high".to_string())]
                .into_iter()
                .collect(),
            notes: vec![],
        };
        DeviceSpecStore::from_records(vec![
            SpecificationRecord::new("SEN0203", spec),
            SpecificationRecord::new("broken", broken),
        ])
    }

    fn session(script: &str) -> String {
        let mut out = Vec::new();
        run(&store(), &ProtocolTable::reference(), script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_show_and_compute() {
        let out = session("SEN0203\nshow\nSEN0203\ncompute BLE\nexit\n");
        assert!(out.contains("\"Operating Voltage\": \"5 V\""));
        assert!(out.contains("\"total_energy_mJ\": 10.0"));
        assert!(out.contains("\"range_m\""));
    }

    #[test]
    fn test_compute_prompts_for_protocol() {
        let out = session("SEN0203\ncompute\nLoRaWAN\n");
        assert!(out.contains("Protocol: "));
        assert!(out.contains("unsupported protocol"));
    }

    #[test]
    fn test_unknown_device_and_command() {
        let out = session("nope\nSEN0203\nfly\n");
        assert!(out.contains("Unknown device: nope"));
        assert!(out.contains("Unknown command: fly"));
    }

    #[test]
    fn test_energy_error_keeps_session_alive() {
        let out = session("broken\ncompute BLE\nSEN0203\nshow\n");
        assert!(out.contains("Error: "));
        assert!(out.contains("\"Operating Voltage\""));
    }
}
