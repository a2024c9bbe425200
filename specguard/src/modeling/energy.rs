//! Energy model
//!
//! Fixed-window radio energy: one 10 ms transmit burst and one 10 ms
//! receive window at the datasheet's operating voltage and currents.
//!
//! `E = V * (I_mA / 1000) * t_ms` gives milliJoules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datasheets::schema::SpecMap;

pub const DEFAULT_VOLTAGE_V: f64 = 3.3;
pub const DEFAULT_TX_CURRENT_MA: f64 = 20.0;
pub const DEFAULT_RX_CURRENT_MA: f64 = 15.0;
pub const TX_DURATION_MS: f64 = 10.0;
pub const RX_DURATION_MS: f64 = 10.0;

const VOLTAGE_KEYS: &[&str] = &["Operating Voltage", "Voltage Range"];
const TX_CURRENT_KEYS: &[&str] = &["TX Current", "Current Consumption"];
const RX_CURRENT_KEYS: &[&str] = &["RX Current", "Current Consumption"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    #[serde(rename = "tx_energy_mJ")]
    pub tx_energy_mj: f64,
    #[serde(rename = "rx_energy_mJ")]
    pub rx_energy_mj: f64,
    #[serde(rename = "total_energy_mJ")]
    pub total_energy_mj: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnergyError {
    #[error("{key} has a non-numeric value: {value:?}")]
    UnparseableValue { key: String, value: String },
}

/// Estimate radio energy for one device.
///
/// Missing keys fall back to defaults; a present value whose first token is
/// not a number is an error. The protocol does not enter the formula.
pub fn estimate(spec: &SpecMap, protocol: &str) -> Result<EnergyEstimate, EnergyError> {
    let voltage = lookup_numeric(spec, VOLTAGE_KEYS, DEFAULT_VOLTAGE_V)?;
    let tx_current = lookup_numeric(spec, TX_CURRENT_KEYS, DEFAULT_TX_CURRENT_MA)?;
    let rx_current = lookup_numeric(spec, RX_CURRENT_KEYS, DEFAULT_RX_CURRENT_MA)?;

    let tx = voltage * (tx_current / 1000.0) * TX_DURATION_MS;
    let rx = voltage * (rx_current / 1000.0) * RX_DURATION_MS;

    tracing::debug!(
        "Energy for {}: V={} I_tx={}mA I_rx={}mA",
        protocol,
        voltage,
        tx_current,
        rx_current
    );

    Ok(EnergyEstimate {
        tx_energy_mj: round3(tx),
        rx_energy_mj: round3(rx),
        total_energy_mj: round3(tx + rx),
    })
}

/// Value of the first key present in `spec`, else `default`.
fn lookup_numeric(spec: &SpecMap, keys: &[&str], default: f64) -> Result<f64, EnergyError> {
    match keys.iter().find_map(|k| spec.get(*k).map(|v| (*k, v))) {
        Some((key, value)) => first_numeric_token(value).ok_or_else(|| EnergyError::UnparseableValue {
            key: key.to_string(),
            value: value.clone(),
        }),
        None => Ok(default),
    }
}

/// Parse the first whitespace-delimited token ("3.3 V" -> 3.3).
pub fn first_numeric_token(value: &str) -> Option<f64> {
    value
        .split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
