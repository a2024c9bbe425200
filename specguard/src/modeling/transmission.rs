//! Transmission model: static characteristics per wireless protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolProfile {
    pub name: String,
    pub range_m: f64,
    pub latency_ms: f64,
    pub throughput_kbps: f64,
    /// Delivery ratio in [0, 1]
    pub reliability: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("protocol name is empty")]
    EmptyName,
    #[error("reliability for {name} must be within [0, 1], got {reliability}")]
    ReliabilityOutOfRange { name: String, reliability: f64 },
}

/// Read-only lookup table, built once at startup.
#[derive(Debug, Clone)]
pub struct ProtocolTable {
    profiles: Vec<ProtocolProfile>,
}

impl ProtocolTable {
    pub fn empty() -> Self {
        Self { profiles: Vec::new() }
    }

    /// Wi-Fi, BLE, ZigBee and Thread with typical indoor figures.
    pub fn reference() -> Self {
        let profile = |name: &str, range_m: f64, latency_ms: f64, throughput_kbps: f64, reliability: f64| {
            ProtocolProfile {
                name: name.to_string(),
                range_m,
                latency_ms,
                throughput_kbps,
                reliability,
            }
        };
        Self {
            profiles: vec![
                profile("Wi-Fi", 50.0, 10.0, 54_000.0, 0.95),
                profile("BLE", 10.0, 15.0, 1_000.0, 0.90),
                profile("ZigBee", 100.0, 30.0, 250.0, 0.92),
                profile("Thread", 30.0, 20.0, 250.0, 0.95),
            ],
        }
    }

    /// Add a profile, replacing one whose name matches.
    pub fn insert(&mut self, profile: ProtocolProfile) -> Result<(), ProtocolError> {
        let key = canonical_name(&profile.name);
        if key.is_empty() {
            return Err(ProtocolError::EmptyName);
        }
        if !(0.0..=1.0).contains(&profile.reliability) {
            return Err(ProtocolError::ReliabilityOutOfRange {
                name: profile.name,
                reliability: profile.reliability,
            });
        }
        self.profiles.retain(|p| canonical_name(&p.name) != key);
        self.profiles.push(profile);
        Ok(())
    }

    /// `None` for protocols not in the table.
    ///
    /// Matching ignores case, spaces, `-` and `_` ("wifi" finds "Wi-Fi").
    pub fn lookup(&self, name: &str) -> Option<&ProtocolProfile> {
        let key = canonical_name(name);
        if key.is_empty() {
            return None;
        }
        self.profiles.iter().find(|p| canonical_name(&p.name) == key)
    }

    pub fn profiles(&self) -> &[ProtocolProfile] {
        &self.profiles
    }
}

impl Default for ProtocolTable {
    fn default() -> Self {
        Self::reference()
    }
}

fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
