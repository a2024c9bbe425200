//! Core pipeline operations shared by the CLI, examples and tests.

use std::path::{Path, PathBuf};

use crate::ai::{AIError, CompletionService};
use crate::datasheets::extractor::Extractor;
use crate::datasheets::source::{discover_datasheets, DatasheetDirectory};
use crate::datasheets::store::{write_atomic, DeviceSpecStore};
use crate::feasibility::{device_ids, ExecutionPlanEntry, FeasibilityEvaluator, FeasibilityOutcome};
use crate::modeling::{DeviceEstimate, EnergyError, ProtocolTable};

#[derive(Debug, thiserror::Error)]
pub enum SpecGuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("AI error: {0}")]
    AI(#[from] AIError),
    #[error("Energy model error: {0}")]
    Energy(#[from] EnergyError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unknown device: {0}")]
    UnknownDevice(String),
}

/// Outcome of a per-device batch conversion.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ConversionReport {
    /// Files written during this run
    pub converted: Vec<PathBuf>,
    /// Files that already existed and were left untouched
    pub skipped: Vec<PathBuf>,
    /// Devices whose output only holds the raw response in notes
    pub degraded: Vec<String>,
}

pub struct SpecGuardCore;

impl SpecGuardCore {
    /// Convert every source document in `datasheet_dir` to
    /// `<specs_dir>/<device_id>.json`.
    ///
    /// An existing output file means "already done": the device is skipped
    /// without contacting the gateway, even if its source changed.
    pub async fn convert_datasheets(
        datasheet_dir: &Path,
        specs_dir: &Path,
        extractor: &Extractor<'_>,
    ) -> Result<ConversionReport, SpecGuardError> {
        std::fs::create_dir_all(specs_dir)?;
        let mut report = ConversionReport::default();

        for doc in discover_datasheets(datasheet_dir)? {
            tracing::info!("Processing {}...", doc.device_id);
            let json_path = specs_dir.join(format!("{}.json", doc.device_id));

            if json_path.exists() {
                tracing::info!("{} already exists, skipping.", json_path.display());
                report.skipped.push(json_path);
                continue;
            }

            let text = doc.read_text()?;
            let parsed = extractor.extract(&doc.device_id, &text).await?;
            if parsed.is_degraded() {
                report.degraded.push(doc.device_id.clone());
            }

            write_atomic(&json_path, &serde_json::to_string_pretty(&parsed.spec)?)?;
            tracing::info!("Saved {}", json_path.display());
            report.converted.push(json_path);
        }

        Ok(report)
    }

    /// Combined store for the plan's devices, extracted from
    /// `datasheet_dir` on first use and loaded from `store_file` after.
    pub async fn build_store(
        store_file: &Path,
        datasheet_dir: &Path,
        plan: &[ExecutionPlanEntry],
        extractor: &Extractor<'_>,
    ) -> Result<DeviceSpecStore, SpecGuardError> {
        let sources = DatasheetDirectory::new(datasheet_dir);
        DeviceSpecStore::build_or_load(store_file, &device_ids(plan), &sources, extractor).await
    }

    pub async fn evaluate_plan(
        plan: &[ExecutionPlanEntry],
        store: &DeviceSpecStore,
        gateway: &dyn CompletionService,
    ) -> Result<FeasibilityOutcome, SpecGuardError> {
        FeasibilityEvaluator::new(gateway).evaluate(plan, store).await
    }

    /// Energy estimate and protocol profile for one stored device.
    pub fn estimate_device(
        store: &DeviceSpecStore,
        device_id: &str,
        protocol: &str,
        table: &ProtocolTable,
    ) -> Result<DeviceEstimate, SpecGuardError> {
        let record = store
            .get(device_id)
            .ok_or_else(|| SpecGuardError::UnknownDevice(device_id.to_string()))?;
        Ok(DeviceEstimate::compute(record, protocol, table)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasheets::schema::{ExtractedSpec, SpecificationRecord};

    fn store_with(id: &str, pairs: &[(&str, &str)]) -> DeviceSpecStore {
        let spec = ExtractedSpec {
            specification: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            notes: vec![],
        };
        DeviceSpecStore::from_records(vec![SpecificationRecord::new(id, spec)])
    }

    #[test]
    fn test_estimate_device() {
        let store = store_with("SEN0203", &[("Operating Voltage", "5 V"), ("Current Consumption", "100 mA")]);
        let table = ProtocolTable::reference();

        let estimate = SpecGuardCore::estimate_device(&store, "SEN0203", "BLE", &table).unwrap();
        assert!((estimate.energy.total_energy_mj - 10.0).abs() < 1e-9);
        assert!(estimate.is_supported_protocol());

        let estimate = SpecGuardCore::estimate_device(&store, "SEN0203", "LoRaWAN", &table).unwrap();
        assert!(!estimate.is_supported_protocol());
    }

    #[test]
    fn test_estimate_errors() {
        let store = store_with("X", &[("TX Current", "high")]);
        let table = ProtocolTable::reference();

        assert!(matches!(
            SpecGuardCore::estimate_device(&store, "missing", "BLE", &table),
            Err(SpecGuardError::UnknownDevice(_))
        ));
        assert!(matches!(
            SpecGuardCore::estimate_device(&store, "X", "BLE", &table),
            Err(SpecGuardError::Energy(EnergyError::UnparseableValue { .. }))
        ));
    }
}
