//! Device Specification Store
//!
//! Owns every [`SpecificationRecord`], keyed by device id. Persisted as one
//! JSON object (`device_id -> {device, Specification, notes}`) written in a
//! single atomic replace once all devices are processed.
//!
//! The store is compute-once: if the file exists it is loaded as-is and no
//! device is re-extracted, even when its source document has changed since.
//! Deleting the file is the only way to force a rebuild.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::core::SpecGuardError;
use crate::datasheets::extractor::Extractor;
use crate::datasheets::schema::{ExtractedSpec, SpecificationRecord};
use crate::datasheets::source::SourceProvider;

/// Non-fatal events recorded while building or loading a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreDiagnostic {
    /// No source document for a requested device; it was skipped
    MissingSource { device_id: String },
    /// The completion output was unstructured; the record is notes-only
    DegradedParse { device_id: String, reason: String },
    /// A requested device is absent from a store that was loaded from disk
    NotInStore { device_id: String },
}

impl fmt::Display for StoreDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreDiagnostic::MissingSource { device_id } => {
                write!(f, "Missing data for {}", device_id)
            }
            StoreDiagnostic::DegradedParse { device_id, reason } => {
                write!(f, "Unstructured extraction for {}: {}", device_id, reason)
            }
            StoreDiagnostic::NotInStore { device_id } => {
                write!(f, "{} is not in the persisted store", device_id)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceSpecStore {
    records: BTreeMap<String, SpecificationRecord>,
    diagnostics: Vec<StoreDiagnostic>,
}

impl DeviceSpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = SpecificationRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.device_id().to_string(), r))
                .collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Load a persisted combined store. The object key is the device id;
    /// a record naming another device is re-filed under its key.
    pub fn load(path: &Path) -> Result<Self, SpecGuardError> {
        let contents = std::fs::read_to_string(path)?;
        let raw: BTreeMap<String, SpecificationRecord> = serde_json::from_str(&contents)?;
        let records = raw
            .into_iter()
            .map(|(key, record)| {
                if key == record.device_id() {
                    return (key, record);
                }
                if !record.device_id().is_empty() {
                    tracing::warn!(
                        "Store key {} holds a record for {}; using the key",
                        key,
                        record.device_id()
                    );
                }
                let record = record.with_device_id(key.as_str());
                (key, record)
            })
            .collect();
        Ok(Self {
            records,
            diagnostics: Vec::new(),
        })
    }

    /// Load a persisted store and note every requested device it lacks.
    /// Nothing is extracted.
    pub fn load_for(path: &Path, device_ids: &[String]) -> Result<Self, SpecGuardError> {
        let mut store = Self::load(path)?;
        for id in unique_ids(device_ids) {
            if !store.contains(id) {
                tracing::warn!("{} is not in {}; not re-extracting", id, path.display());
                store.diagnostics.push(StoreDiagnostic::NotInStore {
                    device_id: id.to_string(),
                });
            }
        }
        Ok(store)
    }

    /// Write the whole store, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> Result<(), SpecGuardError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        write_atomic(path, &serde_json::to_string_pretty(&self.records)?)?;
        tracing::info!("Saved {} device records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Load `path` if it exists, otherwise extract every requested device
    /// that has a source document and persist the result.
    pub async fn build_or_load(
        path: &Path,
        device_ids: &[String],
        sources: &dyn SourceProvider,
        extractor: &Extractor<'_>,
    ) -> Result<Self, SpecGuardError> {
        if path.exists() {
            tracing::info!("Loading existing store {}", path.display());
            return Self::load_for(path, device_ids);
        }

        let store = Self::build(device_ids, sources, extractor).await?;
        store.save(path)?;
        Ok(store)
    }

    /// Extract every requested device, one at a time, without persisting.
    pub async fn build(
        device_ids: &[String],
        sources: &dyn SourceProvider,
        extractor: &Extractor<'_>,
    ) -> Result<Self, SpecGuardError> {
        let mut store = Self::new();

        for id in unique_ids(device_ids) {
            let Some(text) = sources.source_text(id)? else {
                tracing::warn!("Missing data for {}", id);
                store.diagnostics.push(StoreDiagnostic::MissingSource {
                    device_id: id.to_string(),
                });
                continue;
            };

            tracing::info!("Processing {}...", id);
            let parsed = extractor.extract(id, &text).await?;
            if let Some(failure) = parsed.fallback {
                store.diagnostics.push(StoreDiagnostic::DegradedParse {
                    device_id: id.to_string(),
                    reason: failure.to_string(),
                });
            }
            store.insert(SpecificationRecord::new(id, parsed.spec));
        }

        Ok(store)
    }

    /// Assemble a store from per-device `<device_id>.json` documents.
    pub fn from_spec_dir(specs_dir: &Path, device_ids: &[String]) -> Result<Self, SpecGuardError> {
        let mut store = Self::new();

        for id in unique_ids(device_ids) {
            let path = specs_dir.join(format!("{}.json", id));
            if !path.exists() {
                tracing::warn!("Missing data for {}", id);
                store.diagnostics.push(StoreDiagnostic::MissingSource {
                    device_id: id.to_string(),
                });
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            let spec: ExtractedSpec = serde_json::from_str(&contents)?;
            store.insert(SpecificationRecord::new(id, spec));
        }

        Ok(store)
    }

    fn insert(&mut self, record: SpecificationRecord) {
        self.records.insert(record.device_id().to_string(), record);
    }

    pub fn get(&self, device_id: &str) -> Option<&SpecificationRecord> {
        self.records.get(device_id)
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.records.contains_key(device_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &SpecificationRecord> {
        self.records.values()
    }

    /// Records for the given devices that the store holds.
    pub fn subset<'s>(&'s self, device_ids: &[String]) -> BTreeMap<&'s str, &'s SpecificationRecord> {
        unique_ids(device_ids)
            .into_iter()
            .filter_map(|id| self.records.get_key_value(id))
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }

    pub fn diagnostics(&self) -> &[StoreDiagnostic] {
        &self.diagnostics
    }
}

/// Write `<path>.tmp` then rename over `path`, so a reader never sees a
/// partial file.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

/// Dedupe, keeping first-occurrence order.
fn unique_ids(device_ids: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    device_ids
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}
