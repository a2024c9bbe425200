//! SpecGuard - datasheet specification extraction and IoT plan feasibility
//!
//! This library turns device datasheets into structured specification
//! records through a text completion service, recovering locally when the
//! service returns malformed output, and uses those records to estimate
//! radio energy and to request a feasibility verdict for a deployment plan.
//!
//! # Quick Start
//!
//! ```no_run
//! use specguard::prelude::*;
//!
//! let response = r#"{"Specification": {"Operating Voltage": "5 V"}, "notes": []}"#;
//! let parsed = specguard::datasheets::parser::parse(response, ResponseShape::Json);
//! let energy = specguard::modeling::estimate(&parsed.spec.specification, "BLE").unwrap();
//!
//! println!("{} mJ per exchange", energy.total_energy_mj);
//! ```
//!
//! # Features
//!
//! - **Extraction**: text normalization, prompt assembly, two response parsers
//! - **Store**: compute-once combined store and per-device batch conversion
//! - **Models**: fixed-window energy estimate, protocol reference table
//! - **Feasibility**: plan parsing and verdict requests via Ollama or Claude

pub mod ai;
pub mod config;
pub mod core;
pub mod datasheets;
pub mod feasibility;
pub mod modeling;

// Re-export main types
pub use crate::core::{ConversionReport, SpecGuardCore, SpecGuardError};
pub use ai::{AIError, AIRouter, CompletionService};
pub use config::PipelineConfig;
pub use datasheets::{
    DeviceSpecStore, ExtractedSpec, Extractor, ResponseShape, SpecificationRecord, StoreDiagnostic,
};
pub use feasibility::{ExecutionPlanEntry, FeasibilityOutcome, FeasibilityVerdict};
pub use modeling::{DeviceEstimate, EnergyEstimate, ProtocolProfile, ProtocolTable};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CompletionService, DeviceSpecStore, ExecutionPlanEntry, Extractor, FeasibilityOutcome,
        PipelineConfig, ProtocolTable, ResponseShape, SpecGuardCore, SpecGuardError,
        SpecificationRecord,
    };
}
