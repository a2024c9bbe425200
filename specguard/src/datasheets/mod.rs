//! Datasheet extraction pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │    Source    │───▶│  Normalizer  │───▶│  Completion  │───▶│   Response   │
//! │ (PDF / text) │    │              │    │   Service    │    │    Parser    │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────┬───────┘
//!                                                                    │
//!                                                                    ▼
//!                                                            ┌──────────────┐
//!                                                            │  Device Spec │
//!                                                            │    Store     │
//!                                                            └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use specguard::datasheets::{DatasheetDirectory, DeviceSpecStore, Extractor, ResponseShape};
//!
//! let extractor = Extractor::new(gateway.as_ref(), ResponseShape::Json);
//! let store = DeviceSpecStore::build_or_load(
//!     Path::new("device_specs.json"),
//!     &device_ids,
//!     &DatasheetDirectory::new("datasheet"),
//!     &extractor,
//! ).await?;
//!
//! for diagnostic in store.diagnostics() {
//!     println!("{}", diagnostic);
//! }
//! ```

pub mod extractor;
pub mod normalizer;
pub mod parser;
pub mod schema;
pub mod source;
pub mod store;

// Re-exports for convenience
pub use extractor::Extractor;
pub use normalizer::normalize;
pub use parser::{DecodeFailure, ParsedResponse, ResponseShape};
pub use schema::{ExtractedSpec, SpecMap, SpecificationRecord};
pub use source::{discover_datasheets, DatasheetDirectory, SourceDocument, SourceKind, SourceProvider};
pub use store::{DeviceSpecStore, StoreDiagnostic};
