//! Pipeline configuration, loaded once at startup and passed explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::SpecGuardError;
use crate::datasheets::parser::ResponseShape;
use crate::modeling::transmission::{ProtocolProfile, ProtocolTable};

/// Environment variable holding the Claude API key.
pub const CLAUDE_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Claude,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::Claude => write!(f, "claude"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub claude_model: Option<String>,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            ollama_url: crate::ai::ollama::DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: crate::ai::ollama::DEFAULT_MODEL.to_string(),
            claude_model: None,
            temperature: 0.0,
        }
    }
}

/// Options for pipeline runs (CLI or library callers).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `<device_id>.pdf` / `<device_id>.txt` source documents
    pub datasheet_dir: PathBuf,
    /// Directory of per-device `<device_id>.json` extraction results
    pub specs_dir: PathBuf,
    /// Plan file: JSON array of `{device_id, modules}`
    pub plan_file: PathBuf,
    /// Combined store: JSON object keyed by device id
    pub store_file: PathBuf,
    pub response_shape: ResponseShape,
    pub provider: ProviderConfig,
    /// Profiles added to (or replacing) the reference protocol table
    pub extra_protocols: Vec<ProtocolProfile>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            datasheet_dir: PathBuf::from("datasheet"),
            specs_dir: PathBuf::from("json"),
            plan_file: PathBuf::from("plan_devices.json"),
            store_file: PathBuf::from("device_specs.json"),
            response_shape: ResponseShape::Json,
            provider: ProviderConfig::default(),
            extra_protocols: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SpecGuardError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| SpecGuardError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reference protocol table extended with `extra_protocols`.
    pub fn protocol_table(&self) -> Result<ProtocolTable, SpecGuardError> {
        let mut table = ProtocolTable::reference();
        for profile in &self.extra_protocols {
            table
                .insert(profile.clone())
                .map_err(|e| SpecGuardError::Config(e.to_string()))?;
        }
        Ok(table)
    }

    /// Claude API key from the environment, if set and non-empty.
    pub fn claude_api_key() -> Option<String> {
        std::env::var(CLAUDE_API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
    }
}
