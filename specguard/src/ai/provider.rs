//! Completion Service Trait
//!
//! Defines the single seam between the extraction pipeline and a text
//! completion backend (Ollama, Claude, or a scripted stand-in in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ai::AIError;

/// Information about an AI model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Provider name (e.g., "claude", "ollama")
    pub provider: String,

    /// Model name (e.g., "llama3", "claude-sonnet-4-20250514")
    pub model_name: String,

    /// Whether this is a local model
    pub is_local: bool,

    /// Context window size in tokens
    pub context_window: usize,

    /// Whether the model reliably outputs JSON
    pub supports_json: bool,
}

/// A text completion backend: given a prompt, returns a string.
///
/// Output is never assumed to be well-formed; callers run it through
/// [`crate::datasheets::parser`] before treating it as structured data.
/// Implementations own any retry or timeout policy.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Check if the provider is available/configured
    async fn is_available(&self) -> bool;

    /// Send one prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String, AIError>;

    /// Whether earlier prompts stay in context for later calls.
    ///
    /// Stateless backends receive all context inside every prompt.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Get model info
    fn model_info(&self) -> ModelInfo;
}

/// Status of AI providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub claude_configured: bool,
    pub ollama_available: bool,
    pub ollama_models: Vec<String>,
    pub preferred: String,
    pub active_provider: Option<String>,
    pub active_model: Option<ModelInfo>,
}
