//! AI Router
//!
//! Picks a completion backend by preference and availability, falling
//! back to the other configured provider.

use std::sync::Arc;

use crate::ai::claude::ClaudeClient;
use crate::ai::ollama::OllamaClient;
use crate::ai::provider::{CompletionService, ProviderStatus};
use crate::ai::AIError;
use crate::config::{ProviderConfig, ProviderKind};

/// Router that manages multiple AI providers
pub struct AIRouter {
    claude_client: Option<Arc<ClaudeClient>>,
    ollama_client: Option<Arc<OllamaClient>>,
    preferred_provider: ProviderKind,
}

impl AIRouter {
    /// Create a new router with no providers configured
    pub fn new() -> Self {
        Self {
            claude_client: None,
            ollama_client: None,
            preferred_provider: ProviderKind::Ollama,
        }
    }

    /// Build a router from configuration. Ollama is always configured;
    /// Claude only when an API key is supplied.
    pub fn from_config(config: &ProviderConfig, claude_api_key: Option<String>) -> Self {
        let mut router = Self::new();
        router.set_ollama_config(
            Some(config.ollama_url.clone()),
            Some(config.ollama_model.clone()),
            config.temperature,
        );
        if let Some(key) = claude_api_key {
            router.set_claude_api_key(key, config.claude_model.clone());
        }
        router.preferred_provider = config.kind;
        router
    }

    /// Configure the Claude client with an API key
    pub fn set_claude_api_key(&mut self, key: String, model: Option<String>) {
        if key.is_empty() {
            self.claude_client = None;
            return;
        }
        let mut client = ClaudeClient::new(key);
        if let Some(model) = model {
            client = client.with_model(model);
        }
        self.claude_client = Some(Arc::new(client));
    }

    /// Configure the Ollama client
    pub fn set_ollama_config(&mut self, url: Option<String>, model: Option<String>, temperature: f32) {
        self.ollama_client = Some(Arc::new(
            OllamaClient::new(url, model).with_temperature(temperature),
        ));
    }

    pub fn preferred_provider(&self) -> ProviderKind {
        self.preferred_provider
    }

    /// Get the best available provider based on preference and availability
    pub async fn get_provider(&self) -> Option<Arc<dyn CompletionService>> {
        match self.preferred_provider {
            ProviderKind::Ollama => {
                if let Some(ref client) = self.ollama_client {
                    if client.is_available().await {
                        return Some(client.clone() as Arc<dyn CompletionService>);
                    }
                }
                if let Some(ref client) = self.claude_client {
                    return Some(client.clone() as Arc<dyn CompletionService>);
                }
            }
            ProviderKind::Claude => {
                if let Some(ref client) = self.claude_client {
                    return Some(client.clone() as Arc<dyn CompletionService>);
                }
                if let Some(ref client) = self.ollama_client {
                    if client.is_available().await {
                        return Some(client.clone() as Arc<dyn CompletionService>);
                    }
                }
            }
        }

        None
    }

    /// Like [`get_provider`](Self::get_provider), but an error when nothing is usable
    pub async fn require_provider(&self) -> Result<Arc<dyn CompletionService>, AIError> {
        let provider = self.get_provider().await.ok_or(AIError::MissingApiKey)?;
        tracing::info!("Using AI provider: {}", provider.name());
        Ok(provider)
    }

    /// Get the status of all providers
    pub async fn get_status(&self) -> ProviderStatus {

        let ollama_available = match self.ollama_client {
            Some(ref client) => client.is_available().await,
            None => false,
        };

        let ollama_models = match self.ollama_client {
            Some(ref client) => client.list_models().await.unwrap_or_default(),
            None => vec![],
        };

        let active = self.get_provider().await;

        ProviderStatus {
            claude_configured: self.claude_client.is_some(),
            ollama_available,
            ollama_models,
            preferred: self.preferred_provider.to_string(),
            active_provider: active.as_ref().map(|p| p.name().to_string()),
            active_model: active.map(|p| p.model_info()),
        }
    }
}

impl Default for AIRouter {
    fn default() -> Self {
        Self::new()
    }
}
