pub mod claude;
pub mod ollama;
pub mod prompts;
pub mod provider;
pub mod router;

use thiserror::Error;

// Re-export for convenience
pub use claude::ClaudeClient;
pub use ollama::OllamaClient;
pub use provider::{CompletionService, ModelInfo, ProviderStatus};
pub use router::AIRouter;

#[derive(Debug, Error)]
pub enum AIError {
    #[error("API request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("Rate limited. Retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    #[error("Missing API key or no provider available")]
    MissingApiKey,
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}
