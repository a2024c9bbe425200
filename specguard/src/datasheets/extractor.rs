//! Extraction path: normalize, prompt, complete, parse.

use crate::ai::prompts;
use crate::ai::{AIError, CompletionService};
use crate::datasheets::normalizer::normalize;
use crate::datasheets::parser::{self, ParsedResponse, ResponseShape};

/// Runs one completion round trip per document.
pub struct Extractor<'a> {
    gateway: &'a dyn CompletionService,
    shape: ResponseShape,
}

impl<'a> Extractor<'a> {
    pub fn new(gateway: &'a dyn CompletionService, shape: ResponseShape) -> Self {
        Self { gateway, shape }
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    pub fn build_prompt(&self, raw_text: &str) -> String {
        let cleaned = normalize(raw_text);
        match self.shape {
            ResponseShape::Json => prompts::build_json_extraction_prompt(&cleaned),
            ResponseShape::Lines => prompts::build_lines_extraction_prompt(&cleaned),
        }
    }

    /// Gateway errors propagate; malformed output never does.
    pub async fn extract(&self, device_id: &str, raw_text: &str) -> Result<ParsedResponse, AIError> {
        let prompt = self.build_prompt(raw_text);
        tracing::debug!("Extracting {} via {}", device_id, self.gateway.name());

        let response = self.gateway.complete(&prompt).await?;
        let parsed = parser::parse(&response, self.shape);

        if let Some(ref failure) = parsed.fallback {
            tracing::warn!(
                "Completion output for {} was not structured ({}); kept raw text in notes",
                device_id,
                failure
            );
        }
        Ok(parsed)
    }
}
