//! Feasibility evaluation
//!
//! The judgment itself is delegated to the completion service; this module
//! assembles the prompts and decodes the verdict it sends back.

use serde::{Deserialize, Serialize};

use crate::ai::{prompts, CompletionService};
use crate::core::SpecGuardError;
use crate::datasheets::parser::{decode_span, DecodeFailure};
use crate::datasheets::store::DeviceSpecStore;
use crate::feasibility::plan::{device_ids, ExecutionPlanEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityVerdict {
    pub energy_feasible: bool,
    pub transmission_feasible: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl FeasibilityVerdict {
    pub fn is_feasible(&self) -> bool {
        self.energy_feasible && self.transmission_feasible
    }
}

/// A decoded verdict, or the raw response when it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeasibilityOutcome {
    Verdict(FeasibilityVerdict),
    Raw { text: String, failure: DecodeFailure },
}

impl FeasibilityOutcome {
    pub fn verdict(&self) -> Option<&FeasibilityVerdict> {
        match self {
            FeasibilityOutcome::Verdict(v) => Some(v),
            FeasibilityOutcome::Raw { .. } => None,
        }
    }
}

/// Decode a judgment response with the brace-span strategy.
pub fn interpret_verdict(response: &str) -> FeasibilityOutcome {
    match decode_span::<FeasibilityVerdict>(response, '{', '}') {
        Ok(verdict) => FeasibilityOutcome::Verdict(verdict),
        Err(failure) => {
            tracing::warn!("Feasibility response was not a verdict ({})", failure);
            FeasibilityOutcome::Raw {
                text: response.trim().to_string(),
                failure,
            }
        }
    }
}

pub struct FeasibilityEvaluator<'a> {
    gateway: &'a dyn CompletionService,
}

impl<'a> FeasibilityEvaluator<'a> {
    pub fn new(gateway: &'a dyn CompletionService) -> Self {
        Self { gateway }
    }

    /// Plan plus the records of every plan device the store holds.
    pub fn context_block(
        plan: &[ExecutionPlanEntry],
        specs: &DeviceSpecStore,
    ) -> Result<String, SpecGuardError> {
        let plan_json = serde_json::to_string_pretty(plan)?;
        let specs_json = serde_json::to_string_pretty(&specs.subset(&device_ids(plan)))?;
        Ok(prompts::build_context_block(&plan_json, &specs_json))
    }

    /// Stateful gateways get a priming call whose reply is discarded, then a
    /// bare judgment prompt. Stateless gateways get one prompt carrying both.
    pub async fn evaluate(
        &self,
        plan: &[ExecutionPlanEntry],
        specs: &DeviceSpecStore,
    ) -> Result<FeasibilityOutcome, SpecGuardError> {
        let context = Self::context_block(plan, specs)?;

        let prompt = if self.gateway.is_stateful() {
            tracing::debug!("Priming {} with plan context", self.gateway.name());
            self.gateway
                .complete(&prompts::build_priming_prompt(&context))
                .await?;
            prompts::build_feasibility_prompt(None)
        } else {
            prompts::build_feasibility_prompt(Some(&context))
        };

        let response = self.gateway.complete(&prompt).await?;
        Ok(interpret_verdict(&response))
    }
}
