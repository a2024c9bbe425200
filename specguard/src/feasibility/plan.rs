//! Execution plans: which devices a deployment activates and the modules
//! requested from each.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::ai::{prompts, AIError, CompletionService};
use crate::core::SpecGuardError;
use crate::datasheets::parser::decode_span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlanEntry {
    pub device_id: String,
    #[serde(default)]
    pub modules: BTreeSet<String>,
}

pub type ExecutionPlan = Vec<ExecutionPlanEntry>;

/// Device ids in plan order.
pub fn device_ids(plan: &[ExecutionPlanEntry]) -> Vec<String> {
    plan.iter().map(|e| e.device_id.clone()).collect()
}

pub fn load_plan(path: &Path) -> Result<ExecutionPlan, SpecGuardError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_plan(path: &Path, plan: &[ExecutionPlanEntry]) -> Result<(), SpecGuardError> {
    std::fs::write(path, serde_json::to_string_pretty(plan)?)?;
    tracing::info!("Saved devices and modules to {}", path.display());
    Ok(())
}

/// Ask the completion service to turn a free-form plan into entries.
///
/// Unusable output yields an empty plan; only gateway failures are errors.
pub async fn parse_execution_plan(
    plan_text: &str,
    gateway: &dyn CompletionService,
) -> Result<ExecutionPlan, AIError> {
    let prompt = prompts::build_plan_parsing_prompt(plan_text);
    let output = gateway.complete(&prompt).await?;

    match decode_span::<ExecutionPlan>(output.trim(), '[', ']') {
        Ok(plan) => Ok(plan
            .into_iter()
            .map(|mut e| {
                e.device_id = e.device_id.trim().to_string();
                e
            })
            .filter(|e| !e.device_id.is_empty())
            .collect()),
        Err(failure) => {
            tracing::warn!("Plan output is not valid JSON ({}). Raw output:\n{}", failure, output);
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::ai::ModelInfo;

    struct Canned(&'static str);

    #[async_trait]
    impl CompletionService for Canned {
        fn name(&self) -> &str {
            "canned"
        }
        async fn is_available(&self) -> bool {
            true
        }
        async fn complete(&self, _prompt: &str) -> Result<String, AIError> {
            Ok(self.0.to_string())
        }
        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                provider: "canned".to_string(),
                model_name: "canned".to_string(),
                is_local: true,
                context_window: 0,
                supports_json: true,
            }
        }
    }

    #[tokio::test]
    async fn test_parse_plan_with_prose() {
        let gateway = Canned(
            "Sure! Here it is:\n[{\"device_id\": \" DFR0034 \", \"modules\": [\"camera\", \"camera\"]}, {\"device_id\": \"SEN0203\"}]",
        );
        let plan = parse_execution_plan("devices:\n  - DFR0034\n    - camera", &gateway)
            .await
            .unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].device_id, "DFR0034");
        assert_eq!(plan[0].modules.len(), 1);
        assert!(plan[1].modules.is_empty());
    }

    #[tokio::test]
    async fn test_unusable_output_gives_empty_plan() {
        let plan = parse_execution_plan("x", &Canned("I cannot help with that."))
            .await
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_save_and_load_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan_devices.json");
        let plan = vec![ExecutionPlanEntry {
            device_id: "esp32-003".to_string(),
            modules: ["Camera".to_string()].into_iter().collect(),
        }];

        save_plan(&path, &plan).unwrap();
        assert_eq!(load_plan(&path).unwrap(), plan);
        assert_eq!(device_ids(&plan), vec!["esp32-003".to_string()]);
    }
}
