//! Deployment plan feasibility.

pub mod evaluator;
pub mod plan;

pub use evaluator::{interpret_verdict, FeasibilityEvaluator, FeasibilityOutcome, FeasibilityVerdict};
pub use plan::{
    device_ids, load_plan, parse_execution_plan, save_plan, ExecutionPlan, ExecutionPlanEntry,
};
