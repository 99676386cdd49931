mod allocation;
mod config;
mod engine;
mod error;
mod format;
mod projector;
mod readiness;
mod solver;
mod strategy;
mod types;

pub use allocation::AllocationRecommender;
pub use config::{
    AllocationConfig, AllocationTarget, IncomeConfig, PlannerConfig, ReadinessConfig,
    RequestDefaults, RiskScoringConfig, StrategyConfig,
};
pub use engine::{Planner, overall_priority};
pub use error::{FieldError, PlanError, Result};
pub use projector::{CompoundProjector, FallbackProjector, Projector, inflation_adjusted};
pub use readiness::ReadinessEvaluator;
pub use solver::{
    ReturnSolveConfig, ReturnSolveResult, earliest_feasible_age, monthly_contribution_for_gap,
    required_monthly_contribution, solve_required_return,
};
pub use strategy::StrategyGenerator;
pub use types::{
    AllocationLine, AllocationPlan, AnalysisReport, AnalysisSummary, AssetClass, ConfidenceLabel,
    Difficulty, ImpactLevel, MAX_AGE, MIN_AGE, Priority, ProjectionDiff, ProjectionResult,
    Readiness, RetirementIncome, RiskAssessment, RiskLevel, RiskProfile, ScenarioOverrides,
    SimulationReport, StrategyReport, StrategySuggestion, UserFinancialProfile,
};
