use super::config::ReadinessConfig;
use super::error::{PlanError, Result};
use super::types::Readiness;

#[derive(Debug, Clone, Default)]
pub struct ReadinessEvaluator {
    config: ReadinessConfig,
}

impl ReadinessEvaluator {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    /// Readiness is capped at 100; any excess over the goal shows up only in
    /// `surplus`.
    pub fn evaluate(&self, projected_corpus: f64, retirement_goal: f64) -> Result<Readiness> {
        if !retirement_goal.is_finite() || retirement_goal <= 0.0 {
            return Err(PlanError::invalid("retirement_goal", "must be > 0"));
        }
        if !projected_corpus.is_finite() {
            return Err(PlanError::invalid("projected_corpus", "must be finite"));
        }

        let readiness_percentage = (projected_corpus / retirement_goal * 100.0).clamp(0.0, 100.0);
        let shortfall = (retirement_goal - projected_corpus).max(0.0);
        let surplus = (projected_corpus - retirement_goal).max(0.0);

        Ok(Readiness {
            readiness_percentage,
            shortfall,
            surplus,
            confidence_label: self.config.label_for(readiness_percentage),
        })
    }
}
