use std::sync::Arc;

use log::debug;

use super::allocation::AllocationRecommender;
use super::config::PlannerConfig;
use super::error::Result;
use super::format::amount;
use super::projector::{Projector, inflation_adjusted};
use super::readiness::ReadinessEvaluator;
use super::solver::required_monthly_contribution;
use super::strategy::StrategyGenerator;
use super::types::{
    AnalysisReport, AnalysisSummary, Priority, ProjectionDiff, ProjectionResult, Readiness,
    RetirementIncome, RiskAssessment, RiskLevel, ScenarioOverrides, SimulationReport,
    StrategyReport, UserFinancialProfile,
};

const LOW_SAVINGS_RATE_PCT: f64 = 10.0;
const MODERATE_SAVINGS_RATE_PCT: f64 = 15.0;

/// Composes the projector, evaluator, recommender and strategy rules behind
/// one immutable value that request handlers share.
pub struct Planner {
    config: PlannerConfig,
    projector: Arc<dyn Projector>,
    evaluator: ReadinessEvaluator,
    recommender: AllocationRecommender,
    strategies: StrategyGenerator,
}

impl Planner {
    /// Validates `config` before building anything from it, so a planner
    /// never holds thresholds or tables it cannot use.
    pub fn new(config: PlannerConfig, projector: Arc<dyn Projector>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            evaluator: ReadinessEvaluator::new(config.readiness.clone()),
            recommender: AllocationRecommender::new(config.allocation.clone()),
            strategies: StrategyGenerator::new(
                config.strategy.clone(),
                config.allocation.clone(),
                Arc::clone(&projector),
            ),
            projector,
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &'static str {
        self.projector.name()
    }

    /// `false` when results come from the degraded projector.
    pub fn full_fidelity(&self) -> bool {
        self.projector.full_fidelity()
    }

    pub fn project(&self, profile: &UserFinancialProfile) -> Result<ProjectionResult> {
        profile.validate()?;
        let (projection, _) = self.project_validated(profile)?;
        Ok(projection)
    }

    pub fn analyze(&self, profile: &UserFinancialProfile) -> Result<AnalysisReport> {
        profile.validate()?;
        let (projection, readiness) = self.project_validated(profile)?;

        let allocation = self.recommender.recommend(
            profile.current_age,
            projection.years_to_retirement,
            profile.monthly_savings,
        )?;
        let strategies = self.strategy_report(profile, &projection)?;

        Ok(AnalysisReport {
            analysis: self.summarize(profile, &projection, &readiness)?,
            risk_assessment: self.assess_risk(profile),
            retirement_income: self.retirement_income(profile, &projection),
            allocation,
            overall_priority: strategies.overall_priority,
            implementation_order: strategies.implementation_order,
            strategies: strategies.strategies,
            projection,
            ai_enabled: self.full_fidelity(),
            degraded: !self.full_fidelity(),
        })
    }

    pub fn suggest(&self, profile: &UserFinancialProfile) -> Result<StrategyReport> {
        profile.validate()?;
        let (projection, _) = self.project_validated(profile)?;
        self.strategy_report(profile, &projection)
    }

    /// Re-runs the projection with `overrides` applied and compares it with
    /// the unmodified profile.
    pub fn simulate(
        &self,
        profile: &UserFinancialProfile,
        overrides: &ScenarioOverrides,
    ) -> Result<SimulationReport> {
        let original = self.project(profile)?;
        let simulated = self.project(&overrides.apply(profile))?;
        let differences = ProjectionDiff::between(&original, &simulated);

        let mut recommendations = Vec::new();
        if differences.corpus_difference > 0.0 {
            recommendations.push(format!(
                "Positive impact: corpus increases by {}",
                amount(differences.corpus_difference)
            ));
        } else if differences.corpus_difference < 0.0 {
            recommendations.push(format!(
                "Negative impact: corpus decreases by {}",
                amount(-differences.corpus_difference)
            ));
        }
        if differences.readiness_difference > 0.0 {
            recommendations.push(format!(
                "Readiness improves by {:.1} percentage points",
                differences.readiness_difference
            ));
        } else if differences.readiness_difference < 0.0 {
            recommendations.push(format!(
                "Readiness decreases by {:.1} percentage points",
                -differences.readiness_difference
            ));
        }
        let outcome = if simulated.readiness_percentage >= 100.0 {
            "This scenario would achieve your retirement goal"
        } else if simulated.readiness_percentage >= self.config.readiness.high_at {
            "This scenario gets you close to your retirement goal"
        } else {
            "This scenario still falls short of your retirement goal"
        };
        recommendations.push(outcome.to_string());

        Ok(SimulationReport {
            original_projection: original,
            simulated_projection: simulated,
            differences,
            recommendations,
            modified_parameters: overrides.clone(),
        })
    }

    fn project_validated(
        &self,
        profile: &UserFinancialProfile,
    ) -> Result<(ProjectionResult, Readiness)> {
        let years = profile.years_to_retirement();
        let corpus = self.projector.project(
            profile.current_savings,
            profile.monthly_contribution(),
            profile.expected_return_pct,
            years,
        )?;
        let readiness = self.evaluator.evaluate(corpus, profile.retirement_goal)?;
        debug!(
            "{}: {years} years -> corpus {corpus:.2}, readiness {:.2}%",
            self.projector.name(),
            readiness.readiness_percentage
        );

        let projection = ProjectionResult {
            current_age: profile.current_age,
            retirement_age: profile.retirement_age,
            years_to_retirement: years,
            current_savings: profile.current_savings,
            monthly_savings: profile.monthly_savings,
            annual_savings: profile.monthly_savings * 12.0,
            expected_returns: profile.expected_return_pct,
            projected_corpus: corpus,
            inflation_adjusted_corpus: inflation_adjusted(
                corpus,
                profile.expected_inflation_pct,
                years,
            ),
            retirement_goal: profile.retirement_goal,
            readiness_percentage: readiness.readiness_percentage,
            shortfall: readiness.shortfall,
            surplus: readiness.surplus,
        };
        Ok((projection, readiness))
    }

    fn strategy_report(
        &self,
        profile: &UserFinancialProfile,
        projection: &ProjectionResult,
    ) -> Result<StrategyReport> {
        let strategies = self.strategies.suggest(profile, projection)?;
        Ok(StrategyReport {
            overall_priority: overall_priority(projection.readiness_percentage),
            implementation_order: strategies.iter().map(|s| s.title.clone()).collect(),
            strategies,
        })
    }

    fn summarize(
        &self,
        profile: &UserFinancialProfile,
        projection: &ProjectionResult,
        readiness: &Readiness,
    ) -> Result<AnalysisSummary> {
        let pct = projection.readiness_percentage;
        let years = projection.years_to_retirement;
        let shortfall = amount(projection.shortfall);

        let summary = if pct >= 100.0 {
            format!(
                "You are on track to exceed your retirement goal by {}. The projected corpus of \
                 {} fully covers your {} target.",
                amount(projection.surplus),
                amount(projection.projected_corpus),
                amount(projection.retirement_goal),
            )
        } else if pct >= 80.0 {
            format!(
                "Great progress: you are {pct:.1}% ready for retirement and need {shortfall} more \
                 to reach your goal of {}.",
                amount(projection.retirement_goal),
            )
        } else if pct >= 60.0 {
            format!(
                "Good foundation: you are {pct:.1}% ready. Reaching the {} goal needs higher \
                 savings or a longer timeline.",
                amount(projection.retirement_goal),
            )
        } else if pct >= 40.0 {
            format!(
                "Needs attention: you are only {pct:.1}% ready. Consider saving more each month \
                 or adjusting your retirement goal."
            )
        } else {
            format!(
                "Critical: you are only {pct:.1}% ready. Immediate action is required to secure \
                 your retirement."
            )
        };

        let mut key_insights = Vec::new();
        if pct >= 100.0 {
            key_insights.push(format!(
                "Goal achieved with a {} surplus beyond your retirement needs",
                amount(projection.surplus)
            ));
            key_insights.push("Consider early retirement or a more ambitious goal".to_string());
        } else if pct >= 80.0 {
            key_insights.push(format!("Almost there: a {shortfall} shortfall remains"));
            key_insights
                .push("A small increase in savings or returns can bridge the gap".to_string());
        } else if pct >= 60.0 {
            key_insights.push(format!("Moderate progress: the {shortfall} shortfall needs attention"));
            key_insights.push(
                "Consider raising monthly savings by 10-20% or extending the retirement age"
                    .to_string(),
            );
        } else {
            key_insights.push(format!("Significant gap: {shortfall} shortfall needs urgent action"));
            key_insights.push(
                "Consider major lifestyle changes or a longer retirement timeline".to_string(),
            );
        }

        if profile.current_age < 30 {
            key_insights.push(format!(
                "Young age advantage: {years} years of compound growth ahead"
            ));
        } else if profile.current_age < 45 {
            key_insights.push(format!("Mid-career: {years} years to retirement"));
        } else {
            key_insights.push(format!(
                "Approaching retirement: {years} years left, favour capital protection"
            ));
        }

        let savings_rate = profile.savings_rate_pct();
        if profile.annual_income > 0.0 {
            if savings_rate < MODERATE_SAVINGS_RATE_PCT {
                let suggested = profile.annual_income * MODERATE_SAVINGS_RATE_PCT / 100.0 / 12.0;
                key_insights.push(format!(
                    "Raise monthly savings to {} ({MODERATE_SAVINGS_RATE_PCT:.0}% of income) for \
                     better security",
                    amount(suggested)
                ));
            } else if savings_rate < self.config.strategy.target_savings_rate_pct {
                key_insights.push(format!(
                    "Good savings rate of {savings_rate:.1}%; aim for {:.0}%",
                    self.config.strategy.target_savings_rate_pct
                ));
            } else {
                key_insights.push(format!("Excellent savings rate of {savings_rate:.1}%"));
            }
        }

        if projection.shortfall > 0.0 {
            let required = required_monthly_contribution(
                self.projector.as_ref(),
                profile.retirement_goal,
                profile.current_savings,
                profile.expected_return_pct,
                years,
            )?;
            key_insights.push(format!(
                "To reach your goal, save {} per month in total",
                amount(required)
            ));
        } else {
            key_insights.push(format!(
                "Current monthly savings of {} are on track",
                amount(profile.monthly_contribution())
            ));
        }

        let mut risk_factors = Vec::new();
        if pct < self.config.readiness.medium_at {
            risk_factors.push("Low retirement readiness requires immediate action".to_string());
        }
        if profile.current_age > self.config.risk.older_age_above {
            risk_factors
                .push("Short time horizon calls for a conservative investment approach".to_string());
        }
        if profile.current_age < 35 && pct < 30.0 {
            risk_factors.push("Low readiness at a young age: start aggressive planning now".to_string());
        }
        if years < self.config.risk.short_horizon_below {
            risk_factors.push(format!(
                "Only {years} years remain to recover from a market downturn"
            ));
        }
        if profile.expected_inflation_pct >= profile.expected_return_pct {
            risk_factors.push(format!(
                "Expected inflation of {:.1}% matches or exceeds the {:.1}% expected return",
                profile.expected_inflation_pct, profile.expected_return_pct
            ));
        } else {
            risk_factors.push(format!(
                "{:.1}% inflation leaves the corpus worth {} in today's money",
                profile.expected_inflation_pct,
                amount(projection.inflation_adjusted_corpus)
            ));
        }

        Ok(AnalysisSummary {
            summary,
            readiness_score: pct,
            corpus: projection.projected_corpus,
            confidence_level: readiness.confidence_label,
            key_insights,
            risk_factors,
        })
    }

    fn assess_risk(&self, profile: &UserFinancialProfile) -> RiskAssessment {
        let rules = &self.config.risk;
        let mut score = 0;
        let mut factors = Vec::new();

        if profile.current_age < rules.young_age_below {
            score += 1;
        } else if profile.current_age > rules.older_age_above {
            score += 3;
        }

        let savings_rate = profile.savings_rate_pct();
        if savings_rate < LOW_SAVINGS_RATE_PCT {
            score += 3;
            factors.push("Low savings rate".to_string());
        } else if savings_rate < MODERATE_SAVINGS_RATE_PCT {
            score += 2;
            factors.push("Moderate savings rate".to_string());
        } else if savings_rate >= self.config.strategy.target_savings_rate_pct {
            score -= 1;
            factors.push("Excellent savings rate".to_string());
        }

        if profile.annual_income < rules.low_income_below {
            score += 2;
            factors.push("Lower income level".to_string());
        } else if profile.annual_income > rules.high_income_above {
            score -= 1;
            factors.push("Higher income level".to_string());
        }

        let years = profile.years_to_retirement();
        if years < rules.short_horizon_below {
            score += 3;
            factors.push("Short time to retirement".to_string());
        } else if years > rules.long_horizon_above {
            score -= 1;
            factors.push("Long time horizon".to_string());
        }

        let level = rules.level_for(score);
        let recommendations = match level {
            RiskLevel::High => [
                "Consider increasing your savings rate",
                "Review your investment strategy for higher returns",
                "Consider working longer or reducing retirement expenses",
            ],
            RiskLevel::Medium => [
                "Monitor your progress regularly",
                "Consider optimizing your investment allocation",
                "Look for opportunities to increase income or reduce expenses",
            ],
            RiskLevel::Low => [
                "Maintain your current strategy",
                "Consider more aggressive investments if comfortable with risk",
                "Review and rebalance your portfolio regularly",
            ],
        }
        .iter()
        .map(|s| s.to_string())
        .collect();

        RiskAssessment {
            score,
            level,
            factors,
            recommendations,
        }
    }

    fn retirement_income(
        &self,
        profile: &UserFinancialProfile,
        projection: &ProjectionResult,
    ) -> RetirementIncome {
        let annual_withdrawal =
            projection.projected_corpus * self.config.income.safe_withdrawal_rate_pct / 100.0;
        let monthly_withdrawal = annual_withdrawal / 12.0;
        let monthly_total =
            monthly_withdrawal + profile.social_security_estimate + profile.other_income;
        RetirementIncome {
            annual_withdrawal,
            monthly_withdrawal,
            monthly_total,
            inflation_adjusted_monthly: inflation_adjusted(
                monthly_total,
                profile.expected_inflation_pct,
                projection.years_to_retirement,
            ),
        }
    }
}

pub fn overall_priority(readiness_percentage: f64) -> Priority {
    if readiness_percentage < 50.0 {
        Priority::Critical
    } else if readiness_percentage < 80.0 {
        Priority::High
    } else if readiness_percentage < 100.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}
