use serde::{Deserialize, Serialize};

use super::error::{FieldError, PlanError, Result};

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;

/// Fully populated financial profile. Built once per request after defaults
/// have been applied; components never see missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFinancialProfile {
    pub current_age: u32,
    pub retirement_age: u32,
    pub annual_income: f64,
    pub monthly_expenses: f64,
    pub current_savings: f64,
    pub monthly_savings: f64,
    pub retirement_goal: f64,
    pub expected_inflation_pct: f64,
    pub expected_return_pct: f64,
    /// Monthly employer contribution, added on top of `monthly_savings`.
    pub employer_match: f64,
    /// Monthly income expected from social security once retired.
    pub social_security_estimate: f64,
    /// Any other monthly retirement income (pension, rent).
    pub other_income: f64,
}

impl UserFinancialProfile {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !(MIN_AGE..=MAX_AGE).contains(&self.current_age) {
            errors.push(FieldError::new(
                "age",
                format!("must be between {MIN_AGE} and {MAX_AGE}"),
            ));
        }
        if self.retirement_age <= self.current_age {
            errors.push(FieldError::new("retirement_age", "must be > age"));
        } else if self.retirement_age > MAX_AGE {
            errors.push(FieldError::new(
                "retirement_age",
                format!("must be <= {MAX_AGE}"),
            ));
        }

        for (field, value) in [
            ("annual_income", self.annual_income),
            ("monthly_expenses", self.monthly_expenses),
            ("current_savings", self.current_savings),
            ("monthly_savings", self.monthly_savings),
            ("employer_match", self.employer_match),
            ("social_security_estimate", self.social_security_estimate),
            ("other_income", self.other_income),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(FieldError::new(field, "must be >= 0"));
            }
        }

        if !self.retirement_goal.is_finite() || self.retirement_goal <= 0.0 {
            errors.push(FieldError::new("retirement_goal", "must be > 0"));
        }

        for (field, value) in [
            ("expected_inflation", self.expected_inflation_pct),
            ("expected_returns", self.expected_return_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(FieldError::new(field, "must be between 0 and 100"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PlanError::InvalidInput(errors))
        }
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn monthly_contribution(&self) -> f64 {
        self.monthly_savings + self.employer_match
    }

    /// Annual savings as a percentage of annual income; 0 when there is no income.
    pub fn savings_rate_pct(&self) -> f64 {
        if self.annual_income > 0.0 {
            self.monthly_savings * 12.0 / self.annual_income * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readiness {
    pub readiness_percentage: f64,
    pub shortfall: f64,
    pub surplus: f64,
    pub confidence_label: ConfidenceLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub current_age: u32,
    pub retirement_age: u32,
    pub years_to_retirement: u32,
    pub current_savings: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub expected_returns: f64,
    pub projected_corpus: f64,
    pub inflation_adjusted_corpus: f64,
    pub retirement_goal: f64,
    pub readiness_percentage: f64,
    pub shortfall: f64,
    pub surplus: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RiskProfile {
    Aggressive,
    Moderate,
    Conservative,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Debt,
    FixedIncome,
    Gold,
}

impl AssetClass {
    pub fn display_name(self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity Mutual Funds",
            AssetClass::Debt => "Debt Mutual Funds",
            AssetClass::FixedIncome => "PPF/EPF",
            AssetClass::Gold => "Gold/Commodities",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationLine {
    pub asset_class: AssetClass,
    pub name: String,
    pub percentage: u32,
    pub monthly_amount: f64,
    /// `monthly_amount` in minor currency units; the split is done on these.
    #[serde(skip)]
    pub minor_units: i64,
    pub risk_label: String,
    pub expected_return_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub risk_profile: RiskProfile,
    pub lines: Vec<AllocationLine>,
    #[serde(skip)]
    pub currency_decimals: u32,
}

impl AllocationPlan {
    pub fn total_percentage(&self) -> u32 {
        self.lines.iter().map(|l| l.percentage).sum()
    }

    pub fn total_minor_units(&self) -> i64 {
        self.lines.iter().map(|l| l.minor_units).sum()
    }

    /// Summed in minor units, so the total is exact at the plan's precision.
    pub fn total_monthly_amount(&self) -> f64 {
        self.total_minor_units() as f64 / 10f64.powi(self.currency_decimals as i32)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySuggestion {
    pub title: String,
    pub description: String,
    #[serde(rename = "impact")]
    pub impact_level: ImpactLevel,
    pub timeframe: String,
    pub difficulty: Difficulty,
    #[serde(rename = "expected_benefit")]
    pub expected_benefit_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetirementIncome {
    pub annual_withdrawal: f64,
    pub monthly_withdrawal: f64,
    pub monthly_total: f64,
    pub inflation_adjusted_monthly: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub score: i32,
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub summary: String,
    pub readiness_score: f64,
    pub corpus: f64,
    pub confidence_level: ConfidenceLabel,
    pub key_insights: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// Everything one `/analyze` call produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub projection: ProjectionResult,
    pub analysis: AnalysisSummary,
    pub allocation: AllocationPlan,
    pub strategies: Vec<StrategySuggestion>,
    pub overall_priority: Priority,
    pub implementation_order: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub retirement_income: RetirementIncome,
    pub ai_enabled: bool,
    pub degraded: bool,
}

/// Ranked suggestions plus the headline priority derived from readiness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyReport {
    pub strategies: Vec<StrategySuggestion>,
    pub overall_priority: Priority,
    pub implementation_order: Vec<String>,
}

/// Profile fields a what-if scenario may replace. Absent fields keep the
/// base profile's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_returns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retirement_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retirement_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_match: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_inflation: Option<f64>,
}

impl ScenarioOverrides {
    pub fn apply(&self, base: &UserFinancialProfile) -> UserFinancialProfile {
        let mut profile = base.clone();
        if let Some(v) = self.monthly_savings {
            profile.monthly_savings = v;
        }
        if let Some(v) = self.expected_returns {
            profile.expected_return_pct = v;
        }
        if let Some(v) = self.retirement_age {
            profile.retirement_age = v;
        }
        if let Some(v) = self.current_savings {
            profile.current_savings = v;
        }
        if let Some(v) = self.retirement_goal {
            profile.retirement_goal = v;
        }
        if let Some(v) = self.employer_match {
            profile.employer_match = v;
        }
        if let Some(v) = self.expected_inflation {
            profile.expected_inflation_pct = v;
        }
        profile
    }
}

/// Simulated minus original.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionDiff {
    pub corpus_difference: f64,
    pub readiness_difference: f64,
    pub shortfall_change: f64,
    pub surplus_change: f64,
}

impl ProjectionDiff {
    pub fn between(original: &ProjectionResult, simulated: &ProjectionResult) -> Self {
        Self {
            corpus_difference: simulated.projected_corpus - original.projected_corpus,
            readiness_difference: simulated.readiness_percentage - original.readiness_percentage,
            shortfall_change: simulated.shortfall - original.shortfall,
            surplus_change: simulated.surplus - original.surplus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub original_projection: ProjectionResult,
    pub simulated_projection: ProjectionResult,
    pub differences: ProjectionDiff,
    pub recommendations: Vec<String>,
    pub modified_parameters: ScenarioOverrides,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> UserFinancialProfile {
        UserFinancialProfile {
            current_age: 35,
            retirement_age: 65,
            annual_income: 75_000.0,
            monthly_expenses: 4_000.0,
            current_savings: 50_000.0,
            monthly_savings: 1_000.0,
            retirement_goal: 1_000_000.0,
            expected_inflation_pct: 3.0,
            expected_return_pct: 6.0,
            employer_match: 0.0,
            social_security_estimate: 2_000.0,
            other_income: 0.0,
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(sample_profile().validate().is_ok());
    }

    #[test]
    fn retirement_age_must_exceed_current_age() {
        let mut profile = sample_profile();
        profile.retirement_age = profile.current_age;
        let err = profile.validate().expect_err("must reject age ordering");
        assert_eq!(err.fields(), vec!["retirement_age"]);
    }

    #[test]
    fn collects_every_offending_field() {
        let mut profile = sample_profile();
        profile.current_age = 12;
        profile.monthly_savings = -1.0;
        profile.retirement_goal = 0.0;
        profile.expected_return_pct = f64::NAN;

        let err = profile.validate().expect_err("must reject");
        assert_eq!(
            err.fields(),
            vec!["age", "monthly_savings", "retirement_goal", "expected_returns"]
        );
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let mut profile = sample_profile();
        profile.annual_income = 0.0;
        assert_eq!(profile.savings_rate_pct(), 0.0);

        profile.annual_income = 120_000.0;
        profile.monthly_savings = 2_000.0;
        assert!((profile.savings_rate_pct() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn overrides_replace_only_named_fields() {
        let base = sample_profile();
        let overrides = ScenarioOverrides {
            monthly_savings: Some(1_500.0),
            retirement_age: Some(67),
            ..ScenarioOverrides::default()
        };
        let modified = overrides.apply(&base);
        assert_eq!(modified.monthly_savings, 1_500.0);
        assert_eq!(modified.retirement_age, 67);
        assert_eq!(modified.current_savings, base.current_savings);
        assert_eq!(modified.expected_return_pct, base.expected_return_pct);
        assert_eq!(ScenarioOverrides::default().apply(&base), base);
    }

    #[test]
    fn impact_and_difficulty_order_for_ranking() {
        assert!(ImpactLevel::High > ImpactLevel::Medium);
        assert!(ImpactLevel::Medium > ImpactLevel::Low);
        assert!(Difficulty::Easy < Difficulty::Hard);
    }
}
