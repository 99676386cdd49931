use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{PlanError, Result};
use super::types::{AssetClass, ConfidenceLabel, RiskLevel, RiskProfile};

/// Tunable policy for the whole planner. Every field has a default, so a
/// config file only needs to name what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub readiness: ReadinessConfig,
    pub allocation: AllocationConfig,
    pub strategy: StrategyConfig,
    pub risk: RiskScoringConfig,
    pub income: IncomeConfig,
    pub defaults: RequestDefaults,
}

impl PlannerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: PlannerConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.readiness.validate()?;
        self.allocation.validate()?;
        self.strategy.validate()?;
        if !(self.income.safe_withdrawal_rate_pct > 0.0
            && self.income.safe_withdrawal_rate_pct <= 100.0)
        {
            return Err(PlanError::Config(
                "income.safe_withdrawal_rate_pct must be in (0, 100]".to_string(),
            ));
        }
        self.risk.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Readiness below this is `Low`.
    pub medium_at: f64,
    /// Readiness at or above this is `High`.
    pub high_at: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            medium_at: 50.0,
            high_at: 80.0,
        }
    }
}

impl ReadinessConfig {
    pub fn label_for(&self, readiness_percentage: f64) -> ConfidenceLabel {
        if readiness_percentage >= self.high_at {
            ConfidenceLabel::High
        } else if readiness_percentage >= self.medium_at {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.medium_at) || !(0.0..=100.0).contains(&self.high_at) {
            return Err(PlanError::Config(
                "readiness thresholds must be between 0 and 100".to_string(),
            ));
        }
        if self.medium_at > self.high_at {
            return Err(PlanError::Config(
                "readiness.medium_at cannot exceed readiness.high_at".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationTarget {
    pub asset_class: AssetClass,
    pub percentage: u32,
    pub risk_label: String,
    pub expected_return_range: String,
}

impl AllocationTarget {
    fn new(asset_class: AssetClass, percentage: u32) -> Self {
        let (risk_label, expected_return_range) = match asset_class {
            AssetClass::Equity => ("High", "12-15%"),
            AssetClass::Debt => ("Low", "7-9%"),
            AssetClass::FixedIncome => ("Very Low", "7-8%"),
            AssetClass::Gold => ("Medium", "8-10%"),
        };
        Self {
            asset_class,
            percentage,
            risk_label: risk_label.to_string(),
            expected_return_range: expected_return_range.to_string(),
        }
    }
}

fn split(equity: u32, debt: u32, fixed_income: u32, gold: u32) -> Vec<AllocationTarget> {
    vec![
        AllocationTarget::new(AssetClass::Equity, equity),
        AllocationTarget::new(AssetClass::Debt, debt),
        AllocationTarget::new(AssetClass::FixedIncome, fixed_income),
        AllocationTarget::new(AssetClass::Gold, gold),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Horizons strictly above this many years are `Aggressive`.
    pub aggressive_above_years: u32,
    /// Horizons strictly below this many years are `Conservative`.
    pub conservative_below_years: u32,
    /// Decimal places of the currency minor unit used for monthly amounts.
    pub currency_decimals: u32,
    pub aggressive: Vec<AllocationTarget>,
    pub moderate: Vec<AllocationTarget>,
    pub conservative: Vec<AllocationTarget>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            aggressive_above_years: 20,
            conservative_below_years: 10,
            currency_decimals: 0,
            aggressive: split(70, 20, 5, 5),
            moderate: split(60, 25, 10, 5),
            conservative: split(30, 45, 20, 5),
        }
    }
}

impl AllocationConfig {
    pub fn profile_for_horizon(&self, years_to_retirement: u32) -> RiskProfile {
        if years_to_retirement > self.aggressive_above_years {
            RiskProfile::Aggressive
        } else if years_to_retirement < self.conservative_below_years {
            RiskProfile::Conservative
        } else {
            RiskProfile::Moderate
        }
    }

    pub fn table(&self, profile: RiskProfile) -> &[AllocationTarget] {
        match profile {
            RiskProfile::Aggressive => &self.aggressive,
            RiskProfile::Moderate => &self.moderate,
            RiskProfile::Conservative => &self.conservative,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.conservative_below_years > self.aggressive_above_years {
            return Err(PlanError::Config(
                "allocation.conservative_below_years cannot exceed aggressive_above_years"
                    .to_string(),
            ));
        }
        if self.currency_decimals > 6 {
            return Err(PlanError::Config(
                "allocation.currency_decimals must be <= 6".to_string(),
            ));
        }
        for (name, table) in [
            ("aggressive", &self.aggressive),
            ("moderate", &self.moderate),
            ("conservative", &self.conservative),
        ] {
            if table.is_empty() {
                return Err(PlanError::Config(format!(
                    "allocation.{name} must list at least one asset class"
                )));
            }
            let total: u32 = table.iter().map(|t| t.percentage).sum();
            if total != 100 {
                return Err(PlanError::Config(format!(
                    "allocation.{name} percentages sum to {total}, expected 100"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Readiness below which the increase-savings rule fires.
    pub increase_savings_below: f64,
    pub extend_age_below: f64,
    pub optimize_returns_below: f64,
    pub adjust_goal_below: f64,
    pub income_growth_below: f64,
    /// Shortest horizon, in years, for which diversification is suggested.
    pub diversify_min_years: u32,
    /// Shortfall/goal ratio above which a shortfall suggestion is `High`.
    pub high_impact_ratio: f64,
    /// Shortfall/goal ratio at or above which a shortfall suggestion is `Medium`.
    pub medium_impact_ratio: f64,
    pub target_savings_rate_pct: f64,
    pub emergency_fund_months: f64,
    /// Latest retirement age the extend-age rule will propose.
    pub max_retirement_age: u32,
    pub goal_adjust_factor: f64,
    /// Expected return at or above which the user is treated as holding an
    /// aggressive portfolio.
    pub aggressive_return_pct: f64,
    pub moderate_return_pct: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            increase_savings_below: 70.0,
            extend_age_below: 50.0,
            optimize_returns_below: 80.0,
            adjust_goal_below: 40.0,
            income_growth_below: 80.0,
            diversify_min_years: 10,
            high_impact_ratio: 0.30,
            medium_impact_ratio: 0.10,
            target_savings_rate_pct: 20.0,
            emergency_fund_months: 6.0,
            max_retirement_age: 75,
            goal_adjust_factor: 1.2,
            aggressive_return_pct: 10.0,
            moderate_return_pct: 7.0,
        }
    }
}

impl StrategyConfig {
    pub fn implied_profile(&self, expected_return_pct: f64) -> RiskProfile {
        if expected_return_pct >= self.aggressive_return_pct {
            RiskProfile::Aggressive
        } else if expected_return_pct >= self.moderate_return_pct {
            RiskProfile::Moderate
        } else {
            RiskProfile::Conservative
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0 < self.medium_impact_ratio && self.medium_impact_ratio <= self.high_impact_ratio)
        {
            return Err(PlanError::Config(
                "strategy impact ratios must satisfy 0 < medium <= high".to_string(),
            ));
        }
        if self.moderate_return_pct > self.aggressive_return_pct {
            return Err(PlanError::Config(
                "strategy.moderate_return_pct cannot exceed aggressive_return_pct".to_string(),
            ));
        }
        if self.goal_adjust_factor <= 0.0 || self.emergency_fund_months < 0.0 {
            return Err(PlanError::Config(
                "strategy.goal_adjust_factor must be > 0 and emergency_fund_months >= 0"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskScoringConfig {
    pub young_age_below: u32,
    pub older_age_above: u32,
    pub low_income_below: f64,
    pub high_income_above: f64,
    pub short_horizon_below: u32,
    pub long_horizon_above: u32,
    /// Scores up to this are `Low` risk.
    pub low_risk_max: i32,
    /// Scores up to this (and above `low_risk_max`) are `Medium` risk.
    pub medium_risk_max: i32,
}

impl Default for RiskScoringConfig {
    fn default() -> Self {
        Self {
            young_age_below: 30,
            older_age_above: 50,
            low_income_below: 50_000.0,
            high_income_above: 100_000.0,
            short_horizon_below: 10,
            long_horizon_above: 30,
            low_risk_max: 2,
            medium_risk_max: 5,
        }
    }
}

impl RiskScoringConfig {
    pub fn level_for(&self, score: i32) -> RiskLevel {
        if score <= self.low_risk_max {
            RiskLevel::Low
        } else if score <= self.medium_risk_max {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    fn validate(&self) -> Result<()> {
        if self.low_income_below > self.high_income_above {
            return Err(PlanError::Config(
                "risk.low_income_below cannot exceed risk.high_income_above".to_string(),
            ));
        }
        if self.young_age_below > self.older_age_above
            || self.short_horizon_below > self.long_horizon_above
            || self.low_risk_max > self.medium_risk_max
        {
            return Err(PlanError::Config(
                "risk thresholds must be ordered low <= high".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeConfig {
    pub safe_withdrawal_rate_pct: f64,
}

impl Default for IncomeConfig {
    fn default() -> Self {
        Self {
            safe_withdrawal_rate_pct: 4.0,
        }
    }
}

/// Values substituted for fields a request leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub age: u32,
    pub retirement_age: u32,
    pub retirement_goal: f64,
    pub expected_inflation: f64,
    pub expected_returns: f64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            age: 30,
            retirement_age: 65,
            retirement_goal: 1_000_000.0,
            expected_inflation: 3.0,
            expected_returns: 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PlannerConfig::default()
            .validate()
            .expect("defaults must validate");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = PlannerConfig::from_json_str(
            r#"{ "readiness": { "high_at": 90 }, "defaults": { "retirement_age": 60 } }"#,
        )
        .expect("valid config");
        assert_eq!(config.readiness.high_at, 90.0);
        assert_eq!(config.readiness.medium_at, 50.0);
        assert_eq!(config.defaults.retirement_age, 60);
        assert_eq!(config.defaults.age, 30);
        assert_eq!(config.allocation, AllocationConfig::default());
    }

    #[test]
    fn rejects_table_not_summing_to_100() {
        let err = PlannerConfig::from_json_str(
            r#"{ "allocation": { "moderate": [
                { "asset_class": "equity", "percentage": 60, "risk_label": "High", "expected_return_range": "12-15%" },
                { "asset_class": "debt", "percentage": 30, "risk_label": "Low", "expected_return_range": "7-9%" }
            ] } }"#,
        )
        .expect_err("must reject");
        assert!(err.to_string().contains("allocation.moderate"));
    }

    #[test]
    fn rejects_inverted_readiness_thresholds() {
        let err = PlannerConfig::from_json_str(
            r#"{ "readiness": { "medium_at": 85, "high_at": 80 } }"#,
        )
        .expect_err("must reject");
        assert!(err.to_string().contains("readiness.medium_at"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = PlannerConfig::from_json_str("{ not json").expect_err("must reject");
        assert!(matches!(err, PlanError::Json(_)));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = PlannerConfig::from_json_file("/definitely/not/here.json")
            .expect_err("must fail");
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn confidence_labels_follow_thresholds() {
        let readiness = ReadinessConfig::default();
        assert_eq!(readiness.label_for(0.0), ConfidenceLabel::Low);
        assert_eq!(readiness.label_for(49.99), ConfidenceLabel::Low);
        assert_eq!(readiness.label_for(50.0), ConfidenceLabel::Medium);
        assert_eq!(readiness.label_for(79.9), ConfidenceLabel::Medium);
        assert_eq!(readiness.label_for(80.0), ConfidenceLabel::High);
        assert_eq!(readiness.label_for(100.0), ConfidenceLabel::High);
    }

    #[test]
    fn risk_levels_follow_score_bands() {
        let risk = RiskScoringConfig::default();
        assert_eq!(risk.level_for(-2), RiskLevel::Low);
        assert_eq!(risk.level_for(2), RiskLevel::Low);
        assert_eq!(risk.level_for(3), RiskLevel::Medium);
        assert_eq!(risk.level_for(5), RiskLevel::Medium);
        assert_eq!(risk.level_for(6), RiskLevel::High);
    }

    #[test]
    fn horizon_maps_to_profile() {
        let allocation = AllocationConfig::default();
        assert_eq!(allocation.profile_for_horizon(21), RiskProfile::Aggressive);
        assert_eq!(allocation.profile_for_horizon(20), RiskProfile::Moderate);
        assert_eq!(allocation.profile_for_horizon(10), RiskProfile::Moderate);
        assert_eq!(allocation.profile_for_horizon(9), RiskProfile::Conservative);
    }
}
