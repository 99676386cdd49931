use log::debug;

use super::config::AllocationConfig;
use super::error::{PlanError, Result};
use super::types::{AllocationLine, AllocationPlan};

/// Largest total, in minor units, that an `f64` still holds exactly.
const MAX_MINOR_UNITS: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Default)]
pub struct AllocationRecommender {
    config: AllocationConfig,
}

impl AllocationRecommender {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn recommend(
        &self,
        current_age: u32,
        years_to_retirement: u32,
        monthly_savings: f64,
    ) -> Result<AllocationPlan> {
        if !monthly_savings.is_finite() || monthly_savings < 0.0 {
            return Err(PlanError::invalid("monthly_savings", "must be >= 0"));
        }

        let risk_profile = self.config.profile_for_horizon(years_to_retirement);
        let table = self.config.table(risk_profile);
        if table.is_empty() {
            return Err(PlanError::Config(format!(
                "allocation table for {risk_profile:?} is empty"
            )));
        }
        let decimals = self.config.currency_decimals;
        let scale = 10i64.checked_pow(decimals).ok_or_else(|| {
            PlanError::Config(format!("currency_decimals {decimals} is out of range"))
        })?;
        let total = (monthly_savings * scale as f64).round();
        if total > MAX_MINOR_UNITS {
            return Err(PlanError::invalid(
                "monthly_savings",
                "is too large to split at this currency precision",
            ));
        }
        let total = total as i64;
        debug!(
            "allocation: age {current_age}, {years_to_retirement} years -> {risk_profile:?}, {total} minor units"
        );

        // Every line but the largest takes its floored share; the largest
        // takes the remainder so the lines add back up to the rounded total.
        let largest = table
            .iter()
            .enumerate()
            .max_by(|(a_idx, a), (b_idx, b)| {
                a.percentage.cmp(&b.percentage).then(b_idx.cmp(a_idx))
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        let mut units: Vec<i64> = table
            .iter()
            .map(|target| total * i64::from(target.percentage) / 100)
            .collect();
        let others: i64 = units
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != largest)
            .map(|(_, units)| *units)
            .sum();
        units[largest] = total - others;

        let lines = table
            .iter()
            .zip(units)
            .map(|(target, minor_units)| AllocationLine {
                asset_class: target.asset_class,
                name: target.asset_class.display_name().to_string(),
                percentage: target.percentage,
                monthly_amount: minor_units as f64 / scale as f64,
                minor_units,
                risk_label: target.risk_label.clone(),
                expected_return_range: target.expected_return_range.clone(),
            })
            .collect();

        Ok(AllocationPlan {
            risk_profile,
            lines,
            currency_decimals: decimals,
        })
    }
}
