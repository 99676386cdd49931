use super::error::{FieldError, PlanError, Result};

/// Turns savings into a corpus at retirement. The planner is handed one
/// implementation at construction and never branches on which one it holds.
pub trait Projector: Send + Sync {
    fn project(
        &self,
        current_savings: f64,
        monthly_contribution: f64,
        annual_return_pct: f64,
        years: u32,
    ) -> Result<f64>;

    /// `false` for approximations that responses must flag as degraded.
    fn full_fidelity(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Monthly compounding with period-end contributions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundProjector;

impl Projector for CompoundProjector {
    fn project(
        &self,
        current_savings: f64,
        monthly_contribution: f64,
        annual_return_pct: f64,
        years: u32,
    ) -> Result<f64> {
        check_inputs(current_savings, monthly_contribution, annual_return_pct)?;
        let periods = monthly_periods(years)?;
        if years == 0 {
            return Ok(current_savings);
        }

        let r = monthly_rate(annual_return_pct);
        let growth = (1.0 + r).powi(periods);

        let lump_sum = current_savings * growth;
        let contributions = if r > 0.0 {
            monthly_contribution * (growth - 1.0) / r
        } else {
            monthly_contribution * periods as f64
        };
        Ok(lump_sum + contributions)
    }

    fn full_fidelity(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "compound"
    }
}

/// Degraded estimate: yearly compounding, with twelve months of contributions
/// credited at each year end.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProjector;

impl Projector for FallbackProjector {
    fn project(
        &self,
        current_savings: f64,
        monthly_contribution: f64,
        annual_return_pct: f64,
        years: u32,
    ) -> Result<f64> {
        check_inputs(current_savings, monthly_contribution, annual_return_pct)?;
        monthly_periods(years)?;
        let growth = 1.0 + annual_return_pct / 100.0;
        let annual_contribution = monthly_contribution * 12.0;
        let mut corpus = current_savings;
        for _ in 0..years {
            corpus = corpus * growth + annual_contribution;
        }
        Ok(corpus)
    }

    fn full_fidelity(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Effective monthly rate equivalent to `annual_return_pct` compounded yearly.
pub fn monthly_rate(annual_return_pct: f64) -> f64 {
    (1.0 + annual_return_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Number of monthly periods in `years`. Horizons whose month count does not
/// fit an `i32` are rejected rather than wrapped.
pub fn monthly_periods(years: u32) -> Result<i32> {
    i32::try_from(years)
        .ok()
        .and_then(|years| years.checked_mul(12))
        .ok_or_else(|| {
            PlanError::invalid("years", format!("must be at most {}", i32::MAX / 12))
        })
}

/// Discounts a future amount back to today's money.
pub fn inflation_adjusted(amount: f64, inflation_pct: f64, years: u32) -> f64 {
    amount / (1.0 + inflation_pct / 100.0).powf(f64::from(years))
}

fn check_inputs(current_savings: f64, monthly_contribution: f64, annual_return_pct: f64) -> Result<()> {
    let mut errors = Vec::new();
    if !current_savings.is_finite() || current_savings < 0.0 {
        errors.push(FieldError::new("current_savings", "must be >= 0"));
    }
    if !monthly_contribution.is_finite() || monthly_contribution < 0.0 {
        errors.push(FieldError::new("monthly_savings", "must be >= 0"));
    }
    if !annual_return_pct.is_finite() || annual_return_pct < 0.0 {
        errors.push(FieldError::new("expected_returns", "must be >= 0"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidInput(errors))
    }
}
