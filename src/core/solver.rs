use super::error::Result;
use super::projector::Projector;
use super::types::UserFinancialProfile;

/// Monthly contribution that grows to `gap` over `years` under `projector`.
/// Every projector is linear in the contribution, so a single unit projection
/// fixes the answer.
pub fn monthly_contribution_for_gap(
    projector: &dyn Projector,
    gap: f64,
    annual_return_pct: f64,
    years: u32,
) -> Result<f64> {
    let per_unit = projector.project(0.0, 1.0, annual_return_pct, years)?;
    if gap <= 0.0 {
        return Ok(0.0);
    }
    if per_unit <= 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(gap / per_unit)
}

/// Total monthly contribution needed for `current_savings` plus contributions
/// to reach `target` after `years`. Zero when the lump sum alone gets there.
pub fn required_monthly_contribution(
    projector: &dyn Projector,
    target: f64,
    current_savings: f64,
    annual_return_pct: f64,
    years: u32,
) -> Result<f64> {
    let lump_sum = projector.project(current_savings, 0.0, annual_return_pct, years)?;
    monthly_contribution_for_gap(projector, target - lump_sum, annual_return_pct, years)
}

/// First retirement age in `from..=to` whose projected corpus meets the goal.
pub fn earliest_feasible_age(
    projector: &dyn Projector,
    profile: &UserFinancialProfile,
    from: u32,
    to: u32,
) -> Result<Option<u32>> {
    let from = from.max(profile.current_age + 1);
    for age in from..=to {
        let corpus = projector.project(
            profile.current_savings,
            profile.monthly_contribution(),
            profile.expected_return_pct,
            age - profile.current_age,
        )?;
        if corpus >= profile.retirement_goal {
            return Ok(Some(age));
        }
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy)]
pub struct ReturnSolveConfig {
    pub search_max_pct: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for ReturnSolveConfig {
    fn default() -> Self {
        Self {
            search_max_pct: 30.0,
            tolerance: 0.01,
            max_iterations: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnSolveResult {
    pub required_return_pct: Option<f64>,
    pub converged: bool,
    pub iterations: u32,
}

/// Bisects for the lowest annual return at which the profile's savings reach
/// its goal by the planned retirement age.
pub fn solve_required_return(
    projector: &dyn Projector,
    profile: &UserFinancialProfile,
    config: ReturnSolveConfig,
) -> Result<ReturnSolveResult> {
    let years = profile.years_to_retirement();
    let meets_goal = |rate: f64| -> Result<bool> {
        let corpus = projector.project(
            profile.current_savings,
            profile.monthly_contribution(),
            rate,
            years,
        )?;
        Ok(corpus + 1e-9 >= profile.retirement_goal)
    };

    if meets_goal(0.0)? {
        return Ok(ReturnSolveResult {
            required_return_pct: Some(0.0),
            converged: true,
            iterations: 0,
        });
    }
    if !meets_goal(config.search_max_pct)? {
        return Ok(ReturnSolveResult {
            required_return_pct: None,
            converged: false,
            iterations: 0,
        });
    }

    let mut lo = 0.0;
    let mut hi = config.search_max_pct;
    let mut it = 0;
    let mut converged = false;
    while it < config.max_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        if meets_goal(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
        if (hi - lo).abs() <= config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(ReturnSolveResult {
        required_return_pct: Some(hi),
        converged,
        iterations: it,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projector::{CompoundProjector, FallbackProjector};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn deterministic_profile() -> UserFinancialProfile {
        UserFinancialProfile {
            current_age: 40,
            retirement_age: 50,
            annual_income: 60_000.0,
            monthly_expenses: 2_000.0,
            current_savings: 10_000.0,
            monthly_savings: 500.0,
            retirement_goal: 200_000.0,
            expected_inflation_pct: 3.0,
            expected_return_pct: 6.0,
            employer_match: 0.0,
            social_security_estimate: 0.0,
            other_income: 0.0,
        }
    }

    #[test]
    fn gap_contribution_reproduces_the_gap() {
        let monthly = monthly_contribution_for_gap(&CompoundProjector, 100_000.0, 8.0, 15)
            .expect("valid");
        let corpus = CompoundProjector
            .project(0.0, monthly, 8.0, 15)
            .expect("valid");
        assert_close(corpus, 100_000.0, 1e-6);
    }

    #[test]
    fn gap_contribution_follows_the_yearly_model() {
        let monthly = monthly_contribution_for_gap(&FallbackProjector, 100_000.0, 8.0, 15)
            .expect("valid");
        let corpus = FallbackProjector
            .project(0.0, monthly, 8.0, 15)
            .expect("valid");
        assert_close(corpus, 100_000.0, 1e-6);
        let compound = monthly_contribution_for_gap(&CompoundProjector, 100_000.0, 8.0, 15)
            .expect("valid");
        assert!(monthly > compound);
    }

    #[test]
    fn zero_return_spreads_gap_evenly() {
        let monthly = monthly_contribution_for_gap(&CompoundProjector, 12_000.0, 0.0, 10)
            .expect("valid");
        assert_close(monthly, 100.0, 1e-12);
        let nothing = monthly_contribution_for_gap(&CompoundProjector, -5.0, 6.0, 10)
            .expect("valid");
        assert_eq!(nothing, 0.0);
    }

    #[test]
    fn gap_cannot_be_closed_with_no_time_left() {
        let monthly = monthly_contribution_for_gap(&CompoundProjector, 1_000.0, 6.0, 0)
            .expect("valid");
        assert!(monthly.is_infinite());
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let err = monthly_contribution_for_gap(&CompoundProjector, 1_000.0, 6.0, u32::MAX)
            .expect_err("horizon too long");
        assert_eq!(err.fields(), vec!["years"]);
        let err = required_monthly_contribution(&CompoundProjector, 1_000.0, 10.0, 6.0, u32::MAX)
            .expect_err("horizon too long");
        assert_eq!(err.fields(), vec!["years"]);
    }

    #[test]
    fn required_contribution_is_zero_when_lump_sum_suffices() {
        let monthly = required_monthly_contribution(&CompoundProjector, 1_000.0, 1_000.0, 5.0, 10)
            .expect("valid");
        assert_eq!(monthly, 0.0);
    }

    #[test]
    fn required_contribution_closes_goal() {
        let profile = deterministic_profile();
        let projectors: [&dyn Projector; 2] = [&CompoundProjector, &FallbackProjector];
        for projector in projectors {
            let monthly = required_monthly_contribution(
                projector,
                profile.retirement_goal,
                profile.current_savings,
                profile.expected_return_pct,
                profile.years_to_retirement(),
            )
            .expect("valid");
            let corpus = projector
                .project(
                    profile.current_savings,
                    monthly,
                    profile.expected_return_pct,
                    profile.years_to_retirement(),
                )
                .expect("valid");
            assert_close(corpus, profile.retirement_goal, 1e-6);
        }
    }

    #[test]
    fn earliest_feasible_age_scans_forward() {
        let profile = deterministic_profile();
        let age = earliest_feasible_age(&CompoundProjector, &profile, 41, 80)
            .expect("valid")
            .expect("reachable by 80");
        let before = CompoundProjector
            .project(10_000.0, 500.0, 6.0, age - 1 - 40)
            .expect("valid");
        let at = CompoundProjector
            .project(10_000.0, 500.0, 6.0, age - 40)
            .expect("valid");
        assert!(before < profile.retirement_goal);
        assert!(at >= profile.retirement_goal);
    }

    #[test]
    fn earliest_feasible_age_reports_unreachable() {
        let mut profile = deterministic_profile();
        profile.retirement_goal = 1e12;
        let age = earliest_feasible_age(&CompoundProjector, &profile, 41, 75).expect("valid");
        assert_eq!(age, None);
    }

    #[test]
    fn required_return_solver_brackets_goal() {
        let profile = deterministic_profile();
        let config = ReturnSolveConfig::default();
        let result = solve_required_return(&CompoundProjector, &profile, config).expect("valid");
        assert!(result.converged);
        let rate = result.required_return_pct.expect("rate expected");

        let at = CompoundProjector
            .project(10_000.0, 500.0, rate, 10)
            .expect("valid");
        let below = CompoundProjector
            .project(10_000.0, 500.0, rate - config.tolerance * 2.0, 10)
            .expect("valid");
        assert!(at >= profile.retirement_goal);
        assert!(below < profile.retirement_goal);
    }

    #[test]
    fn required_return_solver_reports_infeasible_goal() {
        let mut profile = deterministic_profile();
        profile.current_savings = 0.0;
        profile.monthly_savings = 1.0;
        let result = solve_required_return(&CompoundProjector, &profile, ReturnSolveConfig::default())
            .expect("valid");
        assert_eq!(result.required_return_pct, None);
        assert!(!result.converged);
    }

    #[test]
    fn required_return_is_zero_when_contributions_alone_suffice() {
        let mut profile = deterministic_profile();
        profile.retirement_goal = 50_000.0;
        let result = solve_required_return(&CompoundProjector, &profile, ReturnSolveConfig::default())
            .expect("valid");
        assert_eq!(result.required_return_pct, Some(0.0));
    }
}
