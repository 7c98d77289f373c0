use tracing::debug;

use super::attrition::monthly_probability;
use super::ledger::CohortLedger;
use super::projector::{spreadsheet_revenue, street_revenue};
use super::ramp::RampCurve;
use super::types::{
    MonthlyResult, PLANNING_HORIZON_MONTHS, SimulationInputs, SimulationResult, SimulationSummary,
};

// Per month: attrition, hiring, revenue from that snapshot, then aging.
pub fn run_simulation(inputs: &SimulationInputs) -> SimulationResult {
    let ramp = RampCurve::new(&inputs.ramp_schedule);
    let attrition = monthly_probability(inputs.annual_attrition_rate_pct);
    let mut ledger = CohortLedger::new(inputs.starting_headcount, ramp.fully_ramped_tenure());

    let mut months = Vec::with_capacity(PLANNING_HORIZON_MONTHS);
    let mut cumulative_street = 0.0;
    let mut cumulative_spreadsheet = 0.0;

    for (month, &new_hires) in inputs.hiring_plan.iter().enumerate() {
        ledger.apply_attrition(attrition);
        ledger.add_cohort(new_hires);

        let street = street_revenue(ledger.cohorts(), ramp, inputs.quota_per_rep_annual);
        let spreadsheet =
            spreadsheet_revenue(ledger.running_headcount(), inputs.quota_per_rep_annual);
        cumulative_street += street;
        cumulative_spreadsheet += spreadsheet;

        months.push(MonthlyResult {
            month_index: month as u32 + 1,
            headcount: ledger.running_headcount(),
            street_revenue: street,
            spreadsheet_revenue: spreadsheet,
            gap: spreadsheet - street,
            cumulative_street,
            cumulative_spreadsheet,
        });

        ledger.age_cohorts();
    }

    let summary = summarize(&months);
    debug!(
        cohorts = ledger.cohorts().len(),
        total_street = summary.total_street,
        total_spreadsheet = summary.total_spreadsheet,
        gap_pct = summary.gap_pct,
        "capacity simulation complete"
    );

    SimulationResult { months, summary }
}

pub fn summarize(months: &[MonthlyResult]) -> SimulationSummary {
    let (total_street, total_spreadsheet) = months.last().map_or((0.0, 0.0), |m| {
        (m.cumulative_street, m.cumulative_spreadsheet)
    });
    let total_gap = total_spreadsheet - total_street;

    SimulationSummary {
        total_street,
        total_spreadsheet,
        total_gap,
        gap_pct: gap_percentage(total_gap, total_spreadsheet),
    }
}

// Zero when there is no spreadsheet capacity to compare against.
fn gap_percentage(total_gap: f64, total_spreadsheet: f64) -> f64 {
    if total_spreadsheet == 0.0 {
        return 0.0;
    }
    let pct = total_gap / total_spreadsheet * 100.0;
    if pct.is_finite() { pct } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop, prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_rel(actual: f64, expected: f64) {
        let tol = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> SimulationInputs {
        SimulationInputs {
            starting_headcount: 8,
            quota_per_rep_annual: 600_000.0,
            annual_attrition_rate_pct: 18.0,
            hiring_plan: [2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0],
            ramp_schedule: vec![0.0, 0.2, 0.5, 0.8, 1.0, 1.0],
        }
    }

    fn ramp_trial_inputs(annual_attrition_rate_pct: f64) -> SimulationInputs {
        SimulationInputs {
            starting_headcount: 0,
            quota_per_rep_annual: 120_000.0,
            annual_attrition_rate_pct,
            hiring_plan: [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            ramp_schedule: vec![0.0, 0.5, 1.0],
        }
    }

    #[test]
    fn steady_team_matches_spreadsheet_every_month() {
        let inputs = SimulationInputs {
            starting_headcount: 8,
            quota_per_rep_annual: 600_000.0,
            annual_attrition_rate_pct: 0.0,
            hiring_plan: [0; PLANNING_HORIZON_MONTHS],
            ramp_schedule: vec![1.0],
        };
        let result = run_simulation(&inputs);

        for month in &result.months {
            assert_approx(month.street_revenue, 400_000.0);
            assert_approx(month.spreadsheet_revenue, 400_000.0);
            assert_approx(month.gap, 0.0);
        }
        assert_approx(result.summary.total_street, 4_800_000.0);
        assert_approx(result.summary.total_spreadsheet, 4_800_000.0);
        assert_approx(result.summary.total_gap, 0.0);
        assert_eq!(result.summary.gap_pct, 0.0);
    }

    #[test]
    fn single_hire_cohort_follows_ramp_schedule() {
        let result = run_simulation(&ramp_trial_inputs(0.0));
        let street = result
            .months
            .iter()
            .map(|m| m.street_revenue)
            .collect::<Vec<_>>();

        assert_approx(street[0], 0.0);
        assert_approx(street[1], 10_000.0);
        assert_approx(street[2], 20_000.0);
        for revenue in &street[3..] {
            assert_approx(*revenue, 20_000.0);
        }
        for month in &result.months {
            assert_approx(month.spreadsheet_revenue, 20_000.0);
            assert_approx(month.headcount, 2.0);
        }
    }

    #[test]
    fn attrition_decays_headcount_by_fixed_monthly_probability() {
        let result = run_simulation(&ramp_trial_inputs(24.0));
        let probability = 24.0 / 100.0 / 12.0;
        assert_approx(probability, 0.02);

        // Hires join after the month's attrition, so month 1 is untouched.
        let mut expected = 2.0;
        assert_approx(result.months[0].headcount, expected);
        for pair in result.months.windows(2) {
            assert!(pair[1].headcount < pair[0].headcount);
            expected -= expected * probability;
            assert_approx(pair[1].headcount, expected);
        }
        assert_approx(result.months[11].headcount, 2.0 * 0.98_f64.powi(11));
    }

    #[test]
    fn attrition_applies_before_hiring_in_month() {
        let mut inputs = sample_inputs();
        inputs.starting_headcount = 12;
        inputs.annual_attrition_rate_pct = 12.0;
        inputs.hiring_plan = [1; PLANNING_HORIZON_MONTHS];
        let result = run_simulation(&inputs);

        // 12 * 0.99 + 1
        assert_approx(result.months[0].headcount, 12.88);
    }

    #[test]
    fn new_cohort_is_not_aged_in_hiring_month() {
        let mut inputs = ramp_trial_inputs(0.0);
        inputs.hiring_plan = [0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0];
        let result = run_simulation(&inputs);

        assert_approx(result.months[5].street_revenue, 0.0);
        assert_approx(result.months[6].street_revenue, 15_000.0);
        assert_approx(result.months[7].street_revenue, 30_000.0);
    }

    #[test]
    fn starting_cohort_is_fully_ramped_regardless_of_schedule_length() {
        let mut inputs = sample_inputs();
        inputs.starting_headcount = 5;
        inputs.annual_attrition_rate_pct = 0.0;
        inputs.hiring_plan = [0; PLANNING_HORIZON_MONTHS];
        inputs.ramp_schedule = vec![0.0; 40];
        let result = run_simulation(&inputs);

        for month in &result.months {
            assert_approx(month.street_revenue, month.spreadsheet_revenue);
        }
    }

    #[test]
    fn empty_ramp_schedule_means_always_fully_ramped() {
        let mut inputs = sample_inputs();
        inputs.ramp_schedule.clear();
        let result = run_simulation(&inputs);

        for month in &result.months {
            assert_approx_rel(month.street_revenue, month.spreadsheet_revenue);
        }
    }

    #[test]
    fn default_plan_shows_street_below_spreadsheet() {
        let result = run_simulation(&sample_inputs());
        assert!(result.summary.total_street < result.summary.total_spreadsheet);
        assert!(result.summary.gap_pct > 0.0 && result.summary.gap_pct < 100.0);
        assert_approx(
            result.summary.total_gap,
            result.summary.total_spreadsheet - result.summary.total_street,
        );
    }

    #[test]
    fn zero_spreadsheet_capacity_reports_zero_gap_pct() {
        let mut inputs = sample_inputs();
        inputs.quota_per_rep_annual = 0.0;
        let result = run_simulation(&inputs);
        assert_eq!(result.summary.total_spreadsheet, 0.0);
        assert_eq!(result.summary.gap_pct, 0.0);

        let mut inputs = sample_inputs();
        inputs.starting_headcount = 0;
        inputs.hiring_plan = [0; PLANNING_HORIZON_MONTHS];
        let result = run_simulation(&inputs);
        assert_eq!(result.summary.total_spreadsheet, 0.0);
        assert_eq!(result.summary.gap_pct, 0.0);
    }

    #[test]
    fn attrition_above_total_clamps_headcount_at_zero() {
        let mut inputs = sample_inputs();
        inputs.annual_attrition_rate_pct = 5_000.0;
        inputs.hiring_plan = [0; PLANNING_HORIZON_MONTHS];
        let result = run_simulation(&inputs);

        for month in &result.months {
            assert_eq!(month.headcount, 0.0);
            assert_eq!(month.street_revenue, 0.0);
        }
        assert_eq!(result.summary.gap_pct, 0.0);
    }

    #[test]
    fn summarize_empty_series_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_street, 0.0);
        assert_eq!(summary.total_spreadsheet, 0.0);
        assert_eq!(summary.total_gap, 0.0);
        assert_eq!(summary.gap_pct, 0.0);
    }

    #[test]
    fn reruns_are_bit_identical() {
        let inputs = sample_inputs();
        assert_eq!(run_simulation(&inputs), run_simulation(&inputs));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_series_is_twelve_ordered_months_with_consistent_totals(
            starting_headcount in 0u32..200,
            quota in 0u32..2_000_000,
            attrition_bp in 0u32..10_000,
            hiring_plan in prop::array::uniform12(0u32..10),
            ramp_pct in prop::collection::vec(0u32..=150, 0..8)
        ) {
            let inputs = SimulationInputs {
                starting_headcount,
                quota_per_rep_annual: quota as f64,
                annual_attrition_rate_pct: attrition_bp as f64 / 100.0,
                hiring_plan,
                ramp_schedule: ramp_pct.iter().map(|&p| p as f64 / 100.0).collect(),
            };
            let result = run_simulation(&inputs);

            prop_assert_eq!(result.months.len(), PLANNING_HORIZON_MONTHS);
            for (idx, month) in result.months.iter().enumerate() {
                prop_assert_eq!(month.month_index, idx as u32 + 1);
                prop_assert!(month.headcount >= 0.0);
                prop_assert!(month.street_revenue.is_finite());
            }

            let street_sum: f64 = result.months.iter().map(|m| m.street_revenue).sum();
            let sheet_sum: f64 = result.months.iter().map(|m| m.spreadsheet_revenue).sum();
            let last = result.months[PLANNING_HORIZON_MONTHS - 1];
            prop_assert!(
                (last.cumulative_street - street_sum).abs() <= 1e-6 * street_sum.max(1.0)
            );
            prop_assert!(
                (last.cumulative_spreadsheet - sheet_sum).abs() <= 1e-6 * sheet_sum.max(1.0)
            );

            prop_assert!(result.summary.gap_pct.is_finite());
            prop_assert_eq!(result.summary.total_street, last.cumulative_street);
            prop_assert_eq!(result.summary.total_spreadsheet, last.cumulative_spreadsheet);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_no_hires_and_no_attrition_holds_headcount_constant(
            starting_headcount in 0u32..500,
            quota in 0u32..2_000_000,
            ramp_pct in prop::collection::vec(0u32..=100, 0..8)
        ) {
            let inputs = SimulationInputs {
                starting_headcount,
                quota_per_rep_annual: quota as f64,
                annual_attrition_rate_pct: 0.0,
                hiring_plan: [0; PLANNING_HORIZON_MONTHS],
                ramp_schedule: ramp_pct.iter().map(|&p| p as f64 / 100.0).collect(),
            };
            let result = run_simulation(&inputs);

            for month in &result.months {
                prop_assert_eq!(month.headcount, starting_headcount as f64);
            }
        }

        #[test]
        fn prop_without_ramp_or_attrition_street_equals_spreadsheet(
            starting_headcount in 0u32..200,
            quota in 0u32..2_000_000,
            hiring_plan in prop::array::uniform12(0u32..10),
            unit_ramp in proptest::bool::ANY
        ) {
            let inputs = SimulationInputs {
                starting_headcount,
                quota_per_rep_annual: quota as f64,
                annual_attrition_rate_pct: 0.0,
                hiring_plan,
                ramp_schedule: if unit_ramp { vec![1.0] } else { Vec::new() },
            };
            let result = run_simulation(&inputs);

            for month in &result.months {
                let tol = 1e-9 * month.spreadsheet_revenue.abs().max(1.0);
                prop_assert!((month.street_revenue - month.spreadsheet_revenue).abs() <= tol);
            }
        }

        #[test]
        fn prop_reruns_are_deterministic(
            starting_headcount in 0u32..200,
            attrition_bp in 0u32..10_000,
            hiring_plan in prop::array::uniform12(0u32..10)
        ) {
            let mut inputs = sample_inputs();
            inputs.starting_headcount = starting_headcount;
            inputs.annual_attrition_rate_pct = attrition_bp as f64 / 100.0;
            inputs.hiring_plan = hiring_plan;

            prop_assert_eq!(run_simulation(&inputs), run_simulation(&inputs));
        }
    }
}
