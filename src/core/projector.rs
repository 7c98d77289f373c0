use super::ramp::RampCurve;
use super::types::Cohort;

pub fn monthly_quota(quota_per_rep_annual: f64) -> f64 {
    quota_per_rep_annual / 12.0
}

pub fn street_revenue(
    cohorts: &[Cohort],
    ramp: RampCurve<'_>,
    quota_per_rep_annual: f64,
) -> f64 {
    let quota = monthly_quota(quota_per_rep_annual);
    cohorts
        .iter()
        .map(|c| quota * c.headcount * ramp.lookup(c.months_of_tenure))
        .sum()
}

pub fn spreadsheet_revenue(headcount: f64, quota_per_rep_annual: f64) -> f64 {
    headcount * monthly_quota(quota_per_rep_annual)
}
