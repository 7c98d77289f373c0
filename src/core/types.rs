use serde::Serialize;

pub const PLANNING_HORIZON_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInputs {
    pub starting_headcount: u32,
    pub quota_per_rep_annual: f64,
    pub annual_attrition_rate_pct: f64,
    pub hiring_plan: [u32; PLANNING_HORIZON_MONTHS],
    pub ramp_schedule: Vec<f64>,
}

/// `headcount` is an expected survivor count and may be fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cohort {
    pub months_of_tenure: usize,
    pub headcount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResult {
    pub month_index: u32,
    pub headcount: f64,
    pub street_revenue: f64,
    pub spreadsheet_revenue: f64,
    pub gap: f64,
    pub cumulative_street: f64,
    pub cumulative_spreadsheet: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub total_street: f64,
    pub total_spreadsheet: f64,
    pub total_gap: f64,
    pub gap_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub months: Vec<MonthlyResult>,
    pub summary: SimulationSummary,
}
