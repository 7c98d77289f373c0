mod attrition;
mod engine;
mod insight;
mod ledger;
mod projector;
mod ramp;
mod types;

pub use attrition::monthly_probability;
pub use engine::{run_simulation, summarize};
pub use insight::additional_hires_needed;
pub use ledger::CohortLedger;
pub use projector::{monthly_quota, spreadsheet_revenue, street_revenue};
pub use ramp::RampCurve;
pub use types::{
    Cohort, MonthlyResult, PLANNING_HORIZON_MONTHS, SimulationInputs, SimulationResult,
    SimulationSummary,
};
