use super::types::{SimulationInputs, SimulationSummary};

/// `None` when there is no street capacity to scale from.
pub fn additional_hires_needed(
    inputs: &SimulationInputs,
    summary: &SimulationSummary,
) -> Option<u32> {
    if summary.total_street == 0.0 {
        return None;
    }
    let planned_hires = inputs.hiring_plan.iter().map(|&h| h as f64).sum::<f64>();
    let needed = (planned_hires * (summary.total_gap / summary.total_street)).ceil();
    if !needed.is_finite() {
        return None;
    }
    Some(needed.clamp(0.0, u32::MAX as f64) as u32)
}
