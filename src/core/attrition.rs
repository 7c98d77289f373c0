/// Converts an annual attrition percentage into the probability applied each month.
///
/// This is a linear split of the annual rate (`rate / 100 / 12`), not a compounding
/// survival conversion. Twelve monthly applications therefore remove slightly less than
/// the nominal annual rate.
pub fn monthly_probability(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}
