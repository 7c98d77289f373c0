#[derive(Debug, Clone, Copy)]
pub struct RampCurve<'a> {
    schedule: &'a [f64],
}

impl<'a> RampCurve<'a> {
    pub fn new(schedule: &'a [f64]) -> Self {
        Self { schedule }
    }

    pub fn lookup(self, tenure_months: usize) -> f64 {
        self.schedule.get(tenure_months).copied().unwrap_or(1.0)
    }

    /// Smallest tenure that resolves to a full multiplier. Used to seed the
    /// starting cohort so it counts as already ramped.
    pub fn fully_ramped_tenure(self) -> usize {
        self.schedule.len()
    }
}
