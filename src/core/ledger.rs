use super::types::Cohort;

#[derive(Debug, Clone)]
pub struct CohortLedger {
    cohorts: Vec<Cohort>,
    running_headcount: f64,
}

impl CohortLedger {
    pub fn new(starting_headcount: u32, seed_tenure: usize) -> Self {
        let starting_headcount = starting_headcount as f64;
        Self {
            cohorts: vec![Cohort {
                months_of_tenure: seed_tenure,
                headcount: starting_headcount,
            }],
            running_headcount: starting_headcount,
        }
    }

    pub fn apply_attrition(&mut self, monthly_probability: f64) {
        for cohort in &mut self.cohorts {
            cohort.headcount = decay(cohort.headcount, monthly_probability);
        }
        self.running_headcount = decay(self.running_headcount, monthly_probability);
    }

    pub fn add_cohort(&mut self, new_hires: u32) {
        // no empty cohorts for months without hires
        if new_hires == 0 {
            return;
        }
        let new_hires = new_hires as f64;
        self.cohorts.push(Cohort {
            months_of_tenure: 0,
            headcount: new_hires,
        });
        self.running_headcount += new_hires;
    }

    pub fn age_cohorts(&mut self) {
        for cohort in &mut self.cohorts {
            cohort.months_of_tenure += 1;
        }
    }

    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }

    pub fn running_headcount(&self) -> f64 {
        self.running_headcount
    }
}

fn decay(headcount: f64, probability: f64) -> f64 {
    (headcount - headcount * probability).max(0.0)
}
