use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} must be >= 0")]
    Negative { field: &'static str },

    #[error("{field}: could not parse '{value}' as a number")]
    Unparseable { field: &'static str, value: String },

    #[error("--hiring-plan must list exactly {expected} months, got {actual}")]
    HiringPlanLength { expected: usize, actual: usize },

    #[error("--hiring-plan month {month} must be a whole number of hires >= 0")]
    InvalidHires { month: usize },

    #[error("--ramp-schedule month {month} must be a finite multiplier >= 0")]
    InvalidRampMultiplier { month: usize },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
