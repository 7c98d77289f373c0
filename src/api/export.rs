use serde::Serialize;
use std::io;

use crate::core::MonthlyResult;

pub const EXPORT_FILE_NAME: &str = "quota_cliff_analysis.csv";

// Rounded for display; the simulation keeps full precision.
#[derive(Debug, Serialize, PartialEq)]
struct MonthRow {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Headcount")]
    headcount: String,
    #[serde(rename = "Street Revenue")]
    street_revenue: i64,
    #[serde(rename = "Spreadsheet Revenue")]
    spreadsheet_revenue: i64,
    #[serde(rename = "Gap")]
    gap: i64,
}

impl From<&MonthlyResult> for MonthRow {
    fn from(month: &MonthlyResult) -> Self {
        Self {
            month: month_label(month.month_index),
            headcount: format_headcount(month.headcount),
            street_revenue: round_currency(month.street_revenue),
            spreadsheet_revenue: round_currency(month.spreadsheet_revenue),
            gap: round_currency(month.gap),
        }
    }
}

pub fn month_label(month_index: u32) -> String {
    format!("Month {month_index}")
}

pub fn format_headcount(headcount: f64) -> String {
    format!("{}", (headcount * 10.0).round() / 10.0)
}

/// Whole currency units, halves rounded up (`-2.5` becomes `-2`).
pub fn round_currency(amount: f64) -> i64 {
    (amount + 0.5).floor() as i64
}

pub fn write_months_csv<W: io::Write>(writer: W, months: &[MonthlyResult]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for month in months {
        writer.serialize(MonthRow::from(month))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn months_csv(months: &[MonthlyResult]) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_months_csv(&mut buf, months)?;
    let text =
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(text)
}
