use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::{self, Write};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

mod error;
mod export;

pub use error::{InputError, RunError};
pub use export::{EXPORT_FILE_NAME, months_csv, write_months_csv};

use crate::core::{
    MonthlyResult, PLANNING_HORIZON_MONTHS, SimulationInputs, SimulationResult,
    SimulationSummary, additional_hires_needed, run_simulation,
};
use export::{format_headcount, month_label, round_currency};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_STARTING_HEADCOUNT: u32 = 8;
const DEFAULT_QUOTA_PER_REP: f64 = 600_000.0;
const DEFAULT_ATTRITION_RATE: f64 = 18.0;
const DEFAULT_HIRING_PLAN: [u32; PLANNING_HORIZON_MONTHS] = [2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0];
const DEFAULT_RAMP_SCHEDULE: [f64; 6] = [0.0, 0.2, 0.5, 0.8, 1.0, 1.0];

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "quota-cliff",
    about = "Sales capacity planner: ramp- and attrition-aware street capacity vs spreadsheet capacity",
    after_help = "Run `quota-cliff serve [port]` to start the HTTP API and web UI instead."
)]
pub struct Cli {
    #[arg(
        long,
        default_value_t = DEFAULT_STARTING_HEADCOUNT,
        help = "Fully ramped reps seated at the start of the plan"
    )]
    starting_headcount: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_QUOTA_PER_REP,
        help = "Annual quota of one fully ramped rep"
    )]
    quota_per_rep: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_ATTRITION_RATE,
        allow_negative_numbers = true,
        help = "Annual attrition rate in percent, e.g. 18"
    )]
    attrition_rate: f64,
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_HIRING_PLAN,
        help = "New hires joining in each of the 12 months, comma separated"
    )]
    hiring_plan: Vec<u32>,
    #[arg(
        long,
        value_delimiter = ',',
        num_args = 0..,
        default_values_t = DEFAULT_RAMP_SCHEDULE,
        allow_negative_numbers = true,
        help = "Productivity multiplier by month of tenure, comma separated; later months are fully ramped"
    )]
    ramp_schedule: Vec<f64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// A list field from the web form: a JSON array, or a comma-separated string
/// when sent as a query parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberList {
    Values(Vec<f64>),
    Joined(String),
}

impl NumberList {
    fn into_values(self, field: &'static str) -> Result<Vec<f64>, InputError> {
        match self {
            NumberList::Values(values) => Ok(values),
            NumberList::Joined(text) => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<f64>().map_err(|_| InputError::Unparseable {
                        field,
                        value: part.to_string(),
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    #[serde(alias = "startingReps")]
    starting_headcount: Option<u32>,
    #[serde(alias = "quotaPerRepAnnual")]
    quota_per_rep: Option<f64>,
    #[serde(alias = "annualAttritionRatePct")]
    attrition_rate: Option<f64>,
    hiring_plan: Option<NumberList>,
    ramp_schedule: Option<NumberList>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    months: Vec<MonthlyResult>,
    summary: SimulationSummary,
    additional_hires_needed: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<SimulationInputs, InputError> {
    if !cli.quota_per_rep.is_finite() {
        return Err(InputError::NonFinite {
            field: "--quota-per-rep",
        });
    }

    if cli.quota_per_rep < 0.0 {
        return Err(InputError::Negative {
            field: "--quota-per-rep",
        });
    }

    if !cli.attrition_rate.is_finite() {
        return Err(InputError::NonFinite {
            field: "--attrition-rate",
        });
    }

    if !(0.0..=100.0).contains(&cli.attrition_rate) {
        warn!(
            attrition_rate = cli.attrition_rate,
            "attrition rate outside 0-100%, applying as given"
        );
    }

    let hiring_plan: [u32; PLANNING_HORIZON_MONTHS] = cli
        .hiring_plan
        .as_slice()
        .try_into()
        .map_err(|_| InputError::HiringPlanLength {
            expected: PLANNING_HORIZON_MONTHS,
            actual: cli.hiring_plan.len(),
        })?;

    if let Some(idx) = cli
        .ramp_schedule
        .iter()
        .position(|m| !m.is_finite() || *m < 0.0)
    {
        return Err(InputError::InvalidRampMultiplier { month: idx + 1 });
    }

    Ok(SimulationInputs {
        starting_headcount: cli.starting_headcount,
        quota_per_rep_annual: cli.quota_per_rep,
        annual_attrition_rate_pct: cli.attrition_rate,
        hiring_plan,
        ramp_schedule: cli.ramp_schedule,
    })
}

fn hires_from_values(values: &[f64]) -> Result<Vec<u32>, InputError> {
    values
        .iter()
        .enumerate()
        .map(|(idx, &v)| {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                Ok(v as u32)
            } else {
                Err(InputError::InvalidHires { month: idx + 1 })
            }
        })
        .collect()
}

pub fn run_cli<I, T>(args: I) -> Result<(), RunError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let format = cli.format;
    let inputs = build_inputs(cli)?;
    let result = run_simulation(&inputs);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Table => write_table(&mut out, &inputs, &result)?,
        OutputFormat::Csv => write_months_csv(&mut out, &result.months)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &build_simulate_response(&inputs, result))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_table<W: Write>(
    out: &mut W,
    inputs: &SimulationInputs,
    result: &SimulationResult,
) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:>9} {:>15} {:>19} {:>13}",
        "Month", "Headcount", "Street Revenue", "Spreadsheet Revenue", "Gap"
    )?;
    for month in &result.months {
        writeln!(
            out,
            "{:<10} {:>9} {:>15} {:>19} {:>13}",
            month_label(month.month_index),
            format_headcount(month.headcount),
            round_currency(month.street_revenue),
            round_currency(month.spreadsheet_revenue),
            round_currency(month.gap),
        )?;
    }

    let summary = &result.summary;
    writeln!(out)?;
    writeln!(
        out,
        "Spreadsheet capacity: {}",
        round_currency(summary.total_spreadsheet)
    )?;
    writeln!(out, "Street capacity:      {}", round_currency(summary.total_street))?;
    writeln!(
        out,
        "Revenue gap:          {} ({:.0}%)",
        round_currency(summary.total_gap),
        summary.gap_pct
    )?;
    if let Some(extra) = additional_hires_needed(inputs, summary) {
        writeln!(out, "Additional hires to close the gap: {extra}")?;
    }
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/export.csv",
            get(export_get_handler).post(export_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "quota cliff HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    payload: Result<Query<SimulatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload).await,
        Err(rejection) => malformed(rejection.body_text()),
    }
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload).await,
        Err(rejection) => malformed(rejection.body_text()),
    }
}

async fn export_get_handler(payload: Result<Query<SimulatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => export_handler_impl(payload).await,
        Err(rejection) => malformed(rejection.body_text()),
    }
}

async fn export_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => export_handler_impl(payload).await,
        Err(rejection) => malformed(rejection.body_text()),
    }
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(e) => return rejected(e),
    };
    info!(
        starting_headcount = inputs.starting_headcount,
        attrition_rate = inputs.annual_attrition_rate_pct,
        "simulate request"
    );

    let result = run_simulation(&inputs);
    json_response(StatusCode::OK, build_simulate_response(&inputs, result))
}

async fn export_handler_impl(payload: SimulatePayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(e) => return rejected(e),
    };
    info!(
        starting_headcount = inputs.starting_headcount,
        "export request"
    );

    let result = run_simulation(&inputs);
    match months_csv(&result.months) {
        Ok(body) => with_cache_control((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            body,
        )),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to render CSV: {e}"),
        ),
    }
}

fn rejected(e: InputError) -> Response {
    debug!(error = %e, "rejected request");
    error_response(StatusCode::BAD_REQUEST, &e.to_string())
}

// Extractor failures (blank or mistyped fields) share the JSON error shape.
fn malformed(text: String) -> Response {
    debug!(error = %text, "malformed request");
    error_response(StatusCode::BAD_REQUEST, &text)
}

fn build_simulate_response(
    inputs: &SimulationInputs,
    result: SimulationResult,
) -> SimulateResponse {
    SimulateResponse {
        additional_hires_needed: additional_hires_needed(inputs, &result.summary),
        summary: result.summary,
        months: result.months,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<SimulationInputs, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload).map_err(|e| e.to_string())
}

fn inputs_from_payload(payload: SimulatePayload) -> Result<SimulationInputs, InputError> {
    let mut cli = default_cli();

    if let Some(v) = payload.starting_headcount {
        cli.starting_headcount = v;
    }
    if let Some(v) = payload.quota_per_rep {
        cli.quota_per_rep = v;
    }
    if let Some(v) = payload.attrition_rate {
        cli.attrition_rate = v;
    }
    if let Some(list) = payload.hiring_plan {
        cli.hiring_plan = hires_from_values(&list.into_values("--hiring-plan")?)?;
    }
    if let Some(list) = payload.ramp_schedule {
        cli.ramp_schedule = list.into_values("--ramp-schedule")?;
    }

    build_inputs(cli)
}

fn default_cli() -> Cli {
    Cli {
        starting_headcount: DEFAULT_STARTING_HEADCOUNT,
        quota_per_rep: DEFAULT_QUOTA_PER_REP,
        attrition_rate: DEFAULT_ATTRITION_RATE,
        hiring_plan: DEFAULT_HIRING_PLAN.to_vec(),
        ramp_schedule: DEFAULT_RAMP_SCHEDULE.to_vec(),
        format: OutputFormat::Table,
    }
}
