mod forms;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    CalcError, CalcResult, ScheduleSet, TaxSchedule, compare_regimes, compute_gst,
    compute_income_tax, compute_loan, compute_maturity,
};

pub use forms::{
    CliAgeCategory, CliGstMode, CliInstrument, CliRegime, DepositArgs, GstArgs, GstRequest,
    LoanArgs, TaxArgs, build_gst_request, build_investment_input, build_loan_input,
    build_tax_input, parse_deduction,
};
use forms::{default_deposit_args, default_gst_args, default_loan_args, default_tax_args};

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    about = "Income tax, GST, deposit maturity and loan calculators"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "JSON file replacing the built-in tax schedules"
    )]
    pub schedules: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Income tax under one regime
    Tax(TaxArgs),
    /// Income tax under both regimes, with a recommendation
    CompareTax(TaxArgs),
    /// GST added to or extracted from an amount
    Gst(GstArgs),
    /// Maturity value of a fixed, recurring or annually compounded deposit
    Deposit(DepositArgs),
    /// Monthly instalment and amortization for a loan
    Loan(LoanArgs),
    /// Serve the calculators over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let schedules = match &cli.schedules {
        Some(path) => ScheduleSet::load(path)?,
        None => ScheduleSet::builtin(),
    };

    if let Command::Serve { port } = cli.command {
        return Ok(run_http_server(port, schedules).await?);
    }

    let output = run_command(&cli.command, &schedules)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Runs a one-shot calculator command and returns its JSON result.
pub fn run_command(
    command: &Command,
    schedules: &ScheduleSet,
) -> Result<serde_json::Value, AppError> {
    let value = match command {
        Command::Tax(args) => serde_json::to_value(tax_result(args, schedules)?)?,
        Command::CompareTax(args) => serde_json::to_value(compare_result(args, schedules)?)?,
        Command::Gst(args) => serde_json::to_value(gst_result(args)?)?,
        Command::Deposit(args) => serde_json::to_value(deposit_result(args)?)?,
        Command::Loan(args) => serde_json::to_value(loan_result(args)?)?,
        Command::Serve { .. } => {
            return Err(CalcError::invalid_input("serve", "not a one-shot calculation").into());
        }
    };
    Ok(value)
}

fn tax_result(args: &TaxArgs, schedules: &ScheduleSet) -> CalcResult<crate::core::TaxResult> {
    let (regime, input) = build_tax_input(args)?;
    Ok(compute_income_tax(&input, schedules.get(regime, input.age_category)))
}

fn compare_result(
    args: &TaxArgs,
    schedules: &ScheduleSet,
) -> CalcResult<crate::core::RegimeComparison> {
    let (_, input) = build_tax_input(args)?;
    Ok(compare_regimes(&input, schedules))
}

fn gst_result(args: &GstArgs) -> CalcResult<crate::core::GstResult> {
    let request = build_gst_request(args)?;
    Ok(compute_gst(request.amount, request.rate_percent, request.mode))
}

fn deposit_result(args: &DepositArgs) -> CalcResult<crate::core::InvestmentResult> {
    Ok(compute_maturity(&build_investment_input(args)?))
}

fn loan_result(args: &LoanArgs) -> CalcResult<crate::core::LoanResult> {
    Ok(compute_loan(&build_loan_input(args)?, args.schedule))
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRegime {
    Old,
    New,
}

impl From<ApiRegime> for CliRegime {
    fn from(value: ApiRegime) -> Self {
        match value {
            ApiRegime::Old => CliRegime::Old,
            ApiRegime::New => CliRegime::New,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAgeCategory {
    #[serde(alias = "belowSixty", alias = "below_sixty", alias = "general")]
    BelowSixty,
    Senior,
    #[serde(alias = "superSenior", alias = "super_senior")]
    SuperSenior,
}

impl From<ApiAgeCategory> for CliAgeCategory {
    fn from(value: ApiAgeCategory) -> Self {
        match value {
            ApiAgeCategory::BelowSixty => CliAgeCategory::BelowSixty,
            ApiAgeCategory::Senior => CliAgeCategory::Senior,
            ApiAgeCategory::SuperSenior => CliAgeCategory::SuperSenior,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGstMode {
    #[serde(alias = "add")]
    Exclusive,
    #[serde(alias = "remove")]
    Inclusive,
}

impl From<ApiGstMode> for CliGstMode {
    fn from(value: ApiGstMode) -> Self {
        match value {
            ApiGstMode::Exclusive => CliGstMode::Exclusive,
            ApiGstMode::Inclusive => CliGstMode::Inclusive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiInstrument {
    #[serde(alias = "lumpSum", alias = "lump_sum", alias = "fd")]
    LumpSum,
    #[serde(alias = "rd")]
    Recurring,
    #[serde(alias = "nsc")]
    Annual,
}

impl From<ApiInstrument> for CliInstrument {
    fn from(value: ApiInstrument) -> Self {
        match value {
            ApiInstrument::LumpSum => CliInstrument::LumpSum,
            ApiInstrument::Recurring => CliInstrument::Recurring,
            ApiInstrument::Annual => CliInstrument::Annual,
        }
    }
}

/// Deductions arrive as a JSON object in POST bodies and as a
/// `80C=150000,80D=25000` string in query strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DeductionsField {
    Map(BTreeMap<String, f64>),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    gross_income: Option<f64>,
    regime: Option<ApiRegime>,
    age_category: Option<ApiAgeCategory>,
    age: Option<u32>,
    deductions: Option<DeductionsField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GstPayload {
    amount: Option<f64>,
    rate: Option<f64>,
    mode: Option<ApiGstMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DepositPayload {
    instrument: Option<ApiInstrument>,
    amount: Option<f64>,
    rate: Option<f64>,
    years: Option<f64>,
    compounding_frequency: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanPayload {
    amount: Option<f64>,
    rate: Option<f64>,
    years: Option<f64>,
    schedule: Option<bool>,
}

fn required<T>(value: Option<T>, field: &str) -> CalcResult<T> {
    value.ok_or_else(|| CalcError::invalid_input(field, "is required"))
}

fn tax_args_from_payload(payload: TaxPayload) -> CalcResult<TaxArgs> {
    let mut args = default_tax_args();
    args.gross_income = required(payload.gross_income, "grossIncome")?;
    if let Some(v) = payload.regime {
        args.regime = v.into();
    }
    if let Some(v) = payload.age_category {
        args.age_category = v.into();
    }
    args.age = payload.age;
    args.deductions = match payload.deductions {
        None => Vec::new(),
        Some(DeductionsField::Map(map)) => map
            .into_iter()
            .map(|(code, amount)| (code.trim().to_uppercase(), amount))
            .collect(),
        Some(DeductionsField::Text(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                parse_deduction(part)
                    .map_err(|reason| CalcError::invalid_input("deductions", reason))
            })
            .collect::<CalcResult<Vec<_>>>()?,
    };
    Ok(args)
}

fn gst_args_from_payload(payload: GstPayload) -> CalcResult<GstArgs> {
    let mut args = default_gst_args();
    args.amount = required(payload.amount, "amount")?;
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.mode {
        args.mode = v.into();
    }
    Ok(args)
}

fn deposit_args_from_payload(payload: DepositPayload) -> CalcResult<DepositArgs> {
    let mut args = default_deposit_args();
    args.amount = required(payload.amount, "amount")?;
    if let Some(v) = payload.instrument {
        args.instrument = v.into();
    }
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.compounding_frequency {
        args.compounding_frequency = v;
    }
    Ok(args)
}

fn loan_args_from_payload(payload: LoanPayload) -> CalcResult<LoanArgs> {
    let mut args = default_loan_args();
    args.amount = required(payload.amount, "amount")?;
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.schedule {
        args.schedule = v;
    }
    Ok(args)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchedulesResponse<'a> {
    schedules: Vec<&'a TaxSchedule>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

type AppState = Arc<ScheduleSet>;

pub fn router(schedules: ScheduleSet) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/schedules", get(schedules_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route(
            "/api/tax/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route("/api/gst", get(gst_get_handler).post(gst_post_handler))
        .route(
            "/api/deposit",
            get(deposit_get_handler).post(deposit_post_handler),
        )
        .route("/api/loan", get(loan_get_handler).post(loan_post_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(schedules))
}

pub async fn run_http_server(port: u16, schedules: ScheduleSet) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(schedules);

    let listener = TcpListener::bind(addr).await?;
    log::info!("fincalc HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/api/tax?grossIncome=1000000");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn schedules_handler(State(schedules): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        SchedulesResponse {
            schedules: schedules.iter().collect(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn tax_get_handler(
    State(schedules): State<AppState>,
    payload: Result<Query<TaxPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => tax_handler_impl(&schedules, payload),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn tax_post_handler(
    State(schedules): State<AppState>,
    payload: Result<Json<TaxPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => tax_handler_impl(&schedules, payload),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

fn tax_handler_impl(schedules: &ScheduleSet, payload: TaxPayload) -> Response {
    calculation_response(
        tax_args_from_payload(payload).and_then(|args| tax_result(&args, schedules)),
    )
}

async fn compare_get_handler(
    State(schedules): State<AppState>,
    payload: Result<Query<TaxPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => compare_handler_impl(&schedules, payload),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn compare_post_handler(
    State(schedules): State<AppState>,
    payload: Result<Json<TaxPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => compare_handler_impl(&schedules, payload),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

fn compare_handler_impl(schedules: &ScheduleSet, payload: TaxPayload) -> Response {
    calculation_response(
        tax_args_from_payload(payload).and_then(|args| compare_result(&args, schedules)),
    )
}

async fn gst_get_handler(payload: Result<Query<GstPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => {
            calculation_response(gst_args_from_payload(payload).and_then(|a| gst_result(&a)))
        }
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn gst_post_handler(payload: Result<Json<GstPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => {
            calculation_response(gst_args_from_payload(payload).and_then(|a| gst_result(&a)))
        }
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn deposit_get_handler(payload: Result<Query<DepositPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => calculation_response(
            deposit_args_from_payload(payload).and_then(|a| deposit_result(&a)),
        ),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn deposit_post_handler(payload: Result<Json<DepositPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => calculation_response(
            deposit_args_from_payload(payload).and_then(|a| deposit_result(&a)),
        ),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn loan_get_handler(payload: Result<Query<LoanPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => {
            calculation_response(loan_args_from_payload(payload).and_then(|a| loan_result(&a)))
        }
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn loan_post_handler(payload: Result<Json<LoanPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => {
            calculation_response(loan_args_from_payload(payload).and_then(|a| loan_result(&a)))
        }
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

fn calculation_response<T: Serialize>(result: CalcResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            log::warn!("rejected calculator input: {e}");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn rejection_response(body: String) -> Response {
    log::warn!("rejected malformed payload: {body}");
    error_response(StatusCode::BAD_REQUEST, &body)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
