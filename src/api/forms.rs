//! Calculator forms: clap argument sets and the validation that turns them into
//! engine inputs. HTTP payloads are applied on top of the same argument sets, so
//! both surfaces reject bad input with identical messages.

use clap::{Args, ValueEnum};

use crate::core::{
    AgeCategory, CalcError, CalcResult, Deductions, GstMode, Instrument, InvestmentInput,
    LoanInput, TaxInput, TaxRegime,
};

const MAX_RATE_PERCENT: f64 = 100.0;
const MAX_TERM_YEARS: f64 = 100.0;
const MAX_COMPOUNDING_FREQUENCY: u32 = 365;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRegime {
    Old,
    New,
}

impl From<CliRegime> for TaxRegime {
    fn from(value: CliRegime) -> Self {
        match value {
            CliRegime::Old => TaxRegime::Old,
            CliRegime::New => TaxRegime::New,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliAgeCategory {
    BelowSixty,
    Senior,
    SuperSenior,
}

impl From<CliAgeCategory> for AgeCategory {
    fn from(value: CliAgeCategory) -> Self {
        match value {
            CliAgeCategory::BelowSixty => AgeCategory::BelowSixty,
            CliAgeCategory::Senior => AgeCategory::Senior,
            CliAgeCategory::SuperSenior => AgeCategory::SuperSenior,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliGstMode {
    Exclusive,
    Inclusive,
}

impl From<CliGstMode> for GstMode {
    fn from(value: CliGstMode) -> Self {
        match value {
            CliGstMode::Exclusive => GstMode::Exclusive,
            CliGstMode::Inclusive => GstMode::Inclusive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliInstrument {
    LumpSum,
    Recurring,
    Annual,
}

impl From<CliInstrument> for Instrument {
    fn from(value: CliInstrument) -> Self {
        match value {
            CliInstrument::LumpSum => Instrument::LumpSum,
            CliInstrument::Recurring => Instrument::Recurring,
            CliInstrument::Annual => Instrument::Annual,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TaxArgs {
    #[arg(long, help = "Gross annual income")]
    pub gross_income: f64,
    #[arg(long, value_enum, default_value_t = CliRegime::New)]
    pub regime: CliRegime,
    #[arg(long, value_enum, default_value_t = CliAgeCategory::BelowSixty)]
    pub age_category: CliAgeCategory,
    #[arg(long, help = "Age in years; overrides --age-category")]
    pub age: Option<u32>,
    #[arg(
        long = "deduction",
        value_name = "CODE=AMOUNT",
        value_parser = parse_deduction,
        help = "Claimed deduction, e.g. 80C=150000; repeatable"
    )]
    pub deductions: Vec<(String, f64)>,
}

#[derive(Args, Debug, Clone)]
pub struct GstArgs {
    #[arg(long)]
    pub amount: f64,
    #[arg(long, help = "GST rate in percent, e.g. 18")]
    pub rate: f64,
    #[arg(long, value_enum, default_value_t = CliGstMode::Exclusive)]
    pub mode: CliGstMode,
}

#[derive(Args, Debug, Clone)]
pub struct DepositArgs {
    #[arg(long, value_enum, default_value_t = CliInstrument::LumpSum)]
    pub instrument: CliInstrument,
    #[arg(
        long,
        help = "Principal for lump-sum and annual deposits, monthly contribution for recurring"
    )]
    pub amount: f64,
    #[arg(long, help = "Annual interest rate in percent")]
    pub rate: f64,
    #[arg(long, help = "Term in years")]
    pub years: f64,
    #[arg(
        long,
        default_value_t = 4,
        help = "Compounding periods per year for lump-sum deposits"
    )]
    pub compounding_frequency: u32,
}

#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    #[arg(long)]
    pub amount: f64,
    #[arg(long, help = "Annual interest rate in percent")]
    pub rate: f64,
    #[arg(long, help = "Term in years")]
    pub years: f64,
    #[arg(long, help = "Include the month-by-month schedule")]
    pub schedule: bool,
}

pub fn parse_deduction(raw: &str) -> Result<(String, f64), String> {
    let Some((code, amount)) = raw.split_once('=') else {
        return Err(format!("expected CODE=AMOUNT, got {raw:?}"));
    };
    let code = code.trim();
    if code.is_empty() {
        return Err(format!("missing deduction code in {raw:?}"));
    }
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid amount for {code}: {e}"))?;
    Ok((code.to_uppercase(), amount))
}

fn require_non_negative(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(field, "must be a number >= 0"));
    }
    Ok(())
}

fn require_rate(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || !(0.0..=MAX_RATE_PERCENT).contains(&value) {
        return Err(CalcError::invalid_input(
            field,
            format!("must be between 0 and {MAX_RATE_PERCENT}"),
        ));
    }
    Ok(())
}

fn require_term(field: &str, value: f64, allow_zero: bool) -> CalcResult<()> {
    let in_range = if allow_zero {
        (0.0..=MAX_TERM_YEARS).contains(&value)
    } else {
        value > 0.0 && value <= MAX_TERM_YEARS
    };
    if !value.is_finite() || !in_range {
        let lower = if allow_zero { ">= 0" } else { "> 0" };
        return Err(CalcError::invalid_input(
            field,
            format!("must be {lower} and <= {MAX_TERM_YEARS}"),
        ));
    }
    Ok(())
}

pub fn build_tax_input(args: &TaxArgs) -> CalcResult<(TaxRegime, TaxInput)> {
    require_non_negative("--gross-income", args.gross_income)?;

    let mut deductions = Deductions::new();
    for (code, amount) in &args.deductions {
        require_non_negative(&format!("--deduction {code}"), *amount)?;
        *deductions.entry(code.clone()).or_insert(0.0) += amount;
    }

    let age_category = match args.age {
        Some(age) if age > 130 => {
            return Err(CalcError::invalid_input("--age", "must be <= 130"));
        }
        Some(age) => AgeCategory::from_age(age),
        None => args.age_category.into(),
    };

    Ok((
        args.regime.into(),
        TaxInput {
            gross_income: args.gross_income,
            deductions,
            age_category,
        },
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct GstRequest {
    pub amount: f64,
    pub rate_percent: f64,
    pub mode: GstMode,
}

pub fn build_gst_request(args: &GstArgs) -> CalcResult<GstRequest> {
    require_non_negative("--amount", args.amount)?;
    require_rate("--rate", args.rate)?;
    Ok(GstRequest {
        amount: args.amount,
        rate_percent: args.rate,
        mode: args.mode.into(),
    })
}

pub fn build_investment_input(args: &DepositArgs) -> CalcResult<InvestmentInput> {
    require_non_negative("--amount", args.amount)?;
    require_rate("--rate", args.rate)?;
    require_term("--years", args.years, true)?;
    if !(1..=MAX_COMPOUNDING_FREQUENCY).contains(&args.compounding_frequency) {
        return Err(CalcError::invalid_input(
            "--compounding-frequency",
            format!("must be between 1 and {MAX_COMPOUNDING_FREQUENCY}"),
        ));
    }

    Ok(InvestmentInput {
        instrument: args.instrument.into(),
        principal_or_contribution: args.amount,
        annual_rate_percent: args.rate,
        term_years: args.years,
        compounding_frequency: args.compounding_frequency,
    })
}

pub fn build_loan_input(args: &LoanArgs) -> CalcResult<LoanInput> {
    require_non_negative("--amount", args.amount)?;
    require_rate("--rate", args.rate)?;
    require_term("--years", args.years, false)?;
    Ok(LoanInput {
        principal: args.amount,
        annual_rate_percent: args.rate,
        term_years: args.years,
    })
}

pub fn default_tax_args() -> TaxArgs {
    TaxArgs {
        gross_income: 0.0,
        regime: CliRegime::New,
        age_category: CliAgeCategory::BelowSixty,
        age: None,
        deductions: Vec::new(),
    }
}

pub fn default_gst_args() -> GstArgs {
    GstArgs {
        amount: 0.0,
        rate: 18.0,
        mode: CliGstMode::Exclusive,
    }
}

pub fn default_deposit_args() -> DepositArgs {
    DepositArgs {
        instrument: CliInstrument::LumpSum,
        amount: 0.0,
        rate: 7.0,
        years: 5.0,
        compounding_frequency: 4,
    }
}

pub fn default_loan_args() -> LoanArgs {
    LoanArgs {
        amount: 0.0,
        rate: 8.5,
        years: 5.0,
        schedule: false,
    }
}
