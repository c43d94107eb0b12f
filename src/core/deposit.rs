//! Maturity values for fixed (lump-sum), recurring and annually compounded deposits.

use super::types::{Instrument, InvestmentInput, InvestmentResult};

/// `principal * (1 + r / (100 * freq)) ^ (freq * years)`.
pub fn lump_sum_maturity(
    principal: f64,
    annual_rate_percent: f64,
    years: f64,
    compounding_frequency: u32,
) -> f64 {
    let freq = compounding_frequency.max(1) as f64;
    let periodic_rate = annual_rate_percent / (100.0 * freq);
    principal * (1.0 + periodic_rate).powf(freq * years)
}

/// Number of monthly contributions in a term, rounded to the nearest month.
pub fn contribution_months(years: f64) -> u32 {
    (years.max(0.0) * 12.0).round() as u32
}

/// Future value of monthly contributions, each made at the start of its month
/// (annuity-due), compounded monthly.
pub fn periodic_contribution_maturity(
    monthly_amount: f64,
    annual_rate_percent: f64,
    years: f64,
) -> f64 {
    let months = contribution_months(years) as f64;
    let i = annual_rate_percent / 1200.0;
    if i == 0.0 {
        return monthly_amount * months;
    }
    monthly_amount * ((1.0 + i).powf(months) - 1.0) / i * (1.0 + i)
}

/// `principal * (1 + r / 100) ^ years`.
pub fn annual_compound_maturity(principal: f64, annual_rate_percent: f64, years: f64) -> f64 {
    principal * (1.0 + annual_rate_percent / 100.0).powf(years)
}

pub fn compute_maturity(input: &InvestmentInput) -> InvestmentResult {
    let amount = input.principal_or_contribution;
    let (maturity_amount, total_contributed) = match input.instrument {
        Instrument::LumpSum => (
            lump_sum_maturity(
                amount,
                input.annual_rate_percent,
                input.term_years,
                input.compounding_frequency,
            ),
            amount,
        ),
        Instrument::Recurring => (
            periodic_contribution_maturity(amount, input.annual_rate_percent, input.term_years),
            amount * contribution_months(input.term_years) as f64,
        ),
        Instrument::Annual => (
            annual_compound_maturity(amount, input.annual_rate_percent, input.term_years),
            amount,
        ),
    };

    log::debug!(
        "{:?} deposit: contributed={total_contributed} maturity={maturity_amount}",
        input.instrument
    );

    InvestmentResult {
        instrument: input.instrument,
        maturity_amount,
        total_contributed,
        total_interest: maturity_amount - total_contributed,
    }
}
