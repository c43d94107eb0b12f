use super::types::{AmortizationRow, LoanInput, LoanResult};

pub fn loan_months(term_years: f64) -> u32 {
    (term_years.max(0.0) * 12.0).round().max(1.0) as u32
}

/// Equated monthly instalment for a fully amortizing loan.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_years: f64) -> f64 {
    let n = loan_months(term_years) as f64;
    let i = annual_rate_percent / 1200.0;
    if i == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + i).powf(n);
    principal * i * growth / (growth - 1.0)
}

pub fn amortization_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_years: f64,
) -> Vec<AmortizationRow> {
    let months = loan_months(term_years);
    let payment = monthly_payment(principal, annual_rate_percent, term_years);
    let i = annual_rate_percent / 1200.0;

    let mut balance = principal;
    let mut rows = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let interest = balance * i;
        // The last instalment settles whatever rounding drift is left.
        let principal_part = if month == months {
            balance
        } else {
            (payment - interest).min(balance)
        };
        balance = (balance - principal_part).max(0.0);
        rows.push(AmortizationRow {
            month,
            payment: principal_part + interest,
            principal: principal_part,
            interest,
            balance,
        });
    }
    rows
}

pub fn compute_loan(input: &LoanInput, include_schedule: bool) -> LoanResult {
    let months = loan_months(input.term_years);
    let payment = monthly_payment(input.principal, input.annual_rate_percent, input.term_years);
    let total_payment = payment * months as f64;

    log::debug!(
        "loan: principal={} months={months} payment={payment}",
        input.principal
    );

    LoanResult {
        monthly_payment: payment,
        months,
        total_payment,
        total_interest: total_payment - input.principal,
        schedule: if include_schedule {
            amortization_schedule(input.principal, input.annual_rate_percent, input.term_years)
        } else {
            Vec::new()
        },
    }
}
