mod brackets;
mod deposit;
mod error;
mod gst;
mod loan;
mod schedules;
mod tax;
mod types;

pub use brackets::{Bracket, BracketTable, evaluate_brackets};
pub use deposit::{
    annual_compound_maturity, compute_maturity, contribution_months, lump_sum_maturity,
    periodic_contribution_maturity,
};
pub use error::{CalcError, CalcResult};
pub use gst::{compute_gst, gst_exclusive, gst_inclusive};
pub use loan::{amortization_schedule, compute_loan, loan_months, monthly_payment};
pub use schedules::{DEFAULT_CESS_RATE, DEFAULT_STANDARD_DEDUCTION, ScheduleSet, TaxSchedule};
pub use tax::{
    apply_cess, apply_marginal_relief, apply_rebate, cap_deductions, compare_regimes,
    compute_income_tax,
};
pub use types::{
    AgeCategory, AmortizationRow, CessSplit, Deductions, GstMode, GstResult, Instrument,
    InvestmentInput, InvestmentResult, LoanInput, LoanResult, RegimeComparison, TaxInput,
    TaxRegime, TaxResult,
};
