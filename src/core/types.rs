use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxRegime {
    Old,
    New,
}

impl TaxRegime {
    pub const ALL: [TaxRegime; 2] = [TaxRegime::Old, TaxRegime::New];
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeCategory {
    BelowSixty,
    Senior,
    SuperSenior,
}

impl AgeCategory {
    pub const ALL: [AgeCategory; 3] = [
        AgeCategory::BelowSixty,
        AgeCategory::Senior,
        AgeCategory::SuperSenior,
    ];

    pub fn from_age(age: u32) -> Self {
        match age {
            0..=59 => AgeCategory::BelowSixty,
            60..=79 => AgeCategory::Senior,
            _ => AgeCategory::SuperSenior,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GstMode {
    Exclusive,
    Inclusive,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Instrument {
    /// Fixed deposit, compounded `compounding_frequency` times a year.
    LumpSum,
    /// Recurring deposit, monthly contributions.
    Recurring,
    /// Certificate-style deposit compounded once a year.
    Annual,
}

/// Deductions keyed by section code ("80C", "80D", ...).
pub type Deductions = BTreeMap<String, f64>;

#[derive(Debug, Clone)]
pub struct TaxInput {
    pub gross_income: f64,
    pub deductions: Deductions,
    pub age_category: AgeCategory,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub regime: TaxRegime,
    pub gross_income: f64,
    pub total_deductions: f64,
    pub taxable_income: f64,
    pub base_tax: f64,
    pub rebate: f64,
    pub marginal_relief: f64,
    pub cess: f64,
    pub total_tax: f64,
    pub net_income: f64,
    pub effective_rate: f64,
    /// Bracket rate on the next rupee of taxable income.
    pub marginal_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeComparison {
    pub old: TaxResult,
    pub new: TaxResult,
    pub recommended: TaxRegime,
    pub savings: f64,
}

/// A liability split into the part before cess and the cess itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CessSplit {
    pub base: f64,
    pub cess: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GstResult {
    pub mode: GstMode,
    pub rate_percent: f64,
    pub net_amount: f64,
    pub gst_amount: f64,
    pub total_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
}

#[derive(Debug, Clone)]
pub struct InvestmentInput {
    pub instrument: Instrument,
    pub principal_or_contribution: f64,
    pub annual_rate_percent: f64,
    pub term_years: f64,
    pub compounding_frequency: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResult {
    pub instrument: Instrument,
    pub maturity_amount: f64,
    pub total_contributed: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone)]
pub struct LoanInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_years: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResult {
    pub monthly_payment: f64,
    pub months: u32,
    pub total_payment: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationRow>,
}
