//! Progressive bracket tables and marginal-rate evaluation.

use serde::{Deserialize, Serialize};

use super::error::{CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub lower_bound: f64,
    /// Marginal rate as a fraction, e.g. 0.05 for 5%.
    pub rate: f64,
}

impl Bracket {
    pub const fn new(lower_bound: f64, rate: f64) -> Self {
        Self { lower_bound, rate }
    }
}

/// Validated bracket table: non-empty, strictly increasing bounds, rates in [0, 1].
///
/// The only way to obtain one is through [`BracketTable::new`] (or deserialization,
/// which goes through the same checks), so evaluation never has to re-validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<Bracket>) -> CalcResult<Self> {
        if brackets.is_empty() {
            return Err(CalcError::InvalidBracketTable(
                "table must contain at least one bracket".to_string(),
            ));
        }

        for (idx, bracket) in brackets.iter().enumerate() {
            if !bracket.lower_bound.is_finite() || bracket.lower_bound < 0.0 {
                return Err(CalcError::InvalidBracketTable(format!(
                    "bracket {idx}: lower bound must be finite and >= 0"
                )));
            }
            if !(0.0..=1.0).contains(&bracket.rate) {
                return Err(CalcError::InvalidBracketTable(format!(
                    "bracket {idx}: rate must be between 0 and 1"
                )));
            }
        }

        if let Some(idx) = brackets
            .windows(2)
            .position(|pair| pair[1].lower_bound <= pair[0].lower_bound)
        {
            return Err(CalcError::InvalidBracketTable(format!(
                "bracket {}: lower bounds must be strictly increasing",
                idx + 1
            )));
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Income below this amount is untaxed by the table.
    pub fn exemption_threshold(&self) -> f64 {
        self.brackets[0].lower_bound
    }

    /// Rate applied to the next unit of income above `income`.
    pub fn marginal_rate(&self, income: f64) -> f64 {
        self.brackets
            .iter()
            .rev()
            .find(|bracket| income >= bracket.lower_bound)
            .map_or(0.0, |bracket| bracket.rate)
    }
}

impl TryFrom<Vec<Bracket>> for BracketTable {
    type Error = CalcError;

    fn try_from(value: Vec<Bracket>) -> Result<Self, Self::Error> {
        BracketTable::new(value)
    }
}

impl From<BracketTable> for Vec<Bracket> {
    fn from(value: BracketTable) -> Self {
        value.brackets
    }
}

/// Liability for `taxable_income` under `table`, before rebate and cess.
///
/// Each bracket only taxes the slice of income between its own lower bound and
/// the next bracket's lower bound, so crossing a boundary never re-prices the
/// income already taxed below it.
pub fn evaluate_brackets(taxable_income: f64, table: &BracketTable) -> f64 {
    let income = taxable_income.max(0.0);
    let brackets = table.brackets();

    let mut liability = 0.0;
    for (idx, bracket) in brackets.iter().enumerate() {
        if income <= bracket.lower_bound {
            break;
        }
        let upper = brackets
            .get(idx + 1)
            .map_or(f64::INFINITY, |next| next.lower_bound);
        let slice = income.min(upper) - bracket.lower_bound;
        liability += slice * bracket.rate;
    }

    liability
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn slab_table() -> BracketTable {
        BracketTable::new(vec![
            Bracket::new(0.0, 0.0),
            Bracket::new(300_000.0, 0.05),
            Bracket::new(600_000.0, 0.10),
            Bracket::new(900_000.0, 0.15),
            Bracket::new(1_200_000.0, 0.20),
            Bracket::new(1_500_000.0, 0.30),
        ])
        .expect("valid table")
    }

    #[test]
    fn evaluates_marginal_slices() {
        let table = slab_table();
        assert_approx(evaluate_brackets(900_000.0, &table), 45_000.0);
        assert_approx(evaluate_brackets(1_600_000.0, &table), 180_000.0);
    }

    #[test]
    fn income_at_boundary_only_taxes_excess_at_higher_rate() {
        let table = slab_table();
        assert_approx(evaluate_brackets(600_000.0, &table), 15_000.0);
        assert_approx(evaluate_brackets(600_001.0, &table), 15_000.1);
    }

    #[test]
    fn income_below_exemption_threshold_is_untaxed() {
        let table = BracketTable::new(vec![
            Bracket::new(250_000.0, 0.05),
            Bracket::new(500_000.0, 0.20),
        ])
        .expect("valid table");
        assert_approx(evaluate_brackets(0.0, &table), 0.0);
        assert_approx(evaluate_brackets(249_999.0, &table), 0.0);
        assert_approx(evaluate_brackets(250_000.0, &table), 0.0);
        assert_approx(evaluate_brackets(300_000.0, &table), 2_500.0);
        assert_approx(table.exemption_threshold(), 250_000.0);
    }

    #[test]
    fn negative_income_is_treated_as_zero() {
        assert_approx(evaluate_brackets(-10_000.0, &slab_table()), 0.0);
    }

    #[test]
    fn marginal_rate_tracks_bracket() {
        let table = slab_table();
        assert_approx(table.marginal_rate(100_000.0), 0.0);
        assert_approx(table.marginal_rate(600_000.0), 0.10);
        assert_approx(table.marginal_rate(5_000_000.0), 0.30);
    }

    #[test]
    fn rejects_empty_table() {
        let err = BracketTable::new(Vec::new()).expect_err("empty table");
        assert!(matches!(err, CalcError::InvalidBracketTable(_)));
    }

    #[test]
    fn rejects_unordered_bounds() {
        let err = BracketTable::new(vec![
            Bracket::new(0.0, 0.0),
            Bracket::new(500_000.0, 0.2),
            Bracket::new(500_000.0, 0.3),
        ])
        .expect_err("duplicate bound");
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn rejects_rate_outside_unit_interval() {
        let err = BracketTable::new(vec![Bracket::new(0.0, 1.5)]).expect_err("rate > 1");
        assert!(err.to_string().contains("rate"));
        assert!(BracketTable::new(vec![Bracket::new(0.0, f64::NAN)]).is_err());
        assert!(BracketTable::new(vec![Bracket::new(-1.0, 0.1)]).is_err());
    }

    #[test]
    fn deserialization_validates_table() {
        let ok: BracketTable =
            serde_json::from_str(r#"[{"lowerBound":0,"rate":0},{"lowerBound":100,"rate":0.1}]"#)
                .expect("valid json table");
        assert_eq!(ok.brackets().len(), 2);

        let bad = serde_json::from_str::<BracketTable>(
            r#"[{"lowerBound":100,"rate":0},{"lowerBound":50,"rate":0.1}]"#,
        );
        assert!(bad.is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_liability_is_monotone_in_income(
            low in 0u32..5_000_000,
            delta in 0u32..1_000_000
        ) {
            let table = slab_table();
            let low = low as f64;
            let high = low + delta as f64;
            prop_assert!(evaluate_brackets(high, &table) + EPS >= evaluate_brackets(low, &table));
        }

        #[test]
        fn prop_post_tax_income_never_decreases(
            income in 0u32..5_000_000,
            epsilon_paise in 1u32..10_000
        ) {
            let table = slab_table();
            let income = income as f64;
            let bumped = income + epsilon_paise as f64 / 100.0;
            let net_low = income - evaluate_brackets(income, &table);
            let net_high = bumped - evaluate_brackets(bumped, &table);
            prop_assert!(net_high + EPS >= net_low);
        }

        #[test]
        fn prop_liability_never_exceeds_income(income in 0u32..50_000_000) {
            let table = slab_table();
            let income = income as f64;
            let tax = evaluate_brackets(income, &table);
            prop_assert!(tax >= 0.0);
            prop_assert!(tax <= income + EPS);
        }
    }
}
