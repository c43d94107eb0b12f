use super::brackets::evaluate_brackets;
use super::schedules::{ScheduleSet, TaxSchedule};
use super::types::{CessSplit, Deductions, RegimeComparison, TaxInput, TaxRegime, TaxResult};

/// Reduces `base_tax` by `rebate_amount` when `gross_income` is at or below the
/// threshold. Never returns a negative liability.
pub fn apply_rebate(
    base_tax: f64,
    gross_income: f64,
    rebate_threshold: f64,
    rebate_amount: f64,
) -> f64 {
    let base_tax = base_tax.max(0.0);
    if gross_income <= rebate_threshold {
        (base_tax - rebate_amount.max(0.0)).max(0.0)
    } else {
        base_tax
    }
}

/// Lowers the pre-cess liability of an income just above the rebate threshold
/// so that liability plus cess never exceeds the income above the threshold.
pub fn apply_marginal_relief(
    liability: f64,
    income: f64,
    rebate_threshold: f64,
    cess_rate: f64,
) -> f64 {
    let liability = liability.max(0.0);
    if income <= rebate_threshold {
        return liability;
    }
    liability.min((income - rebate_threshold) / (1.0 + cess_rate.max(0.0)))
}

/// Cess is a flat surcharge on the post-rebate liability.
pub fn apply_cess(liability: f64, cess_rate: f64) -> CessSplit {
    let base = liability.max(0.0);
    let cess = base * cess_rate.max(0.0);
    CessSplit {
        base,
        cess,
        total: base + cess,
    }
}

/// Sums claimed deductions, clamping each capped code to `[0, cap]`. Codes
/// without a cap count in full.
pub fn cap_deductions(deductions: &Deductions, caps: &Deductions) -> f64 {
    deductions
        .iter()
        .map(|(code, &claimed)| match caps.get(code) {
            Some(&cap) => claimed.clamp(0.0, cap.max(0.0)),
            None => claimed,
        })
        .sum()
}

pub fn compute_income_tax(input: &TaxInput, schedule: &TaxSchedule) -> TaxResult {
    let gross_income = input.gross_income.max(0.0);

    let claimed = if schedule.deductions_allowed {
        cap_deductions(&input.deductions, &schedule.deduction_caps)
    } else {
        0.0
    };
    let total_deductions = (schedule.standard_deduction + claimed).max(0.0);
    let taxable_income = (gross_income - total_deductions).max(0.0);

    let base_tax = evaluate_brackets(taxable_income, &schedule.brackets);
    let after_rebate = apply_rebate(
        base_tax,
        gross_income,
        schedule.rebate_threshold,
        schedule.rebate_amount,
    );
    let after_relief = if schedule.marginal_relief {
        apply_marginal_relief(
            after_rebate,
            gross_income,
            schedule.rebate_threshold,
            schedule.cess_rate,
        )
    } else {
        after_rebate
    };
    let split = apply_cess(after_relief, schedule.cess_rate);

    let total_tax = split.total;
    let net_income = (gross_income - total_tax).max(0.0);
    let effective_rate = if gross_income > 0.0 {
        total_tax / gross_income
    } else {
        0.0
    };

    log::debug!(
        "{:?} regime: gross={gross_income} taxable={taxable_income} base={base_tax} total={total_tax}",
        schedule.regime
    );

    TaxResult {
        regime: schedule.regime,
        gross_income,
        total_deductions,
        taxable_income,
        base_tax,
        rebate: base_tax - split.base,
        marginal_relief: after_rebate - after_relief,
        cess: split.cess,
        total_tax,
        net_income,
        effective_rate,
        marginal_rate: schedule.brackets.marginal_rate(taxable_income),
    }
}

/// Computes both regimes for one input. Ties favour the new regime, which
/// needs no deduction paperwork.
pub fn compare_regimes(input: &TaxInput, schedules: &ScheduleSet) -> RegimeComparison {
    let old = compute_income_tax(input, schedules.get(TaxRegime::Old, input.age_category));
    let new = compute_income_tax(input, schedules.get(TaxRegime::New, input.age_category));

    let recommended = if old.total_tax < new.total_tax {
        TaxRegime::Old
    } else {
        TaxRegime::New
    };
    let savings = (old.total_tax - new.total_tax).abs();

    RegimeComparison {
        old,
        new,
        recommended,
        savings,
    }
}
