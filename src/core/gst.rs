use super::types::{GstMode, GstResult};

/// GST added on top of a pre-tax `amount`.
pub fn gst_exclusive(amount: f64, rate_percent: f64) -> GstResult {
    let net_amount = amount.max(0.0);
    let gst_amount = net_amount * rate_percent.max(0.0) / 100.0;
    build(GstMode::Exclusive, rate_percent, net_amount, gst_amount)
}

/// GST extracted from a tax-inclusive `amount`.
pub fn gst_inclusive(amount: f64, rate_percent: f64) -> GstResult {
    let total = amount.max(0.0);
    let net_amount = total * 100.0 / (100.0 + rate_percent.max(0.0));
    build(GstMode::Inclusive, rate_percent, net_amount, total - net_amount)
}

pub fn compute_gst(amount: f64, rate_percent: f64, mode: GstMode) -> GstResult {
    match mode {
        GstMode::Exclusive => gst_exclusive(amount, rate_percent),
        GstMode::Inclusive => gst_inclusive(amount, rate_percent),
    }
}

fn build(mode: GstMode, rate_percent: f64, net_amount: f64, gst_amount: f64) -> GstResult {
    // Intra-state supply splits evenly between the central and state levies.
    let half = gst_amount / 2.0;
    GstResult {
        mode,
        rate_percent,
        net_amount,
        gst_amount,
        total_amount: net_amount + gst_amount,
        cgst: half,
        sgst: half,
    }
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

    #[test]
    fn exclusive_adds_gst() {
        let result = gst_exclusive(1_000.0, 18.0);
        assert_eq!(result.mode, GstMode::Exclusive);
        assert_approx(result.gst_amount, 180.0);
        assert_approx(result.total_amount, 1_180.0);
        assert_approx(result.cgst, 90.0);
        assert_approx(result.sgst, 90.0);
    }

    #[test]
    fn inclusive_extracts_gst() {
        let result = gst_inclusive(1_180.0, 18.0);
        assert_eq!(result.mode, GstMode::Inclusive);
        assert_approx(result.net_amount, 1_000.0);
        assert_approx(result.gst_amount, 180.0);
        assert_approx(result.total_amount, 1_180.0);
    }

    #[test]
    fn zero_rate_leaves_amount_unchanged() {
        for mode in [GstMode::Exclusive, GstMode::Inclusive] {
            let result = compute_gst(500.0, 0.0, mode);
            assert_approx(result.net_amount, 500.0);
            assert_approx(result.gst_amount, 0.0);
            assert_approx(result.total_amount, 500.0);
        }
    }

    proptest! {
        #[test]
        fn prop_inclusive_recovers_exclusive_base(
            amount_paise in 0u64..100_000_000,
            rate in proptest::sample::select(vec![0.0, 0.25, 3.0, 5.0, 12.0, 18.0, 28.0])
        ) {
            let amount = amount_paise as f64 / 100.0;
            let exclusive = gst_exclusive(amount, rate);
            let inclusive = gst_inclusive(exclusive.total_amount, rate);
            prop_assert!((inclusive.net_amount - amount).abs() <= 1e-6 * amount.max(1.0));
            prop_assert!((inclusive.gst_amount - exclusive.gst_amount).abs() <= 1e-6 * amount.max(1.0));
        }
    }
}
