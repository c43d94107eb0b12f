//! Tax schedules: one [`TaxSchedule`] per regime and age category.
//!
//! The built-in values follow the published Indian slabs but are configuration,
//! not law: a [`ScheduleSet`] can be loaded from JSON to replace any of them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::brackets::{Bracket, BracketTable};
use super::error::{CalcError, CalcResult};
use super::types::{AgeCategory, TaxRegime};

pub const DEFAULT_CESS_RATE: f64 = 0.04;
pub const DEFAULT_STANDARD_DEDUCTION: f64 = 50_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSchedule {
    pub regime: TaxRegime,
    pub age_category: AgeCategory,
    pub brackets: BracketTable,
    #[serde(default)]
    pub standard_deduction: f64,
    #[serde(default = "default_true")]
    pub deductions_allowed: bool,
    #[serde(default)]
    pub deduction_caps: BTreeMap<String, f64>,
    #[serde(default)]
    pub rebate_threshold: f64,
    #[serde(default)]
    pub rebate_amount: f64,
    #[serde(default)]
    pub marginal_relief: bool,
    #[serde(default = "default_cess_rate")]
    pub cess_rate: f64,
}

fn default_true() -> bool {
    true
}

fn default_cess_rate() -> f64 {
    DEFAULT_CESS_RATE
}

impl TaxSchedule {
    pub fn builtin(regime: TaxRegime, age_category: AgeCategory) -> Self {
        match regime {
            TaxRegime::New => new_regime(age_category),
            TaxRegime::Old => old_regime(age_category),
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        let money = [
            ("standardDeduction", self.standard_deduction),
            ("rebateThreshold", self.rebate_threshold),
            ("rebateAmount", self.rebate_amount),
        ];
        for (name, value) in money {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::Config(format!(
                    "{:?}/{:?}: {name} must be >= 0",
                    self.regime, self.age_category
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.cess_rate) {
            return Err(CalcError::Config(format!(
                "{:?}/{:?}: cessRate must be between 0 and 1",
                self.regime, self.age_category
            )));
        }
        if let Some((code, _)) = self
            .deduction_caps
            .iter()
            .find(|(_, cap)| !cap.is_finite() || **cap < 0.0)
        {
            return Err(CalcError::Config(format!(
                "{:?}/{:?}: cap for {code} must be >= 0",
                self.regime, self.age_category
            )));
        }
        Ok(())
    }

    /// Trims and upper-cases the cap codes so they match claimed deductions.
    /// Two spellings of the same code are a configuration error.
    fn normalize_caps(&mut self) -> CalcResult<()> {
        let mut caps = BTreeMap::new();
        for (code, cap) in std::mem::take(&mut self.deduction_caps) {
            let normalized = code.trim().to_uppercase();
            if caps.insert(normalized.clone(), cap).is_some() {
                return Err(CalcError::Config(format!(
                    "{:?}/{:?}: duplicate cap for {normalized}",
                    self.regime, self.age_category
                )));
            }
        }
        self.deduction_caps = caps;
        Ok(())
    }
}

fn table(brackets: &[(f64, f64)]) -> BracketTable {
    let brackets = brackets
        .iter()
        .map(|&(lower_bound, rate)| Bracket::new(lower_bound, rate))
        .collect();
    BracketTable::new(brackets).expect("valid built-in bracket table")
}

fn new_regime(age_category: AgeCategory) -> TaxSchedule {
    TaxSchedule {
        regime: TaxRegime::New,
        age_category,
        brackets: table(&[
            (0.0, 0.0),
            (300_000.0, 0.05),
            (600_000.0, 0.10),
            (900_000.0, 0.15),
            (1_200_000.0, 0.20),
            (1_500_000.0, 0.30),
        ]),
        standard_deduction: DEFAULT_STANDARD_DEDUCTION,
        deductions_allowed: false,
        deduction_caps: BTreeMap::new(),
        rebate_threshold: 700_000.0,
        rebate_amount: 25_000.0,
        marginal_relief: true,
        cess_rate: DEFAULT_CESS_RATE,
    }
}

fn old_regime(age_category: AgeCategory) -> TaxSchedule {
    let brackets = match age_category {
        AgeCategory::BelowSixty => table(&[
            (0.0, 0.0),
            (250_000.0, 0.05),
            (500_000.0, 0.20),
            (1_000_000.0, 0.30),
        ]),
        AgeCategory::Senior => table(&[
            (0.0, 0.0),
            (300_000.0, 0.05),
            (500_000.0, 0.20),
            (1_000_000.0, 0.30),
        ]),
        AgeCategory::SuperSenior => table(&[(0.0, 0.0), (500_000.0, 0.20), (1_000_000.0, 0.30)]),
    };

    let mut caps = BTreeMap::from([
        ("80C".to_string(), 150_000.0),
        ("80CCD(1B)".to_string(), 50_000.0),
        ("24B".to_string(), 200_000.0),
    ]);
    match age_category {
        AgeCategory::BelowSixty => {
            caps.insert("80D".to_string(), 25_000.0);
            caps.insert("80TTA".to_string(), 10_000.0);
        }
        AgeCategory::Senior | AgeCategory::SuperSenior => {
            caps.insert("80D".to_string(), 50_000.0);
            caps.insert("80TTB".to_string(), 50_000.0);
        }
    }

    TaxSchedule {
        regime: TaxRegime::Old,
        age_category,
        brackets,
        standard_deduction: DEFAULT_STANDARD_DEDUCTION,
        deductions_allowed: true,
        deduction_caps: caps,
        rebate_threshold: 500_000.0,
        rebate_amount: 12_500.0,
        marginal_relief: false,
        cess_rate: DEFAULT_CESS_RATE,
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    schedules: Vec<TaxSchedule>,
}

/// Every schedule the calculators can use, keyed by regime and age category.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSet {
    schedules: BTreeMap<(TaxRegime, AgeCategory), TaxSchedule>,
}

impl Default for ScheduleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScheduleSet {
    pub fn builtin() -> Self {
        let schedules = TaxRegime::ALL
            .iter()
            .flat_map(|&regime| {
                AgeCategory::ALL.iter().map(move |&age| {
                    ((regime, age), TaxSchedule::builtin(regime, age))
                })
            })
            .collect();
        Self { schedules }
    }

    /// Parses a `{"schedules": [...]}` document. Pairs the document does not
    /// mention keep their built-in schedule.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let file: ScheduleFile = serde_json::from_str(json)
            .map_err(|e| CalcError::Config(format!("invalid schedule JSON: {e}")))?;

        let mut set = Self::builtin();
        for mut schedule in file.schedules {
            schedule.normalize_caps()?;
            schedule.validate()?;
            log::debug!(
                "overriding {:?}/{:?} schedule ({} brackets)",
                schedule.regime,
                schedule.age_category,
                schedule.brackets.brackets().len()
            );
            set.schedules
                .insert((schedule.regime, schedule.age_category), schedule);
        }
        Ok(set)
    }

    pub fn load(path: &Path) -> CalcResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CalcError::Config(format!("cannot read {}: {e}", path.display())))?;
        let set = Self::from_json(&json)?;
        log::info!("loaded tax schedules from {}", path.display());
        Ok(set)
    }

    pub fn get(&self, regime: TaxRegime, age_category: AgeCategory) -> &TaxSchedule {
        self.schedules
            .get(&(regime, age_category))
            .expect("schedule set covers every regime and age category")
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxSchedule> {
        self.schedules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_set_covers_every_pair() {
        let set = ScheduleSet::builtin();
        assert_eq!(set.iter().count(), 6);
        for regime in TaxRegime::ALL {
            for age in AgeCategory::ALL {
                let schedule = set.get(regime, age);
                assert_eq!(schedule.regime, regime);
                assert_eq!(schedule.age_category, age);
                schedule.validate().expect("built-in schedule is valid");
            }
        }
    }

    #[test]
    fn old_regime_exemption_rises_with_age() {
        let below = TaxSchedule::builtin(TaxRegime::Old, AgeCategory::BelowSixty);
        let senior = TaxSchedule::builtin(TaxRegime::Old, AgeCategory::Senior);
        let super_senior = TaxSchedule::builtin(TaxRegime::Old, AgeCategory::SuperSenior);
        assert_eq!(below.brackets.brackets()[1].lower_bound, 250_000.0);
        assert_eq!(senior.brackets.brackets()[1].lower_bound, 300_000.0);
        assert_eq!(super_senior.brackets.brackets()[1].lower_bound, 500_000.0);
        assert_eq!(senior.deduction_caps["80D"], 50_000.0);
        assert_eq!(below.deduction_caps["80D"], 25_000.0);
    }

    #[test]
    fn new_regime_disallows_deductions() {
        let schedule = TaxSchedule::builtin(TaxRegime::New, AgeCategory::Senior);
        assert!(!schedule.deductions_allowed);
        assert!(schedule.marginal_relief);
    }

    #[test]
    fn from_json_overrides_only_listed_pairs() {
        let json = r#"{
          "schedules": [{
            "regime": "new",
            "ageCategory": "below-sixty",
            "brackets": [{"lowerBound": 0, "rate": 0}, {"lowerBound": 400000, "rate": 0.05}],
            "rebateThreshold": 1200000,
            "rebateAmount": 60000
          }]
        }"#;
        let set = ScheduleSet::from_json(json).expect("valid schedule file");
        let overridden = set.get(TaxRegime::New, AgeCategory::BelowSixty);
        assert_eq!(overridden.brackets.brackets().len(), 2);
        assert_eq!(overridden.rebate_amount, 60_000.0);
        assert_eq!(overridden.cess_rate, DEFAULT_CESS_RATE);
        assert!(overridden.deductions_allowed);
        assert_eq!(overridden.standard_deduction, 0.0);

        let untouched = set.get(TaxRegime::New, AgeCategory::Senior);
        assert_eq!(*untouched, TaxSchedule::builtin(TaxRegime::New, AgeCategory::Senior));
    }

    #[test]
    fn from_json_rejects_invalid_brackets() {
        let json = r#"{
          "schedules": [{
            "regime": "old",
            "ageCategory": "senior",
            "brackets": [{"lowerBound": 0, "rate": 2}]
          }]
        }"#;
        let err = ScheduleSet::from_json(json).expect_err("rate above 1");
        assert!(matches!(err, CalcError::Config(_)));
    }

    #[test]
    fn from_json_rejects_negative_caps() {
        let json = r#"{
          "schedules": [{
            "regime": "old",
            "ageCategory": "senior",
            "brackets": [{"lowerBound": 0, "rate": 0.1}],
            "deductionCaps": {"80C": -1}
          }]
        }"#;
        let err = ScheduleSet::from_json(json).expect_err("negative cap");
        assert!(err.to_string().contains("80C"));
    }

    #[test]
    fn from_json_normalizes_cap_codes() {
        let json = r#"{
          "schedules": [{
            "regime": "old",
            "ageCategory": "below-sixty",
            "brackets": [{"lowerBound": 0, "rate": 0.1}],
            "deductionCaps": {"80c": 150000, " 80d ": 25000}
          }]
        }"#;
        let set = ScheduleSet::from_json(json).expect("valid schedule file");
        let caps = &set.get(TaxRegime::Old, AgeCategory::BelowSixty).deduction_caps;
        assert_eq!(caps.get("80C"), Some(&150_000.0));
        assert_eq!(caps.get("80D"), Some(&25_000.0));
        assert!(!caps.contains_key("80c"));
    }

    #[test]
    fn from_json_rejects_duplicate_cap_spellings() {
        let json = r#"{
          "schedules": [{
            "regime": "old",
            "ageCategory": "senior",
            "brackets": [{"lowerBound": 0, "rate": 0.1}],
            "deductionCaps": {"80c": 150000, "80C": 100000}
          }]
        }"#;
        let err = ScheduleSet::from_json(json).expect_err("duplicate cap code");
        assert!(err.to_string().contains("duplicate cap for 80C"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ScheduleSet::load(Path::new("/nonexistent/schedules.json"))
            .expect_err("missing file");
        assert!(matches!(err, CalcError::Config(_)));
    }
}
