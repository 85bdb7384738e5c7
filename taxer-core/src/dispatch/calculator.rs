//! The calculator contract: eligibility matching and rule resolution.
//!
//! A concrete calculator supplies its currency, the country codes and income
//! range it covers, and a [`RuleSet`] of named calculation hooks. The
//! eligibility predicate and the specificity-ordered resolution of a
//! calculation call are provided here, with the individual predicates left as
//! override points so jurisdiction crates can tighten them.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxer_core::dispatch::{Calculator, RuleSet};
//! use taxer_core::{TaxComputation, TaxOptions};
//!
//! struct UsPayroll {
//!     rules: RuleSet,
//! }
//!
//! impl UsPayroll {
//!     fn new() -> Self {
//!         let rules = RuleSet::new().with_rule("doPayrollCalc", |income, _options| {
//!             TaxComputation {
//!                 taxable_income: income,
//!                 tax_amount: income * dec!(0.1),
//!                 net_income: Some(income * dec!(0.9)),
//!                 tax_band: Vec::new(),
//!             }
//!         });
//!         Self { rules }
//!     }
//! }
//!
//! impl Calculator for UsPayroll {
//!     fn currency(&self) -> &str {
//!         "USD"
//!     }
//!
//!     fn rules(&self) -> &RuleSet {
//!         &self.rules
//!     }
//!
//!     fn supported_country_codes(&self) -> &[&str] {
//!         &["us"]
//!     }
//! }
//!
//! let calculator = UsPayroll::new();
//! assert!(calculator.is_matched("US", dec!(1000), &TaxOptions::default()));
//!
//! let result = calculator.calc(dec!(1000), &TaxOptions::default()).unwrap();
//! assert_eq!(result.tax_amount, dec!(100));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::dispatch::keys::candidate_keys;
use crate::dispatch::rules::RuleSet;
use crate::models::{
    IncomeType, OptionsError, Period, ResolvedOptions, TaxOptions, TaxResult,
};

/// Errors a calculation call can fail with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// The supplied options did not resolve.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// None of the candidate rule keys is registered on the calculator.
    #[error(
        "no calculation rule for type '{tax_type}' \
         (period: {period}, income type: {income_type}, tax year: {tax_year})"
    )]
    NoMatchingRule {
        tax_type: String,
        period: Period,
        income_type: IncomeType,
        tax_year: String,
    },
}

/// Inclusive income range a calculator covers.
///
/// `max` of `None` means unbounded above, mirroring an open-ended top
/// bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeRange {
    pub min: Decimal,
    pub max: Option<Decimal>,
}

impl IncomeRange {
    pub fn new(min: Decimal, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    /// True when `income` falls within the range, both ends inclusive.
    pub fn contains(&self, income: Decimal) -> bool {
        self.min <= income && self.max.is_none_or(|max| income <= max)
    }
}

impl Default for IncomeRange {
    /// Unrestricted: zero to unbounded.
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: None,
        }
    }
}

/// A tax calculator for one currency and a set of jurisdictions.
///
/// Required methods identify the calculator and its rule table; the predicate
/// methods have permissive defaults (`is_options_matched` accepts everything,
/// `is_combination_matched` rejects everything) and exist for jurisdiction
/// crates to override. `is_matched` and `calc` are the two operations callers
/// use and are not meant to be overridden.
pub trait Calculator: Send + Sync {
    /// The currency this calculator computes in; also the default for
    /// `from_currency`/`to_currency` during option resolution.
    fn currency(&self) -> &str;

    /// The calculation hooks this calculator implements.
    fn rules(&self) -> &RuleSet;

    /// Lowercase country codes this calculator covers. Empty by default, so
    /// a calculator matches nothing until it declares its jurisdictions or
    /// overrides [`is_combination_matched`](Calculator::is_combination_matched).
    fn supported_country_codes(&self) -> &[&str] {
        &[]
    }

    fn supported_income_range(&self) -> IncomeRange {
        IncomeRange::default()
    }

    /// Option-based eligibility, ANDed into [`is_matched`](Calculator::is_matched).
    fn is_options_matched(&self, _options: &TaxOptions) -> bool {
        true
    }

    /// Escape hatch for eligibility that cannot be expressed as the
    /// code/income/options conjunction, ORed into
    /// [`is_matched`](Calculator::is_matched).
    fn is_combination_matched(
        &self,
        _country_code: &str,
        _income: Decimal,
        _options: &TaxOptions,
    ) -> bool {
        false
    }

    /// Income pre-processing hook; identity unless overridden (e.g. for unit
    /// scaling).
    fn process_income(&self, income: Decimal) -> Decimal {
        income
    }

    fn is_country_code_matched(&self, country_code: &str) -> bool {
        let code = country_code.to_lowercase();
        self.supported_country_codes()
            .iter()
            .any(|supported| *supported == code)
    }

    fn is_income_matched(&self, income: Decimal) -> bool {
        self.supported_income_range().contains(income)
    }

    /// Whether this calculator is eligible for the given request.
    ///
    /// Pure; safe to probe speculatively against every calculator in a
    /// registry.
    fn is_matched(&self, country_code: &str, income: Decimal, options: &TaxOptions) -> bool {
        (self.is_country_code_matched(country_code)
            && self.is_income_matched(income)
            && self.is_options_matched(options))
            || self.is_combination_matched(country_code, income, options)
    }

    /// Computes the tax for `income` under `options`.
    ///
    /// Resolves the options against this calculator's defaults, scans the
    /// candidate rule keys from most to least specific, invokes the first
    /// registered rule, and shapes its partial result into a [`TaxResult`].
    ///
    /// # Errors
    ///
    /// * [`CalcError::Options`] — the tax year did not resolve.
    /// * [`CalcError::NoMatchingRule`] — no candidate key is registered, the
    ///   generic `doCalc` fallback included.
    fn calc(&self, income: Decimal, options: &TaxOptions) -> Result<TaxResult, CalcError> {
        let income = self.process_income(income);
        let resolved = ResolvedOptions::resolve(options, self.currency())?;

        for key in candidate_keys(&resolved) {
            if let Some(rule) = self.rules().get(&key) {
                debug!(rule = %key, "matched calculation rule");
                return Ok(TaxResult::compose(rule(income, &resolved), &resolved));
            }
        }

        Err(CalcError::NoMatchingRule {
            tax_type: resolved.tax_type,
            period: resolved.period,
            income_type: resolved.income_type,
            tax_year: resolved.tax_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    use crate::models::TaxComputation;

    use super::*;

    fn ten_percent(income: Decimal, _options: &ResolvedOptions) -> TaxComputation {
        TaxComputation {
            taxable_income: income,
            tax_amount: income * dec!(0.1),
            net_income: Some(income * dec!(0.9)),
            tax_band: Vec::new(),
        }
    }

    fn flat(amount: Decimal) -> impl Fn(Decimal, &ResolvedOptions) -> TaxComputation {
        move |income, _options| TaxComputation {
            taxable_income: income,
            tax_amount: amount,
            net_income: None,
            tax_band: Vec::new(),
        }
    }

    struct TestCalculator {
        codes: Vec<&'static str>,
        range: IncomeRange,
        rules: RuleSet,
    }

    impl TestCalculator {
        fn new(codes: Vec<&'static str>, rules: RuleSet) -> Self {
            Self {
                codes,
                range: IncomeRange::default(),
                rules,
            }
        }
    }

    impl Calculator for TestCalculator {
        fn currency(&self) -> &str {
            "USD"
        }

        fn rules(&self) -> &RuleSet {
            &self.rules
        }

        fn supported_country_codes(&self) -> &[&str] {
            &self.codes
        }

        fn supported_income_range(&self) -> IncomeRange {
            self.range.clone()
        }
    }

    // =========================================================================
    // IncomeRange tests
    // =========================================================================

    #[test]
    fn income_range_default_is_zero_to_unbounded() {
        let range = IncomeRange::default();

        assert!(range.contains(Decimal::ZERO));
        assert!(range.contains(dec!(999999999)));
        assert!(!range.contains(dec!(-1)));
    }

    #[test]
    fn income_range_bounds_are_inclusive() {
        let range = IncomeRange::new(dec!(100), Some(dec!(200)));

        assert!(range.contains(dec!(100)));
        assert!(range.contains(dec!(200)));
        assert!(!range.contains(dec!(99.99)));
        assert!(!range.contains(dec!(200.01)));
    }

    // =========================================================================
    // matcher tests
    // =========================================================================

    #[test]
    fn is_matched_requires_code_income_and_options() {
        let calculator = TestCalculator::new(vec!["us"], RuleSet::new());

        assert!(calculator.is_matched("us", dec!(1000), &TaxOptions::default()));
    }

    #[test]
    fn is_matched_lowercases_country_code() {
        let calculator = TestCalculator::new(vec!["us"], RuleSet::new());

        assert!(calculator.is_matched("US", dec!(1000), &TaxOptions::default()));
    }

    #[test]
    fn is_matched_rejects_unsupported_code_regardless_of_income() {
        let calculator = TestCalculator::new(vec!["us"], RuleSet::new());

        assert!(!calculator.is_matched("fr", dec!(1000), &TaxOptions::default()));
        assert!(!calculator.is_matched("fr", Decimal::ZERO, &TaxOptions::default()));
    }

    #[test]
    fn is_matched_rejects_income_outside_range() {
        let mut calculator = TestCalculator::new(vec!["us"], RuleSet::new());
        calculator.range = IncomeRange::new(dec!(0), Some(dec!(5000)));

        assert!(calculator.is_matched("us", dec!(5000), &TaxOptions::default()));
        assert!(!calculator.is_matched("us", dec!(5001), &TaxOptions::default()));
    }

    #[test]
    fn is_matched_respects_options_predicate() {
        struct MarriedOnly {
            rules: RuleSet,
        }

        impl Calculator for MarriedOnly {
            fn currency(&self) -> &str {
                "USD"
            }
            fn rules(&self) -> &RuleSet {
                &self.rules
            }
            fn supported_country_codes(&self) -> &[&str] {
                &["us"]
            }
            fn is_options_matched(&self, options: &TaxOptions) -> bool {
                options.married == Some(true)
            }
        }

        let calculator = MarriedOnly {
            rules: RuleSet::new(),
        };
        let married = TaxOptions {
            married: Some(true),
            ..TaxOptions::default()
        };

        assert!(calculator.is_matched("us", dec!(1000), &married));
        assert!(!calculator.is_matched("us", dec!(1000), &TaxOptions::default()));
    }

    #[test]
    fn is_matched_accepts_combination_predicate_alone() {
        struct PensionerCombination {
            rules: RuleSet,
        }

        impl Calculator for PensionerCombination {
            fn currency(&self) -> &str {
                "USD"
            }
            fn rules(&self) -> &RuleSet {
                &self.rules
            }
            // No supported codes at all; only the combination applies.
            fn is_combination_matched(
                &self,
                country_code: &str,
                _income: Decimal,
                options: &TaxOptions,
            ) -> bool {
                country_code.eq_ignore_ascii_case("de") && options.age >= Some(67)
            }
        }

        let calculator = PensionerCombination {
            rules: RuleSet::new(),
        };
        let pensioner = TaxOptions {
            age: Some(70),
            ..TaxOptions::default()
        };

        assert!(calculator.is_matched("DE", dec!(1000), &pensioner));
        assert!(!calculator.is_matched("DE", dec!(1000), &TaxOptions::default()));
        assert!(!calculator.is_matched("fr", dec!(1000), &pensioner));
    }

    // =========================================================================
    // calc resolution tests
    // =========================================================================

    #[test]
    fn calc_falls_back_to_generic_rule() {
        let calculator = TestCalculator::new(
            vec!["us"],
            RuleSet::new().with_rule("doCalc", ten_percent),
        );
        let options = TaxOptions {
            tax_type: Some("freelance".to_string()),
            ..TaxOptions::default()
        };

        let result = calculator.calc(dec!(500), &options).unwrap();

        assert_eq!(result.tax_amount, dec!(50));
        assert_eq!(result.tax_type, "freelance");
    }

    #[test]
    fn calc_prefers_specific_rule_over_generic() {
        let calculator = TestCalculator::new(
            vec!["us"],
            RuleSet::new()
                .with_rule("doCalc", flat(dec!(1)))
                .with_rule("doMonthlyGrossPayrollCalc", flat(dec!(99))),
        );

        let result = calculator.calc(dec!(1000), &TaxOptions::default()).unwrap();

        assert_eq!(result.tax_amount, dec!(99));
    }

    #[test]
    fn calc_prefers_year_qualified_rule_over_unqualified() {
        let calculator = TestCalculator::new(
            vec!["us"],
            RuleSet::new()
                .with_rule("doMonthlyGrossPayrollCalc", flat(dec!(1)))
                .with_rule("doMonthlyGrossPayroll2024Calc", flat(dec!(42))),
        );
        let options = TaxOptions {
            tax_year: Some("2024_2025".to_string()),
            ..TaxOptions::default()
        };

        let result = calculator.calc(dec!(1000), &options).unwrap();

        assert_eq!(result.tax_amount, dec!(42));
    }

    #[test]
    fn calc_fails_without_any_rule() {
        let calculator = TestCalculator::new(vec!["us"], RuleSet::new());
        let options = TaxOptions {
            tax_year: Some("2024_2025".to_string()),
            ..TaxOptions::default()
        };

        let result = calculator.calc(dec!(1000), &options);

        assert_eq!(
            result,
            Err(CalcError::NoMatchingRule {
                tax_type: "payroll".to_string(),
                period: Period::Monthly,
                income_type: IncomeType::Gross,
                tax_year: "2024_2025".to_string(),
            })
        );
    }

    #[test]
    fn calc_propagates_invalid_tax_year() {
        let calculator = TestCalculator::new(
            vec!["us"],
            RuleSet::new().with_rule("doCalc", ten_percent),
        );
        let options = TaxOptions {
            tax_year: Some("FY25".to_string()),
            ..TaxOptions::default()
        };

        let result = calculator.calc(dec!(1000), &options);

        assert_eq!(
            result,
            Err(CalcError::Options(OptionsError::InvalidTaxYear(
                "FY25".to_string()
            )))
        );
    }

    #[test]
    fn calc_applies_process_income_hook() {
        struct Annualizing {
            rules: RuleSet,
        }

        impl Calculator for Annualizing {
            fn currency(&self) -> &str {
                "USD"
            }
            fn rules(&self) -> &RuleSet {
                &self.rules
            }
            fn supported_country_codes(&self) -> &[&str] {
                &["us"]
            }
            fn process_income(&self, income: Decimal) -> Decimal {
                income * dec!(12)
            }
        }

        let calculator = Annualizing {
            rules: RuleSet::new().with_rule("doCalc", ten_percent),
        };

        let result = calculator.calc(dec!(100), &TaxOptions::default()).unwrap();

        assert_eq!(result.taxable_income, dec!(1200));
        assert_eq!(result.tax_amount, dec!(120.0));
    }

    #[test]
    fn calc_exposes_passthrough_options_to_rules() {
        let calculator = TestCalculator::new(
            vec!["us"],
            RuleSet::new().with_rule("doCalc", |income, options| {
                let rate = match options.extra.get("surcharge") {
                    Some(Value::Bool(true)) => dec!(0.2),
                    _ => dec!(0.1),
                };
                TaxComputation {
                    taxable_income: income,
                    tax_amount: income * rate,
                    net_income: None,
                    tax_band: Vec::new(),
                }
            }),
        );
        let mut options = TaxOptions::default();
        options.extra.insert("surcharge".to_string(), Value::Bool(true));

        let result = calculator.calc(dec!(100), &options).unwrap();

        assert_eq!(result.tax_amount, dec!(20.0));
    }

    #[test]
    fn calc_does_not_leak_options_between_calls() {
        let calculator = TestCalculator::new(
            vec!["us"],
            RuleSet::new().with_rule("doCalc", ten_percent),
        );
        let first = TaxOptions {
            tax_type: Some("freelance".to_string()),
            married: Some(true),
            children: Some(4),
            ..TaxOptions::default()
        };

        let _ = calculator.calc(dec!(1000), &first).unwrap();
        let second = calculator.calc(dec!(1000), &TaxOptions::default()).unwrap();

        assert_eq!(second.tax_type, "payroll");
        assert_eq!(second.married, None);
        assert_eq!(second.children, 0);
    }
}
