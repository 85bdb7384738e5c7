//! Registry of calculator implementations, dispatching by jurisdiction.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::dispatch::{CalcError, Calculator};
use crate::models::{TaxOptions, TaxResult};

/// Errors a registry-level calculation can fail with.
#[derive(Debug, Error)]
pub enum TaxerError {
    /// No registered calculator could handle the request: either none was
    /// eligible, or every eligible one lacked an applicable rule.
    #[error("no calculator matched country code '{0}'")]
    NoCalculatorMatched(String),

    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// Registry of [`Calculator`] instances.
///
/// Typical lifetime:
/// 1. Create with `Taxer::new()`.
/// 2. Call `register` once per jurisdiction crate's calculator.
/// 3. Call `calc` whenever a liability is needed.
///
/// Calculators are probed in registration order with
/// [`Calculator::is_matched`]; the first eligible one computes the result.
/// When an eligible calculator turns out to have no applicable rule for the
/// request, the scan moves on to the next eligible calculator instead of
/// failing the call.
#[derive(Default)]
pub struct Taxer {
    calculators: Vec<Box<dyn Calculator>>,
}

impl Taxer {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            calculators: Vec::new(),
        }
    }

    /// Register a calculator. Registration order is probe order.
    pub fn register(&mut self, calculator: Box<dyn Calculator>) {
        self.calculators.push(calculator);
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    /// Compute the tax for `income` in the jurisdiction `country_code`.
    ///
    /// # Errors
    ///
    /// * [`TaxerError::NoCalculatorMatched`] — no registered calculator was
    ///   eligible, or every eligible one lacked an applicable rule.
    /// * [`TaxerError::Calc`] — the chosen calculator failed for a reason
    ///   other than a missing rule (e.g. an unparseable tax year).
    pub fn calc(
        &self,
        country_code: &str,
        income: Decimal,
        options: &TaxOptions,
    ) -> Result<TaxResult, TaxerError> {
        for calculator in &self.calculators {
            if !calculator.is_matched(country_code, income, options) {
                continue;
            }
            match calculator.calc(income, options) {
                Ok(result) => return Ok(result),
                Err(CalcError::NoMatchingRule { tax_type, .. }) => {
                    warn!(
                        country_code,
                        tax_type = %tax_type,
                        "eligible calculator has no applicable rule; trying next"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(TaxerError::NoCalculatorMatched(country_code.to_string()))
    }
}
