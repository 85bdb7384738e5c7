//! Calculation options: the partial input configuration and its resolved,
//! fully-defaulted form.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while resolving calculation options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// The configured tax year is neither a bare year nor a `start_end` range
    /// of two integers.
    #[error("invalid tax year: '{0}'")]
    InvalidTaxYear(String),
}

/// Whether the supplied income figure is before or after tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    #[default]
    Gross,
    Net,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gross => "gross",
            Self::Net => "net",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gross" => Some(Self::Gross),
            "net" => Some(Self::Net),
            _ => None,
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The period the income figure covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial calculation options as supplied by the caller.
///
/// Every field is optional; missing fields are filled from defaults during
/// [`ResolvedOptions::resolve`]. Keys not recognized by this schema land in
/// [`extra`](TaxOptions::extra), where calculation rules can still read them;
/// they are never echoed back into a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxOptions {
    /// Tax scheme identifier, e.g. `"payroll"`.
    #[serde(rename = "type")]
    pub tax_type: Option<String>,
    pub income_type: Option<IncomeType>,
    /// A bare year (`"2025"`) or a fiscal range (`"2024_2025"`).
    pub tax_year: Option<String>,
    pub period: Option<Period>,
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub married: Option<bool>,
    pub children: Option<u32>,
    pub joint_statement: Option<bool>,
    pub head_of_household: Option<bool>,
    pub age: Option<u32>,
    pub disabled: Option<bool>,
    /// Unrecognized keys, passed through to rules untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Fully-defaulted options handed to calculation rules.
///
/// Produced by [`ResolvedOptions::resolve`]; carries both the original-shaped
/// [`tax_year`](ResolvedOptions::tax_year) string (preserved for echoing into
/// a result) and the derived [`main_tax_year`](ResolvedOptions::main_tax_year)
/// used for rule selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    #[serde(rename = "type")]
    pub tax_type: String,
    pub income_type: IncomeType,
    pub tax_year: String,
    /// The single fiscal year rates are selected by; for a range `"Y1_Y2"`
    /// this is `Y2 - 1`. Internal to rule selection, never echoed.
    #[serde(skip)]
    pub main_tax_year: i32,
    pub period: Period,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: Decimal,
    pub married: Option<bool>,
    pub children: u32,
    pub joint_statement: Option<bool>,
    pub head_of_household: Option<bool>,
    pub age: Option<u32>,
    pub disabled: Option<bool>,
    #[serde(skip)]
    pub extra: BTreeMap<String, Value>,
}

impl ResolvedOptions {
    /// The default template for a calculator trading in `currency`.
    ///
    /// Built fresh on every call; callers overlay their own fields on the
    /// returned value and the template itself cannot leak state between
    /// resolutions. The default tax year spans the fiscal boundary ending in
    /// the current UTC year.
    pub fn base(currency: &str) -> Self {
        let year = Utc::now().year();
        Self {
            tax_type: "payroll".to_string(),
            income_type: IncomeType::Gross,
            tax_year: format!("{}_{}", year - 1, year),
            main_tax_year: year - 1,
            period: Period::Monthly,
            from_currency: currency.to_string(),
            to_currency: currency.to_string(),
            exchange_rate: Decimal::ONE,
            married: None,
            children: 0,
            joint_statement: None,
            head_of_household: None,
            age: None,
            disabled: None,
            extra: BTreeMap::new(),
        }
    }

    /// Resolves partial `options` against the defaults for `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidTaxYear`] when the tax year (supplied
    /// or defaulted) does not parse.
    ///
    /// # Example
    ///
    /// ```
    /// use taxer_core::{ResolvedOptions, TaxOptions};
    ///
    /// let options = TaxOptions {
    ///     tax_year: Some("2024_2025".to_string()),
    ///     ..TaxOptions::default()
    /// };
    ///
    /// let resolved = ResolvedOptions::resolve(&options, "USD").unwrap();
    ///
    /// assert_eq!(resolved.tax_type, "payroll");
    /// assert_eq!(resolved.main_tax_year, 2024);
    /// assert_eq!(resolved.from_currency, "USD");
    /// ```
    pub fn resolve(options: &TaxOptions, currency: &str) -> Result<Self, OptionsError> {
        let mut resolved = Self::base(currency);

        if let Some(tax_type) = &options.tax_type {
            resolved.tax_type = tax_type.clone();
        }
        if let Some(income_type) = options.income_type {
            resolved.income_type = income_type;
        }
        if let Some(tax_year) = &options.tax_year {
            resolved.tax_year = tax_year.clone();
        }
        if let Some(period) = options.period {
            resolved.period = period;
        }
        if let Some(from_currency) = &options.from_currency {
            resolved.from_currency = from_currency.clone();
        }
        if let Some(to_currency) = &options.to_currency {
            resolved.to_currency = to_currency.clone();
        }
        if let Some(exchange_rate) = options.exchange_rate {
            resolved.exchange_rate = exchange_rate;
        }
        if let Some(married) = options.married {
            resolved.married = Some(married);
        }
        if let Some(children) = options.children {
            resolved.children = children;
        }
        if let Some(joint_statement) = options.joint_statement {
            resolved.joint_statement = Some(joint_statement);
        }
        if let Some(head_of_household) = options.head_of_household {
            resolved.head_of_household = Some(head_of_household);
        }
        if let Some(age) = options.age {
            resolved.age = Some(age);
        }
        if let Some(disabled) = options.disabled {
            resolved.disabled = Some(disabled);
        }
        resolved.extra = options.extra.clone();

        resolved.main_tax_year = main_tax_year(&resolved.tax_year)?;

        Ok(resolved)
    }
}

/// Derives the single fiscal year used for rule selection.
///
/// A range `"Y1_Y2"` yields the earlier year `Y2 - 1`; a bare year is used
/// directly. Both segments of a range must be integers.
///
/// # Example
///
/// ```
/// use taxer_core::main_tax_year;
///
/// assert_eq!(main_tax_year("2024_2025").unwrap(), 2024);
/// assert_eq!(main_tax_year("2025").unwrap(), 2025);
/// assert!(main_tax_year("FY25").is_err());
/// ```
pub fn main_tax_year(tax_year: &str) -> Result<i32, OptionsError> {
    let invalid = || OptionsError::InvalidTaxYear(tax_year.to_string());
    match tax_year.split_once('_') {
        Some((start, end)) => {
            start.trim().parse::<i32>().map_err(|_| invalid())?;
            let end: i32 = end.trim().parse().map_err(|_| invalid())?;
            Ok(end - 1)
        }
        None => tax_year.trim().parse().map_err(|_| invalid()),
    }
}
