//! Calculation outputs: the partial result a rule produces and the shaped
//! result returned to the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::options::{IncomeType, Period, ResolvedOptions};

/// One progressive bracket's contribution to the total tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBand {
    pub tax_rate: Decimal,
    pub taxable_income: Decimal,
    pub tax_amount: Decimal,
}

/// The partial result a calculation rule returns.
///
/// `taxable_income` and `tax_amount` are mandatory; `net_income` is optional
/// and `tax_band` may stay empty for flat schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxComputation {
    pub taxable_income: Decimal,
    pub tax_amount: Decimal,
    pub net_income: Option<Decimal>,
    pub tax_band: Vec<TaxBand>,
}

/// The final result of a calculation call.
///
/// Composed per call from the recognized fields of the resolved options with
/// the rule's [`TaxComputation`] overlaid on top; never retained or mutated
/// by the engine afterwards. Internal-only fields (the derived main tax year,
/// passthrough options) are not echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub taxable_income: Decimal,
    pub tax_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_income: Option<Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tax_band: Vec<TaxBand>,

    // Echoed configuration.
    #[serde(rename = "type")]
    pub tax_type: String,
    pub income_type: IncomeType,
    pub tax_year: String,
    pub period: Period,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub married: Option<bool>,
    pub children: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_statement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_of_household: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl TaxResult {
    /// Overlays a rule's computation on the echoed option subset.
    pub fn compose(computation: TaxComputation, options: &ResolvedOptions) -> Self {
        Self {
            taxable_income: computation.taxable_income,
            tax_amount: computation.tax_amount,
            net_income: computation.net_income,
            tax_band: computation.tax_band,
            tax_type: options.tax_type.clone(),
            income_type: options.income_type,
            tax_year: options.tax_year.clone(),
            period: options.period,
            from_currency: options.from_currency.clone(),
            to_currency: options.to_currency.clone(),
            exchange_rate: options.exchange_rate,
            married: options.married,
            children: options.children,
            joint_statement: options.joint_statement,
            head_of_household: options.head_of_household,
            age: options.age,
            disabled: options.disabled,
        }
    }
}
