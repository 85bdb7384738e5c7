//! Rule-key rendering and the specificity-ordered candidate list.
//!
//! A calculation rule is addressed by a camelCase identifier built from the
//! resolved options, e.g. `doMonthlyGrossPayrollCalc`. The resolver tries the
//! candidates from most to least specific and invokes the first one the
//! calculator has registered; the rendering function is public so downstream
//! calculator crates build their keys exactly the way the resolver looks them
//! up.

use crate::models::ResolvedOptions;

/// Renders segments into a single camelCase identifier.
///
/// Each segment is split on non-alphanumeric characters; the first word is
/// lowercased, every later word gets its first letter capitalized. Digit
/// groups pass through unchanged, so a range year `"2024_2025"` renders as
/// `20242025`.
///
/// # Example
///
/// ```
/// use taxer_core::dispatch::rule_key;
///
/// assert_eq!(
///     rule_key(&["do", "monthly", "gross", "payroll", "Calc"]),
///     "doMonthlyGrossPayrollCalc"
/// );
/// assert_eq!(
///     rule_key(&["do", "payroll", "2024_2025", "Calc"]),
///     "doPayroll20242025Calc"
/// );
/// ```
pub fn rule_key(segments: &[&str]) -> String {
    let mut key = String::new();
    for segment in segments {
        for word in segment
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            if key.is_empty() {
                key.push_str(&word.to_ascii_lowercase());
            } else {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    key.extend(first.to_uppercase());
                    key.push_str(&chars.as_str().to_ascii_lowercase());
                }
            }
        }
    }
    key
}

/// Builds the ordered candidate rule keys for `options`, most specific first.
///
/// The six candidates, in order:
/// 1. period + income type + type + tax year
/// 2. period + income type + type + main tax year
/// 3. period + income type + type
/// 4. income type + type
/// 5. type
/// 6. the generic fallback `doCalc`
///
/// For a bare-year `tax_year` the first two entries coincide; the list keeps
/// both so the shape stays fixed, and the first-match scan makes the
/// duplicate harmless.
///
/// # Example
///
/// ```
/// use taxer_core::dispatch::candidate_keys;
/// use taxer_core::{ResolvedOptions, TaxOptions};
///
/// let options = TaxOptions {
///     tax_year: Some("2024_2025".to_string()),
///     ..TaxOptions::default()
/// };
/// let resolved = ResolvedOptions::resolve(&options, "USD").unwrap();
///
/// assert_eq!(
///     candidate_keys(&resolved),
///     vec![
///         "doMonthlyGrossPayroll20242025Calc",
///         "doMonthlyGrossPayroll2024Calc",
///         "doMonthlyGrossPayrollCalc",
///         "doGrossPayrollCalc",
///         "doPayrollCalc",
///         "doCalc",
///     ]
/// );
/// ```
pub fn candidate_keys(options: &ResolvedOptions) -> Vec<String> {
    let period = options.period.as_str();
    let income_type = options.income_type.as_str();
    let tax_type = options.tax_type.as_str();
    let main_tax_year = options.main_tax_year.to_string();

    vec![
        rule_key(&[
            "do",
            period,
            income_type,
            tax_type,
            &options.tax_year,
            "Calc",
        ]),
        rule_key(&["do", period, income_type, tax_type, &main_tax_year, "Calc"]),
        rule_key(&["do", period, income_type, tax_type, "Calc"]),
        rule_key(&["do", income_type, tax_type, "Calc"]),
        rule_key(&["do", tax_type, "Calc"]),
        rule_key(&["do", "Calc"]),
    ]
}
