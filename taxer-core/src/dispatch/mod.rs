//! Rule dispatch: key rendering, the rule table, and the calculator
//! contract that resolves a calculation call to the most specific registered
//! rule.

mod calculator;
mod keys;
mod rules;

pub use calculator::{CalcError, Calculator, IncomeRange};
pub use keys::{candidate_keys, rule_key};
pub use rules::{CalcRule, RuleSet};
