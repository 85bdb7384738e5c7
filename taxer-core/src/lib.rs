pub mod dispatch;
pub mod models;
pub mod registry;

pub use dispatch::{CalcError, CalcRule, Calculator, IncomeRange, RuleSet};
pub use models::*;
pub use registry::{Taxer, TaxerError};
