mod options;
mod tax_result;

pub use options::{
    IncomeType, OptionsError, Period, ResolvedOptions, TaxOptions, main_tax_year,
};
pub use tax_result::{TaxBand, TaxComputation, TaxResult};
