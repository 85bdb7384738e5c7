//! The rule table a calculator registers its calculation hooks in.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::models::{ResolvedOptions, TaxComputation};

/// A registered calculation rule.
///
/// Receives the processed income and the resolved options and returns the
/// partial result the resolver shapes into a [`TaxResult`].
///
/// [`TaxResult`]: crate::models::TaxResult
pub type CalcRule = Box<dyn Fn(Decimal, &ResolvedOptions) -> TaxComputation + Send + Sync>;

/// Explicit rule-key → rule lookup table.
///
/// Concrete calculators register their hooks under keys built with
/// [`rule_key`](crate::dispatch::rule_key); the resolver scans its candidate
/// keys against this table. Registering a key twice replaces the earlier
/// rule.
#[derive(Default)]
pub struct RuleSet {
    rules: HashMap<String, CalcRule>,
}

impl RuleSet {
    /// Creates an empty rule table.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers `rule` under `key`, consuming and returning the table so
    /// registrations chain at construction time.
    pub fn with_rule<F>(mut self, key: impl Into<String>, rule: F) -> Self
    where
        F: Fn(Decimal, &ResolvedOptions) -> TaxComputation + Send + Sync + 'static,
    {
        self.rules.insert(key.into(), Box::new(rule));
        self
    }

    /// Looks up the rule registered under `key`.
    pub fn get(&self, key: &str) -> Option<&CalcRule> {
        self.rules.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Registered keys, sorted alphabetically.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.rules.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet").field("keys", &self.keys()).finish()
    }
}
