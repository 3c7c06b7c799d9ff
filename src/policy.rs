//! Per-transaction overrides applied before the runner sends a request.
//!
//! The runner only exercises 2xx responses by default and marks the rest as
//! skipped. The rules here re-enable selected error cases with input that
//! provokes them, and turn off transactions that are not worth verifying.

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Name prefix of the suggest transaction expected to answer 400.
pub const SUGGEST_BAD_REQUEST_PREFIX: &str =
    "Internal API > /content/suggest > Suggests annotations > 400";

/// Name prefix of the good-to-go health check.
pub const GTG_PREFIX: &str = "Health > /__gtg";

/// Body sent to provoke a 400 from the suggest endpoint.
pub const MALFORMED_BODY: &str = "wrong_json";

/// What a matching rule does to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Effect {
    /// Never run the transaction.
    Skip,
    /// Run the transaction with the given request body.
    RunWithBody { body: String },
}

/// A single prefix-matched override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Anchored, case-sensitive prefix of the transaction name.
    pub prefix: String,
    /// Effect applied on match.
    #[serde(flatten)]
    pub effect: Effect,
}

impl Rule {
    /// Creates a rule that skips matching transactions.
    pub fn skip(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            effect: Effect::Skip,
        }
    }

    /// Creates a rule that un-skips matching transactions and replaces their body.
    pub fn run_with_body(prefix: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            effect: Effect::RunWithBody { body: body.into() },
        }
    }

    /// Returns true if the rule applies to a transaction with this name.
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    fn apply(&self, transaction: &mut Transaction) {
        match &self.effect {
            Effect::Skip => {
                tracing::info!(transaction = %transaction.name, "skipping: {}", transaction.name);
                transaction.skip = true;
            }
            Effect::RunWithBody { body } => {
                tracing::debug!(transaction = %transaction.name, "forcing request body");
                transaction.skip = false;
                transaction.request.body = body.clone();
            }
        }
    }
}

/// Ordered rule table evaluated against every transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPolicy {
    rules: Vec<Rule>,
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        Self::new(vec![
            Rule::run_with_body(SUGGEST_BAD_REQUEST_PREFIX, MALFORMED_BODY),
            Rule::skip(GTG_PREFIX),
        ])
    }
}

impl TransactionPolicy {
    /// Creates a policy from an ordered list of rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Appends rules after the existing ones.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Applies every matching rule in order and returns the ones that fired.
    ///
    /// Rules are independent: a name matching several prefixes gets every
    /// effect, later rules overwriting earlier ones.
    pub fn apply(&self, transaction: &mut Transaction) -> Vec<&Rule> {
        let mut applied = Vec::new();
        for rule in &self.rules {
            if rule.matches(&transaction.name) {
                rule.apply(transaction);
                applied.push(rule);
            }
        }
        applied
    }
}
