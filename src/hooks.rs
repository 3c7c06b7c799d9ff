//! Lifecycle hooks and the suite's hook set.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::fixture::{ConfigureClient, FixtureLoader, FixtureSource};
use crate::policy::TransactionPolicy;
use crate::transaction::Transaction;

/// Lifecycle points the runner reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    BeforeAll,
    BeforeEach,
    Before,
    BeforeEachValidation,
    BeforeValidation,
    After,
    AfterEach,
    AfterAll,
}

impl HookEvent {
    /// Returns true if the event carries every transaction rather than one.
    pub fn is_suite_level(self) -> bool {
        matches!(self, HookEvent::BeforeAll | HookEvent::AfterAll)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookEvent::BeforeAll => "beforeAll",
            HookEvent::BeforeEach => "beforeEach",
            HookEvent::Before => "before",
            HookEvent::BeforeEachValidation => "beforeEachValidation",
            HookEvent::BeforeValidation => "beforeValidation",
            HookEvent::After => "after",
            HookEvent::AfterEach => "afterEach",
            HookEvent::AfterAll => "afterAll",
        };
        f.write_str(name)
    }
}

/// Hook callbacks invoked by the runner.
///
/// Only `before_all` and `before_each` are required; every other lifecycle
/// point defaults to a no-op.
#[async_trait]
pub trait Hooks: Send + Sync {
    /// Runs once before any transaction.
    async fn before_all(&self, transactions: &mut [Transaction]) -> Result<()>;

    /// Runs before each transaction is sent.
    async fn before_each(&self, transaction: &mut Transaction) -> Result<()>;

    /// Runs for the remaining per-transaction events.
    async fn on_transaction(
        &self,
        _event: HookEvent,
        _transaction: &mut Transaction,
    ) -> Result<()> {
        Ok(())
    }

    /// Runs once after every transaction.
    async fn after_all(&self, _transactions: &mut [Transaction]) -> Result<()> {
        Ok(())
    }
}

/// Decodes `data` for `event`, runs the matching hook and re-encodes the result.
pub async fn dispatch<H>(hooks: &H, event: HookEvent, data: Value) -> Result<Value>
where
    H: Hooks + ?Sized,
{
    if event.is_suite_level() {
        let mut transactions: Vec<Transaction> = serde_json::from_value(data).map_err(|e| {
            Error::Protocol(format!("{} expects a transaction list: {}", event, e))
        })?;
        match event {
            HookEvent::BeforeAll => hooks.before_all(&mut transactions).await?,
            _ => hooks.after_all(&mut transactions).await?,
        }
        return Ok(serde_json::to_value(transactions)?);
    }

    let mut transaction: Transaction = serde_json::from_value(data)
        .map_err(|e| Error::Protocol(format!("{} expects a transaction: {}", event, e)))?;
    match event {
        HookEvent::BeforeEach => hooks.before_each(&mut transaction).await?,
        other => hooks.on_transaction(other, &mut transaction).await?,
    }
    Ok(serde_json::to_value(transaction)?)
}

/// Hooks for the suggestions API suite: load fixtures, then apply the policy.
pub struct SuiteHooks<S, C> {
    loader: FixtureLoader<S, C>,
    policy: TransactionPolicy,
}

impl<S: FixtureSource, C: ConfigureClient> SuiteHooks<S, C> {
    pub fn new(loader: FixtureLoader<S, C>, policy: TransactionPolicy) -> Self {
        Self { loader, policy }
    }
}

#[async_trait]
impl<S: FixtureSource, C: ConfigureClient> Hooks for SuiteHooks<S, C> {
    async fn before_all(&self, transactions: &mut [Transaction]) -> Result<()> {
        tracing::debug!(transactions = transactions.len(), "before all");
        self.loader.load().await?;
        Ok(())
    }

    async fn before_each(&self, transaction: &mut Transaction) -> Result<()> {
        self.policy.apply(transaction);
        Ok(())
    }
}
