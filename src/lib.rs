//! Suggest Dredd Hooks - hooks handler for the suggestions API contract tests
//!
//! Speaks the Dredd hooks-handler protocol over TCP. Before the suite it posts
//! the mock server fixtures to the configuration endpoint; before each
//! transaction it applies a small table of name-prefix overrides.

pub mod config;
pub mod error;
pub mod fixture;
pub mod hooks;
pub mod policy;
pub mod protocol;
pub mod server;
pub mod transaction;

pub use config::{HooksConfig, Validate, ValidationResult};
pub use error::{Error, Result};
pub use fixture::{
    ConfigureClient, FixtureLoader, FixtureSource, FsFixtureSource, HttpConfigureClient,
    LoadOutcome,
};
pub use hooks::{dispatch, HookEvent, Hooks, SuiteHooks};
pub use policy::{Effect, Rule, TransactionPolicy};
pub use protocol::HookMessage;
pub use server::HooksServer;
pub use transaction::{Request, Transaction};

/// Builds the production hook set from configuration.
pub fn suite_hooks(
    config: &HooksConfig,
) -> Result<SuiteHooks<FsFixtureSource, HttpConfigureClient>> {
    let client = HttpConfigureClient::new(&config.configure)?;
    let loader = FixtureLoader::new(config.fixture.path.clone(), FsFixtureSource, client);
    let policy = TransactionPolicy::default().with_rules(config.rules.iter().cloned());
    Ok(SuiteHooks::new(loader, policy))
}
