//! Suggest Dredd Hooks CLI
//!
//! Started by Dredd as the hooks handler. Any hook files Dredd passes on the
//! command line are ignored; the hooks are compiled in.

use suggest_hooks::{suite_hooks, HooksConfig, HooksServer, Validate};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr; Dredd reads the handler's stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let hookfiles: Vec<String> = std::env::args().skip(1).collect();
    if !hookfiles.is_empty() {
        tracing::debug!(?hookfiles, "ignoring hook files");
    }

    if let Err(e) = run().await {
        tracing::error!(error = %e, "hooks handler failed");
        eprintln!("Hooks handler failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> suggest_hooks::Result<()> {
    let config = HooksConfig::from_env()?;

    for warning in config.validate().into_result()? {
        tracing::warn!("{}", warning);
    }

    let hooks = suite_hooks(&config)?;
    let server = HooksServer::bind(&config.server.address(), hooks).await?;
    server.serve().await
}
