// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, connect a client, hand it to the UI loop.
// - Logs go to stderr so they do not interleave with the menu; raise the
//   level with `RUST_LOG=ipfs_rpc_client=debug`.

use anyhow::Context;
use ipfs_rpc_client::{ui::main_menu, NodeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Node address from `IPFS_API_URL` / `IPFS_API_TIMEOUT`, or the local
    // node defaults. See `config::NodeConfig::from_env`.
    let config = NodeConfig::from_env();
    let client = config
        .connect()
        .with_context(|| format!("Failed to create client for {}", config.api_url))?;
    tracing::info!(url = %config.api_url, timeout = config.timeout_secs, "client ready");

    // Start the interactive menu. This call blocks until the user exits.
    main_menu(client)?;
    Ok(())
}
