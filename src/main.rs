use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphite_wallet::cli::{self, Cli, Commands};
use graphite_wallet::WalletConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config loading is logged before the configured level is known.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    let config = match tracing::subscriber::with_default(bootstrap, || {
        WalletConfig::load_or_default(&cli.config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error [{}]: invalid config {}: {}", e.kind(), cli.config.display(), e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let network = &config.network;
    let result = match cli.command {
        Commands::New { words } => cli::keys::handle_new_command(words, network),
        Commands::Inspect { identity } => cli::keys::handle_inspect_command(&identity, network),
        Commands::Status { identity } => {
            cli::wallet::handle_status_command(&identity, network).await
        }
        Commands::Activate { identity } => {
            cli::wallet::handle_activate_command(&identity, network).await
        }
        Commands::Filter { identity, cmd } => {
            cli::wallet::handle_filter_command(&identity, cmd, network).await
        }
        Commands::Kyc { identity, cmd } => {
            cli::wallet::handle_kyc_command(&identity, cmd, network).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error [{}]: {}", e.kind(), e);
        std::process::exit(1);
    }
}
