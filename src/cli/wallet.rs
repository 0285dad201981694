use tracing::info;

use crate::cli::keys::load_identity;
use crate::cli::{IdentityArgs, LevelCommands};
use crate::client::RpcClient;
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::wallet::Wallet;

fn open_wallet(args: &IdentityArgs, network: &NetworkConfig) -> Result<Wallet<RpcClient>> {
    let params = network.validate()?;
    let identity = load_identity(args, network)?;
    info!("Connecting to {}", network.rpc_url);
    Ok(Wallet::new(identity, RpcClient::new(&network.rpc_url), params))
}

pub async fn handle_status_command(args: &IdentityArgs, network: &NetworkConfig) -> Result<()> {
    let wallet = open_wallet(args, network)?;
    let activated = wallet.get_activation_status().await?;
    println!(
        "{}: {}",
        wallet.address(),
        if activated { "activated" } else { "not activated" }
    );
    Ok(())
}

pub async fn handle_activate_command(args: &IdentityArgs, network: &NetworkConfig) -> Result<()> {
    let wallet = open_wallet(args, network)?;
    let hash = wallet.activate_account().await?;
    println!("Activation submitted: {}", hash);
    Ok(())
}

pub async fn handle_filter_command(
    args: &IdentityArgs,
    cmd: LevelCommands,
    network: &NetworkConfig,
) -> Result<()> {
    let wallet = open_wallet(args, network)?;
    match cmd {
        LevelCommands::Get => {
            println!("Filter level: {}", wallet.get_filter_level().await?);
        }
        LevelCommands::Set { level } => {
            let hash = wallet.update_filter_level(level).await?;
            println!("Filter level update submitted: {}", hash);
        }
    }
    Ok(())
}

pub async fn handle_kyc_command(
    args: &IdentityArgs,
    cmd: LevelCommands,
    network: &NetworkConfig,
) -> Result<()> {
    let wallet = open_wallet(args, network)?;
    match cmd {
        LevelCommands::Get => {
            println!("KYC level: {}", wallet.get_kyc_level().await?);
        }
        LevelCommands::Set { level } => {
            let hash = wallet.update_kyc_level(level).await?;
            println!("KYC request submitted: {}", hash);
        }
    }
    Ok(())
}
