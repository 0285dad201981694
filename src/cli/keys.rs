use crate::account::{Identity, KeyDeriver};
use crate::cli::{IdentityArgs, IdentitySource};
use crate::config::NetworkConfig;
use crate::error::Result;

/// Derive the identity named by the flags or environment, offline.
pub fn load_identity(args: &IdentityArgs, network: &NetworkConfig) -> Result<Identity> {
    match args.resolve()? {
        IdentitySource::Mnemonic(phrase) => {
            KeyDeriver::derive_from_mnemonic_at(&phrase, &network.derivation_path)
        }
        IdentitySource::PrivateKey(key) => KeyDeriver::derive_from_private_key(&key),
    }
}

pub fn handle_new_command(words: usize, network: &NetworkConfig) -> Result<()> {
    let phrase = KeyDeriver::generate_mnemonic(words)?;
    let identity = KeyDeriver::derive_from_mnemonic_at(&phrase, &network.derivation_path)?;

    println!("Mnemonic:   {}", phrase);
    println!("Address:    {}", identity.address());
    println!("Public key: {}", identity.public_key());
    println!();
    println!("Write the mnemonic down and keep it offline. It is the only way to recover this account.");
    Ok(())
}

pub fn handle_inspect_command(args: &IdentityArgs, network: &NetworkConfig) -> Result<()> {
    let identity = load_identity(args, network)?;
    println!("Address:    {}", identity.address());
    println!("Public key: {}", identity.public_key());
    if identity.mnemonic().is_some() {
        println!("Path:       {}", network.derivation_path);
    }
    Ok(())
}
