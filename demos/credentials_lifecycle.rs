//! Provision an identity, store the credentials record, then sign in again.
//!
//! ```sh
//! RUST_LOG=vault_core=debug cargo run --example credentials_lifecycle
//! ```

use vault_core::storage::FileStore;
use vault_core::{CredentialsRecord, IdentityManager, Result, StretchParams, VaultConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vault_core=info".into()),
        )
        .init();

    let config = VaultConfig::from_env()
        .unwrap_or_else(|_| VaultConfig::new("app.example"))
        .with_stretch(StretchParams::testing());

    let dir = std::env::temp_dir().join("vault-core-demo");
    let store = FileStore::open(&dir)?;

    // Provision
    let manager = IdentityManager::new(config.clone())?;
    manager.initialize_keys_with_user("alice", "Sup3r$ecret!")?;
    let safe_password = manager.safe_password_token("alice", "Sup3r$ecret!");
    let record = CredentialsRecord::new("alice@example.com", "alice", safe_password, "token-123");
    manager.persist_credentials(&store, "alice", "Sup3r$ecret!", &record)?;
    let signature = manager.save_signature(&store, "alice", "alice@example.com", "Sup3r$ecret!")?;
    println!("Saved signature record for {} in {}", signature.username, dir.display());
    manager.sign_out();

    // Sign in again
    let manager = IdentityManager::new(config)?;
    manager.initialize_keys_with_user("alice", "Sup3r$ecret!")?;
    println!("Signature record valid: {}", manager.check_stored_signature(&store)?);

    match manager.load_credentials(&store, "alice", "Sup3r$ecret!")? {
        Some(loaded) => println!("Loaded credentials for {} (v{})", loaded.email, loaded.version),
        None => println!("No credentials stored"),
    }

    match manager.load_credentials(&store, "alice", "wrong password") {
        Err(e) => println!("Wrong password rejected: {}", e),
        Ok(_) => println!("Unexpected success"),
    }

    Ok(())
}
