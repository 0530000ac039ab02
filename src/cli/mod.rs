mod access;
mod commands;
mod team;
mod user;

pub use access::run_access;
pub use commands::{StoreArgs, TeamCommands, UserCommands};
pub use team::{
    run_team_add_member, run_team_create, run_team_delete, run_team_for_user, run_team_grant,
    run_team_list, run_team_remove_member, run_team_revoke, run_team_show,
};
pub use user::{run_user_add, run_user_delete, run_user_list, run_user_own, run_user_show};

use std::fs;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::repository::{self, FactTeamRepository, FactUserRepository};
use crate::store::FactStore;

/// Builds the store config from the config file (if any) and flag overrides.
pub fn resolve_config(args: &StoreArgs) -> anyhow::Result<StoreConfig> {
    let mut config = match &args.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.into();
    }

    Ok(config)
}

/// Creates the data directory and the store schema.
pub fn run_init(args: &StoreArgs) -> anyhow::Result<()> {
    let config = resolve_config(args)?;
    fs::create_dir_all(&config.data_dir)?;

    let db_path = config.db_path();
    let existed = db_path.exists();
    config.open_store()?;

    if existed {
        println!("Store already initialized at {}", db_path.display());
    } else {
        tracing::info!("Initialized store at {}", db_path.display());
        println!("Initialized store at {}", db_path.display());
    }

    Ok(())
}

/// Opens the store, checking it was initialized first.
pub fn init_store(args: &StoreArgs) -> anyhow::Result<Arc<FactStore>> {
    let config = resolve_config(args)?;
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Store not found at {}. Run 'papershelf init' first.",
            db_path.display()
        );
    }

    Ok(Arc::new(FactStore::open(&db_path)?))
}

pub fn init_repositories(
    args: &StoreArgs,
) -> anyhow::Result<(FactUserRepository, FactTeamRepository)> {
    Ok(repository::open(init_store(args)?))
}

pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}
