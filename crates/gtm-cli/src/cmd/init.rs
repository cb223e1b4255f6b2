use anyhow::Context;
use gtm_core::config::ServerConfig;
use gtm_core::state::Snapshot;
use gtm_core::store::{RedbStore, StateStore};
use gtm_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, force: bool) -> anyhow::Result<()> {
    println!("Initializing GTM mission control in: {}", root.display());

    io::ensure_dir(&paths::gtm_dir(root))
        .with_context(|| format!("failed to create {}", paths::GTM_DIR))?;

    // 1. config.yaml
    let config_path = paths::config_path(root);
    let config = if config_path.exists() && !force {
        println!("  exists:  {}", paths::CONFIG_FILE);
        ServerConfig::load(root).context("failed to read config.yaml")?
    } else {
        let cfg = ServerConfig::default();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };
    config.ensure_valid()?;

    // 2. state store
    let db_path = config.db_path(root);
    let store = RedbStore::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    match store.load()? {
        Some(_) => println!("  exists:  {}", db_path.display()),
        None => {
            store.save(&Snapshot::baseline(chrono::Utc::now()))?;
            println!("  seeded:  {}", db_path.display());
        }
    }

    Ok(())
}
