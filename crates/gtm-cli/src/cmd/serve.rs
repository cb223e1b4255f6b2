use anyhow::Context;
use clap::Args;
use gtm_core::config::{ServerConfig, WarnLevel};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (0 = OS-assigned)
    #[arg(long, env = "GTM_PORT")]
    pub port: Option<u16>,

    /// State database path, relative to the project root
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Seconds between simulation ticks
    #[arg(long = "tick-interval")]
    pub tick_interval: Option<u64>,

    /// Fixed seed for the simulation RNG
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ServeArgs {
    /// Layer command-line overrides on top of the file config.
    fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(secs) = self.tick_interval {
            config.tick_interval_secs = secs;
        }
        config
    }
}

pub fn run(root: &Path, args: ServeArgs) -> anyhow::Result<()> {
    let file_config = ServerConfig::load(root).context("failed to read config.yaml")?;
    let config = args.apply(file_config);

    for warning in config.validate() {
        if warning.level == WarnLevel::Warning {
            tracing::warn!("{}", warning.message);
        }
    }
    config.ensure_valid()?;

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let agent = gtm_server::activate(&root_buf, &config, args.seed)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "orchestration agent failed to activate"))?;

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "GTM mission control → http://localhost:{actual_port}{}  (PID {})",
            gtm_server::API_PREFIX,
            std::process::id()
        );

        let result = tokio::select! {
            res = gtm_server::serve_on(agent.clone(), listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        };

        agent.shutdown().await?;
        result
    })
}
