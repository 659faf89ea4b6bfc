//! `hydra-cli` entry point.

use hydra_cli::{run_invocation, Context, RedisConnector};
use hydra_core::config::default_config_path;
use hydra_core::ConfigStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let words: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let mut input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout().lock();

    run_invocation(
        &words,
        |cli| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();

            let config_path = cli.config.clone().unwrap_or_else(default_config_path);
            Context::new(ConfigStore::load(config_path), RedisConnector)
        },
        &mut input,
        &mut out,
    )
    .await?;
    Ok(())
}
