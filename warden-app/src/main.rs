use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use warden_app::cli::{parse_args, usage, Command};
use warden_app::config::Config;
use warden_discovery::{CancelFlag, DiscoveryEngine, DiscoveryOutcome, HostLimits, YieldReason};
use warden_state::SqliteStateStore;

type Engine = DiscoveryEngine<SqliteStateStore>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}\n{}", e, usage());
            std::process::exit(2);
        }
    };

    let config = Config::load(&invocation.config_path)?;
    let store = SqliteStateStore::new(&config.state_db)
        .with_context(|| format!("Failed to open state db {}", config.state_db.display()))?;
    let engine = Arc::new(DiscoveryEngine::new(store, &config.protected_root)?);

    match invocation.command {
        Command::Status => {
            let status = engine.get_status()?;
            println!("{}", status.label);
        }
        Command::Reset => {
            engine.reset()?;
            println!("Discovery state cleared");
        }
        Command::Run => run(engine, &config).await?,
    }

    Ok(())
}

async fn run(engine: Arc<Engine>, config: &Config) -> Result<()> {
    let policy = Arc::new(config.policy(&HostLimits::from_env())?);
    let interval = Duration::from_millis(config.poll_interval_ms);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    tracing::info!(
        "Discovering outside {} under {}",
        engine.protected_root().display(),
        engine.home_root().display()
    );

    loop {
        let tick_engine = Arc::clone(&engine);
        let tick_policy = Arc::clone(&policy);
        let tick_cancel = cancel.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            tick_engine.continue_discovery(&tick_policy, &tick_cancel)
        })
        .await
        .context("Discovery task failed")??;

        println!("{}", engine.get_status()?.label);

        match outcome {
            DiscoveryOutcome::Disabled => {
                println!("External discovery is disabled in settings");
                return Ok(());
            }
            DiscoveryOutcome::Yielded(YieldReason::Cancelled) => {
                println!("Interrupted, progress saved");
                return Ok(());
            }
            DiscoveryOutcome::Yielded(YieldReason::TimeBudget) => {
                tokio::time::sleep(interval).await;
            }
            DiscoveryOutcome::Completed | DiscoveryOutcome::AlreadyComplete => break,
        }
    }

    let chunks = engine.result_chunks(policy.chunk_size())?.unwrap_or_default();
    for (i, chunk) in chunks.iter().enumerate() {
        tracing::debug!("Batch {}: {} files", i + 1, chunk.len());
        for file in chunk {
            println!("{}", file);
        }
    }

    Ok(())
}
