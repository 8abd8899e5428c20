use mws::config::Config;
use mws::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => {
            let mut cfg = Config::from_file(path)?;
            cfg.apply_overrides(|key| std::env::var(key).ok())?;
            cfg
        }
        None => Config::load()?,
    };
    cfg.validate()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.level()?)
        .init();

    tracing::info!("Starting {} on {}", cfg.server_name, cfg.listen_addr());

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
