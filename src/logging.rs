use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global fmt subscriber at `level`.
pub fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Reads the level from `LOG_LEVEL`, falling back to `INFO`.
pub fn level_from_env() -> Result<Level> {
    match std::env::var("LOG_LEVEL") {
        Ok(level) => level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid LOG_LEVEL '{level}'")),
        Err(_) => Ok(Level::INFO),
    }
}
