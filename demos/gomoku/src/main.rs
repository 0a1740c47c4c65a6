use std::time::Duration;

use duelboard::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 3000;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// What the binary reads from its environment.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
    port: u16,
    variant: BoardVariant,
}

impl Settings {
    /// `PORT` (default 3000) and `DUELBOARD_VARIANT` (`classic`,
    /// `gomoku`, or `gomoku:N`; default five-in-a-row).
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let port = match lookup("PORT") {
            Some(port) => port.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        let variant = match lookup("DUELBOARD_VARIANT") {
            Some(name) => name.parse::<BoardVariant>().map_err(DuelboardError::from)?,
            None => BoardVariant::default(),
        };
        Ok(Self { port, variant })
    }

    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let addr = format!("0.0.0.0:{}", settings.port);

    let server = DuelboardServer::builder()
        .bind(&addr)
        .variant(settings.variant)
        .idle_timeout(Some(Duration::from_secs(300)))
        .build()
        .await?;

    tracing::info!(%addr, variant = %settings.variant, "starting gomoku server");
    server.run().await?;
    Ok(())
}
