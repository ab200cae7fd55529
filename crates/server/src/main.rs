use server::config::Config;
use tracing::debug;
use utils::log::{DEFAULT_DIRECTIVES, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before the subscriber so RUST_LOG can come from .env
    let dotenv = dotenvy::dotenv();
    init_tracing(DEFAULT_DIRECTIVES);
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let config = Config::from_env()?;
    server::run(config).await
}
