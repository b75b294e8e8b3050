use flapcade::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), FlapcadeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    tracing::warn!(
        facilitator = %config.facilitator_url,
        "using the development payment gate; proofs are not verified"
    );

    let server = FlapcadeServerBuilder::new()
        .config(config)
        .build(DevPaymentGate::new())
        .await?;
    server.run().await
}
