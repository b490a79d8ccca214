use anyhow::Result;
use clap::Parser;
use speech_bridge::{server, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bridge between an audio client and a streaming transcription engine
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on (default 9099)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config/speech-bridge")]
    config: String,

    /// WebSocket URL of the transcription engine
    #[arg(long)]
    provider_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.port = port;
    }
    if let Some(url) = args.provider_url {
        cfg.provider.url = url;
    }

    info!("Speech Bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Codecs: {:?}", cfg.catalog.codecs);
    info!("Languages: {:?}", cfg.catalog.languages);

    server::run(cfg).await
}
