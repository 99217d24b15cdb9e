use clap::Parser;
use veil_http_proxy::{Config, ProxyServer};

#[derive(Parser, Debug)]
#[command(name = "veil-http-proxy")]
#[command(about = "Transparent reverse proxy that rewrites origin hostnames to aliases")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, env = "VEIL_CONFIG", default_value = "data/config.yml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_file(&args.config)?;

    ProxyServer::new(config).run().await
}
