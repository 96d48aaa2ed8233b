use qrlogo::server::{config::Config, routes};
use std::net::{IpAddr, SocketAddr};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::init()?;
    info!(
        server_addr = %config.server_addr(),
        port = %config.port(),
        force_high_ec_with_logo = config.force_high_ec_with_logo(),
        "Configuration loaded"
    );

    let addr = SocketAddr::from((config.server_addr().parse::<IpAddr>()?, config.port()));
    let app = routes(config);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,qrlogo=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
