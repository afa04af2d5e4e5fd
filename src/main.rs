// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use permission_gate::{
    api::router,
    config::{AuthSettings, LogFormat, ServerSettings},
    state::AppState,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = ServerSettings::from_env()?;
    init_tracing(server.log_format);

    let auth = AuthSettings::from_env()?;
    tracing::info!(
        issuer = %auth.issuer(),
        audience = %auth.audience,
        jwks_url = %auth.jwks_url()?,
        algorithms = ?auth.algorithms,
        "Authentication configured"
    );

    let app = router(AppState::new(&auth)?);

    let listener = tokio::net::TcpListener::bind(server.bind_address()).await?;
    tracing::info!(addr = %listener.local_addr()?, "Permission gate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
