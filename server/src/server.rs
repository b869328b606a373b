use std::net::SocketAddr;

use axum::Router;
use color_eyre::eyre::Context as _;
use tokio::net::TcpListener;
use tracing::info;

/// Serve `app` on `0.0.0.0:$PORT` (default 3000)
pub async fn run_server(app: Router) -> color_eyre::Result<()> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_owned());
    let port: u16 = port
        .parse()
        .wrap_err_with(|| format!("PORT must be a number, got {port}"))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {addr}"))?;

    serve(listener, app).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> color_eyre::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to run server")?;

    Ok(())
}
