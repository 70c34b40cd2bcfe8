//! Local long-running server. The serverless deployment uses the lambda
//! binary instead; this one exists for development against a real socket.

use student_api::{AppConfig, Lifecycle};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();

    let lifecycle = Lifecycle::new();
    let app = lifecycle.get_or_init(&config).await?;

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.router().clone()).await?;
    Ok(())
}
