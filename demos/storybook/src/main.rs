//! Demo lobby server running the builtin adventure.
//!
//! Usage: `storybook [BIND_ADDR] [ADVENTURES_JSON]`
//!
//! With no arguments it serves the builtin story on 127.0.0.1:8080 and
//! opens one four-seat lobby so clients can join right away:
//! `websocat "ws://127.0.0.1:8080/join/<lobby_id>?name=Ada"`.

use std::sync::Arc;

use taleweave::TaleweaveServer;
use taleweave_adventure::AdventureCatalog;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let bind_addr =
        args.next().unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let catalog = match args.next() {
        Some(path) => {
            tracing::info!(path = %path, "loading adventure catalog");
            Arc::new(AdventureCatalog::load(&path)?)
        }
        None => Arc::new(AdventureCatalog::builtin()),
    };

    let server = TaleweaveServer::builder()
        .bind(&bind_addr)
        .catalog(Arc::clone(&catalog))
        .build()
        .await?;
    let addr = server.local_addr()?;
    let service = server.service();

    // Open one lobby up front so the demo is immediately joinable.
    if let Some(adventure) = catalog.summaries().first() {
        let created = service.create_lobby(4, adventure.id).await?;
        tracing::info!(
            lobby_id = %created.lobby_id,
            title = %adventure.title,
            "demo lobby ready at ws://{}/join/{}",
            addr,
            created.lobby_id
        );
    }

    server.run().await?;
    Ok(())
}
