mod config;

mod app;
mod ctx;
mod db;
mod errors;
mod layers;
mod notes;
mod openapi;
mod state;

use std::{net::SocketAddr, sync::Arc};

use aide::axum::ApiRouter;
use app::AppParams;
pub use config::config;
use config::{Config, LogFormat};
pub use db::{init_db, DB};
pub use errors::{Error, Result};
use notes::SqliteNoteStore;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    setup_tracing(config);

    let conn = init_db(&config.database_url).await?;

    let (app, _api) = app::create(AppParams {
        store: Arc::new(SqliteNoteStore::new(conn)),
        router: |state| ApiRouter::new().merge(notes::router(state)),
    })
    .await?;

    let app = layers::add_tracing_layer(app);

    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn setup_tracing(config: &Config) {
    let tracing = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(config.tokio_console.then(console_subscriber::spawn));

    match config.log_format {
        LogFormat::Json => tracing.with(tracing_subscriber::fmt::layer().json()).try_init().ok(),
        LogFormat::Compact => tracing
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(false),
            )
            .try_init()
            .ok(),
    };
}

#[cfg(test)]
pub mod tests {
    use crate::{
        app::{create, AppParams},
        config::config_override,
        errors::Result,
        notes::Store,
        state::AppState,
    };
    use aide::axum::ApiRouter;
    use axum_test::{TestServer, TestServerConfig, Transport};

    pub async fn test_server<R>(store: Store, router: R) -> Result<TestServer>
    where
        R: FnOnce(AppState) -> ApiRouter,
    {
        config_override(|config| config);

        let (app, _) = create(AppParams { store, router }).await?;

        let config = TestServerConfig {
            transport: Some(Transport::MockHttp),
            ..TestServerConfig::default()
        };

        Ok(TestServer::new_with_config(app, config).unwrap())
    }
}
