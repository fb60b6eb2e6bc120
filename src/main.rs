use coderoom::{
    attachment::{start_sweep_task, AttachmentStore},
    room::{RandomCodeGenerator, RoomRegistry},
    routes,
    websockets::InMemoryConnectionManager,
    AppConfig, AppError, AppState,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coderoom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Arc::new(AppConfig::load()?);
    info!(?config, "Starting room relay server");

    let registry = Arc::new(RoomRegistry::new(
        Box::new(RandomCodeGenerator::default()),
        config.max_code_attempts,
    ));
    let connection_manager = Arc::new(InMemoryConnectionManager::new());
    let attachment_store = Arc::new(AttachmentStore::new(
        config.upload_dir.clone(),
        config.public_prefix.clone(),
    ));
    // Ensure the uploads directory exists before starting the server
    attachment_store.ensure_dir().await?;

    tokio::spawn(start_sweep_task(
        Arc::clone(&attachment_store),
        config.sweep_config(),
    ));

    let app_state = AppState::new(
        Arc::clone(&config),
        registry,
        connection_manager,
        attachment_store,
    );
    let app = routes::router(app_state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
