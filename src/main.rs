mod handlers;

use axum::{Router, routing};
use handlers::{handle_webhook, health};
use std::fs;
use std::sync::Arc;
use tracing::{error, info};
use webhook_deploy::error::DeployError;
use webhook_deploy::notify::Notifier;
use webhook_deploy::settings::Settings;
use webhook_deploy::{AppState, ProjectRegistry};

/// Load and parse the project registry file
fn load_registry(path: &str) -> Result<ProjectRegistry, DeployError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        DeployError::ConfigError(format!("Failed to read config file '{}': {}", path, e))
    })?;

    let registry: ProjectRegistry = serde_json::from_str(&raw).map_err(|e| {
        DeployError::ConfigError(format!("Failed to parse config file '{}': {}", path, e))
    })?;

    Ok(registry)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt::init();

    // A missing or broken registry file is not fatal: the server comes up
    // with no projects and /health reports unhealthy until it is fixed.
    let registry = match load_registry(&settings.config_path) {
        Ok(registry) => registry,
        Err(e) => {
            error!("{}; starting with an empty project registry", e);
            ProjectRegistry::default()
        }
    };

    let notifier = Notifier::new(settings.smtp.clone(), settings.slack_token.clone());
    let state = Arc::new(AppState::new(
        registry,
        settings.config_path.clone(),
        notifier,
    ));

    let app = Router::new()
        .route("/health", routing::get(health))
        .route("/webhook/{project_name}", routing::post(handle_webhook))
        .with_state(state.clone());

    info!("Starting webhook server on {}", settings.bind_address);
    info!(
        "Serving {} project(s) from {:?}",
        state.registry.len(),
        settings.config_path
    );
    let listener = tokio::net::TcpListener::bind(&settings.bind_address)
        .await
        .unwrap();
    axum::serve(listener, app).await.unwrap();
}
