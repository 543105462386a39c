//! Server startup: shared state initialization.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use usquest_core::{Config, QuestCatalog};
use usquest_notify::{ExpoPushTransport, NotificationDispatcher, NotificationTemplates, TemplateRenderer};
use usquest_storage::StorageEngine;

use crate::state::AppState;

/// Build `AppState` from config: catalog, storage backend, push transport.
pub async fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let catalog = Arc::new(load_catalog(config)?);
    info!(
        quests = catalog.len(),
        daily = catalog.quests(usquest_core::Frequency::Daily).len(),
        weekly = catalog.quests(usquest_core::Frequency::Weekly).len(),
        "Quest catalog loaded"
    );

    let storage = StorageEngine::from_config(config)
        .await
        .context("failed to initialize storage backend")?;
    info!("Storage backend ready ({})", storage.backend_name());

    let transport = ExpoPushTransport::new(&config.push.endpoint, config.push.access_token.clone())
        .context("failed to configure push transport")?;
    info!("Push transport ready ({})", transport.endpoint());

    let dispatcher = NotificationDispatcher::new(
        Arc::new(transport),
        Duration::from_secs(config.push.timeout_secs),
    );
    let templates = NotificationTemplates::new(
        &TemplateRenderer::new(),
        &config.push.title_template,
        &config.push.body_template,
    )
    .context("failed to load notification templates")?;

    Ok(Arc::new(AppState::new(
        config.cron.secret.clone(),
        catalog,
        &storage,
        dispatcher,
        templates,
    )))
}

fn load_catalog(config: &Config) -> anyhow::Result<QuestCatalog> {
    match &config.catalog.path {
        Some(path) => QuestCatalog::from_yaml_file(path)
            .with_context(|| format!("failed to load quest catalog from {}", path.display())),
        None => QuestCatalog::builtin().context("built-in quest catalog is invalid"),
    }
}
